//! The standard deserializers.

use alloc::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use slate_record::{Binder, Bytes, ContractRef, DeclaredType, Fields, TypeRegistry, Value, ValueMap};
use uuid::Uuid;

use super::{Deserializer, Deserializers};
use crate::TYPE_FIELD;
use crate::error::DeserializeError;

// -----------------------------------------------------------------------------
// Scalars

/// `2^127` as a float. Floats at or above it saturate when cast to `i128`.
const I128_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

fn int_to_f32(v: i128) -> Option<f32> {
    let f = v as f32;
    ((-I128_LIMIT..I128_LIMIT).contains(&f64::from(f)) && f as i128 == v).then_some(f)
}

fn int_to_f64(v: i128) -> Option<f64> {
    let f = v as f64;
    ((-I128_LIMIT..I128_LIMIT).contains(&f) && f as i128 == v).then_some(f)
}

fn f64_to_f32(v: f64) -> Option<f32> {
    let f = v as f32;
    (f64::from(f) == v).then_some(f)
}

/// The float written as `"NaN"`, `"Infinity"` or `"-Infinity"`.
fn non_finite(text: &str) -> Option<f64> {
    match text {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

/// Narrows wide numbers to a declared numeric type.
///
/// A conversion happens only when it is exact. Otherwise, and for integer
/// targets given a decimal, the wide value is kept. Never fails.
///
/// Float targets also accept the text written for non-finite floats.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrowingDeserializer;

impl Deserializer for NarrowingDeserializer {
    fn can_deserialize(&self, value: &Value, target: &DeclaredType) -> bool {
        match value {
            Value::Int(_) | Value::F64(_) => target.is_numeric(),
            Value::String(text) => {
                matches!(target, DeclaredType::F32 | DeclaredType::F64) && non_finite(text).is_some()
            }
            _ => false,
        }
    }

    fn deserialize(&self, value: Value, target: &DeclaredType, _: &Deserializers) -> Result<Value, DeserializeError> {
        let narrowed = match (&value, target) {
            (Value::Int(v), DeclaredType::I8) => i8::try_from(*v).ok().map(Value::I8),
            (Value::Int(v), DeclaredType::I16) => i16::try_from(*v).ok().map(Value::I16),
            (Value::Int(v), DeclaredType::I32) => i32::try_from(*v).ok().map(Value::I32),
            (Value::Int(v), DeclaredType::I64) => i64::try_from(*v).ok().map(Value::I64),
            (Value::Int(v), DeclaredType::F32) => int_to_f32(*v).map(Value::F32),
            (Value::Int(v), DeclaredType::F64) => int_to_f64(*v).map(Value::F64),
            (Value::F64(v), DeclaredType::F32) => f64_to_f32(*v).map(Value::F32),
            (Value::String(text), DeclaredType::F32) => non_finite(text).map(|v| Value::F32(v as f32)),
            (Value::String(text), DeclaredType::F64) => non_finite(text).map(Value::F64),
            _ => None,
        };
        Ok(narrowed.unwrap_or(value))
    }
}

// -----------------------------------------------------------------------------
// Binary

/// Binary from raw bytes or base64 text.
///
/// Malformed base64 is kept as a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryDeserializer;

impl Deserializer for BinaryDeserializer {
    fn can_deserialize(&self, value: &Value, target: &DeclaredType) -> bool {
        matches!(target, DeclaredType::Binary) && matches!(value, Value::String(_) | Value::Binary(_))
    }

    fn deserialize(&self, value: Value, _: &DeclaredType, _: &Deserializers) -> Result<Value, DeserializeError> {
        let Value::String(text) = value else {
            return Ok(value);
        };
        match STANDARD.decode(&text) {
            Ok(bytes) => Ok(Value::Binary(Bytes::new(bytes))),
            Err(err) => {
                log::warn!("keeping malformed base64 payload as a string: {err}");
                Ok(Value::String(text))
            }
        }
    }
}

/// UUIDs from 16 bytes. Payloads of other lengths stay binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidDeserializer;

impl Deserializer for UuidDeserializer {
    fn can_deserialize(&self, value: &Value, target: &DeclaredType) -> bool {
        matches!(target, DeclaredType::Uuid) && matches!(value, Value::String(_) | Value::Binary(_))
    }

    fn deserialize(&self, value: Value, _: &DeclaredType, chain: &Deserializers) -> Result<Value, DeserializeError> {
        match chain.deserialize_to(value, &DeclaredType::Binary)? {
            Value::Binary(bytes) => match <[u8; 16]>::try_from(bytes.as_slice()) {
                Ok(array) => Ok(Value::Uuid(Uuid::from_bytes(array))),
                Err(_) => Ok(Value::Binary(bytes)),
            },
            other => Ok(other),
        }
    }
}

// -----------------------------------------------------------------------------
// Containers

/// Lists, with elements converted to the declared element type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListDeserializer;

impl Deserializer for ListDeserializer {
    fn can_deserialize(&self, value: &Value, target: &DeclaredType) -> bool {
        matches!(value, Value::List(_)) && matches!(target, DeclaredType::List(_) | DeclaredType::Any)
    }

    fn deserialize(&self, value: Value, target: &DeclaredType, chain: &Deserializers) -> Result<Value, DeserializeError> {
        let Value::List(items) = value else {
            return Ok(value);
        };
        let element = target.element();
        items
            .into_iter()
            .map(|item| chain.deserialize_to(item, element))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }
}

/// Maps, with values converted to the declared value type.
///
/// Also takes objects read as a record of no known contract, whose values are
/// read untyped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapDeserializer;

impl Deserializer for MapDeserializer {
    fn can_deserialize(&self, value: &Value, target: &DeclaredType) -> bool {
        matches!(value, Value::Map(_))
            && matches!(target, DeclaredType::Map(_) | DeclaredType::Record(None) | DeclaredType::Any)
    }

    fn deserialize(&self, value: Value, target: &DeclaredType, chain: &Deserializers) -> Result<Value, DeserializeError> {
        let Value::Map(map) = value else {
            return Ok(value);
        };
        let element = target.element();
        let mut converted = ValueMap::default();
        converted.reserve(map.len());
        for (name, value) in map {
            converted.insert(name, chain.deserialize_to(value, element)?);
        }
        Ok(Value::Map(converted))
    }
}

// -----------------------------------------------------------------------------
// Records

/// Records from objects.
///
/// The contract is the declared one, or else the one the registry knows
/// under the object's `__type` hint. Fields are converted to the types of
/// their members; unknown fields are kept as read. The hint itself is kept
/// as a regular field.
#[derive(Debug, Clone)]
pub struct RecordDeserializer {
    binder: Arc<Binder>,
    registry: Option<Arc<TypeRegistry>>,
}

impl RecordDeserializer {
    #[inline]
    pub fn new(binder: Arc<Binder>, registry: Option<Arc<TypeRegistry>>) -> Self {
        Self { binder, registry }
    }

    fn resolve(&self, map: &ValueMap, target: &DeclaredType) -> Option<ContractRef> {
        match target {
            DeclaredType::Record(Some(contract)) => Some(*contract),
            DeclaredType::Record(None) | DeclaredType::Any => {
                let name = map.get(TYPE_FIELD)?.as_str()?;
                self.registry.as_deref()?.get_type(name)
            }
            _ => None,
        }
    }
}

impl Deserializer for RecordDeserializer {
    fn can_deserialize(&self, value: &Value, target: &DeclaredType) -> bool {
        match value {
            Value::Map(map) => self.resolve(map, target).is_some(),
            _ => false,
        }
    }

    fn deserialize(&self, value: Value, target: &DeclaredType, chain: &Deserializers) -> Result<Value, DeserializeError> {
        let Value::Map(map) = value else {
            return Ok(value);
        };
        let Some(contract) = self.resolve(&map, target) else {
            return MapDeserializer.deserialize(Value::Map(map), &DeclaredType::Any, chain);
        };

        let members = self.binder.members_of(contract)?;
        let mut fields = ValueMap::default();
        fields.reserve(map.len());
        for (name, value) in map {
            if value.is_null() {
                continue;
            }
            let declared = members.get(&name).unwrap_or(&DeclaredType::Any);
            let value = chain.deserialize_to(value, declared)?;
            fields.insert(name, value);
        }

        let record = self.binder.wrap(contract, Fields::from_map(fields))?;
        Ok(Value::Record(record))
    }
}

// -----------------------------------------------------------------------------
// Tests
