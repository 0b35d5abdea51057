//! JSON format adapter.
//!
//! Reading happens in two phases: the input is parsed into an untyped tree,
//! then the deserializer chain converts the tree to the requested type.
//! Writing pushes the serializer chain's events straight into a
//! [`JsonWriter`].

// -----------------------------------------------------------------------------
// Modules

mod raw;
mod writer;

// -----------------------------------------------------------------------------
// Exports

pub use writer::JsonWriter;

use alloc::sync::Arc;
use core::fmt;
use std::io;

use json_comments::StripComments;
use serde_core::de::DeserializeSeed;
use slate_record::{Binder, DeclaredType, Member, TypeRegistry, Value};

use crate::de::Deserializers;
use crate::error::{DeserializeError, SerializeError};
use crate::ser::Serializers;
use raw::RawSeed;

// -----------------------------------------------------------------------------
// Format

/// A wire format for [`Value`]s.
pub trait Format {
    /// Write `value` into a new buffer.
    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializeError> {
        let mut buffer = Vec::new();
        self.serialize_to(value, &mut buffer)?;
        Ok(buffer)
    }

    fn serialize_to(&self, value: &Value, writer: &mut dyn io::Write) -> Result<(), SerializeError>;

    /// Read `bytes` with no declared type.
    fn deserialize(&self, bytes: &[u8]) -> Result<Value, DeserializeError> {
        self.deserialize_to(bytes, &DeclaredType::Any)
    }

    fn deserialize_to(&self, bytes: &[u8], target: &DeclaredType) -> Result<Value, DeserializeError>;

    fn deserialize_from(&self, reader: &mut dyn io::Read, target: &DeclaredType) -> Result<Value, DeserializeError>;
}

// -----------------------------------------------------------------------------
// JsonFormat

/// JSON through `serde_json`.
///
/// # Examples
///
/// ```
/// use slate_record::{DeclaredType, Value};
/// use slate_serde::json::{Format, JsonFormat};
///
/// let json = JsonFormat::default();
///
/// let value = json.deserialize(br#"[true, "Hello World", 123]"#)?;
/// assert_eq!(
///     value,
///     Value::List(vec![Value::Bool(true), Value::from("Hello World"), Value::Int(123)])
/// );
/// assert_eq!(json.serialize(&value)?, br#"[true,"Hello World",123]"#);
///
/// let bytes = json.deserialize_to(br#""SGVsbG8gV29ybGQ=""#, &DeclaredType::Binary)?;
/// assert_eq!(bytes, Value::Binary(b"Hello World"[..].into()));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct JsonFormat {
    binder: Arc<Binder>,
    registry: Option<Arc<TypeRegistry>>,
    serializers: Serializers,
    deserializers: Deserializers,
    pretty: bool,
    comments: bool,
}

impl JsonFormat {
    #[inline]
    pub fn builder() -> JsonFormatBuilder {
        JsonFormatBuilder::default()
    }

    #[inline]
    pub fn binder(&self) -> &Arc<Binder> {
        &self.binder
    }

    #[inline]
    pub fn registry(&self) -> Option<&Arc<TypeRegistry>> {
        self.registry.as_ref()
    }

    #[inline]
    pub fn serializers(&self) -> &Serializers {
        &self.serializers
    }

    #[inline]
    pub fn deserializers(&self) -> &Deserializers {
        &self.deserializers
    }

    #[inline]
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Whether input may contain `/* */`, `//` and `#` comments.
    #[inline]
    pub fn allows_comments(&self) -> bool {
        self.comments
    }

    fn read<'de, R: serde_json::de::Read<'de>>(
        &self,
        mut de: serde_json::Deserializer<R>,
        target: &DeclaredType,
    ) -> Result<Value, DeserializeError> {
        let raw = RawSeed.deserialize(&mut de)?;
        de.end()?;
        self.deserializers.deserialize_to(raw, target)
    }

    /// Read `bytes` as a `T`.
    pub fn from_slice<T: Member>(&self, bytes: &[u8]) -> Result<T, DeserializeError> {
        let expected = T::declared_type();
        let value = self.deserialize_to(bytes, &expected)?;
        T::from_value(&value).ok_or(DeserializeError::Mismatch {
            expected,
            found: value.kind(),
        })
    }

    /// Write `value` as JSON text.
    pub fn to_vec<T: Member>(&self, value: T) -> Result<Vec<u8>, SerializeError> {
        self.serialize(&value.into_value())
    }
}

impl Format for JsonFormat {
    fn serialize_to(&self, value: &Value, writer: &mut dyn io::Write) -> Result<(), SerializeError> {
        if self.pretty {
            self.serializers.serialize(value, &mut JsonWriter::pretty(writer))
        } else {
            self.serializers.serialize(value, &mut JsonWriter::compact(writer))
        }
    }

    fn deserialize_to(&self, bytes: &[u8], target: &DeclaredType) -> Result<Value, DeserializeError> {
        if self.comments {
            self.read(serde_json::Deserializer::from_reader(StripComments::new(bytes)), target)
        } else {
            self.read(serde_json::Deserializer::from_slice(bytes), target)
        }
    }

    fn deserialize_from(&self, reader: &mut dyn io::Read, target: &DeclaredType) -> Result<Value, DeserializeError> {
        if self.comments {
            self.read(serde_json::Deserializer::from_reader(StripComments::new(reader)), target)
        } else {
            self.read(serde_json::Deserializer::from_reader(reader), target)
        }
    }
}

impl Default for JsonFormat {
    /// Standard chains over the shared binder, compact output.
    #[inline]
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for JsonFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonFormat")
            .field("registry", &self.registry)
            .field("serializers", &self.serializers)
            .field("deserializers", &self.deserializers)
            .field("pretty", &self.pretty)
            .field("comments", &self.comments)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// JsonFormatBuilder

/// Builder of a [`JsonFormat`].
///
/// Chains that are not given are the standard ones, configured with the
/// builder's binder and registry. Comments in the input are accepted unless
/// turned off.
pub struct JsonFormatBuilder {
    binder: Option<Arc<Binder>>,
    registry: Option<Arc<TypeRegistry>>,
    serializers: Option<Serializers>,
    deserializers: Option<Deserializers>,
    pretty: bool,
    comments: bool,
}

impl Default for JsonFormatBuilder {
    fn default() -> Self {
        Self {
            binder: None,
            registry: None,
            serializers: None,
            deserializers: None,
            pretty: false,
            comments: true,
        }
    }
}

impl JsonFormatBuilder {
    /// Create records with `binder` instead of the shared one.
    #[inline]
    pub fn binder(mut self, binder: Arc<Binder>) -> Self {
        self.binder = Some(binder);
        self
    }

    /// Write and resolve `__type` hints with `registry`.
    #[inline]
    pub fn registry(mut self, registry: impl Into<Arc<TypeRegistry>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    #[inline]
    pub fn serializers(mut self, serializers: Serializers) -> Self {
        self.serializers = Some(serializers);
        self
    }

    #[inline]
    pub fn deserializers(mut self, deserializers: Deserializers) -> Self {
        self.deserializers = Some(deserializers);
        self
    }

    #[inline]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Accept `/* */`, `//` and `#` comments in the input.
    #[inline]
    pub fn comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    pub fn build(self) -> JsonFormat {
        let binder = self.binder.unwrap_or_else(Binder::shared);
        let registry = self.registry;
        let serializers = self
            .serializers
            .unwrap_or_else(|| Serializers::standard(registry.clone()));
        let deserializers = self
            .deserializers
            .unwrap_or_else(|| Deserializers::standard(binder.clone(), registry.clone()));

        JsonFormat {
            binder,
            registry,
            serializers,
            deserializers,
            pretty: self.pretty,
            comments: self.comments,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use slate_record::{Binder, Bytes, Contract, DeclaredType, RecordError, TypeRegistry, Typed, Value, contract};

    use super::{Format, JsonFormat};
    use crate::error::DeserializeError;

    #[contract]
    pub trait Test {
        fn get_number(&self) -> Result<Option<i8>, RecordError>;
        fn set_number(&mut self, number: Option<i8>) -> Result<&mut Self, RecordError>;
    }

    #[contract]
    pub trait Profile {
        fn get_name(&self) -> Result<Option<String>, RecordError>;
        fn set_name(&mut self, name: Option<String>) -> Result<&mut Self, RecordError>;
        fn get_id(&self) -> Result<Option<uuid::Uuid>, RecordError>;
        fn set_id(&mut self, id: Option<uuid::Uuid>) -> Result<&mut Self, RecordError>;
        fn get_avatar(&self) -> Result<Option<Bytes>, RecordError>;
        fn set_avatar(&mut self, avatar: Option<Bytes>) -> Result<&mut Self, RecordError>;
        fn get_score(&self) -> Result<Option<f32>, RecordError>;
        fn set_score(&mut self, score: Option<f32>) -> Result<&mut Self, RecordError>;
        fn get_best(&self) -> Result<Option<Typed<dyn Test>>, RecordError>;
        fn set_best(&mut self, best: Option<Typed<dyn Test>>) -> Result<&mut Self, RecordError>;
        fn get_history(&self) -> Result<Option<Vec<Typed<dyn Test>>>, RecordError>;
        fn set_history(&mut self, history: Option<Vec<Typed<dyn Test>>>) -> Result<&mut Self, RecordError>;
    }

    fn registry() -> TypeRegistry {
        TypeRegistry::builder().register::<dyn Test>("test@1.0").unwrap().build()
    }

    fn json_text(json: &JsonFormat, value: &Value) -> serde_json::Value {
        serde_json::from_slice(&json.serialize(value).unwrap()).unwrap()
    }

    #[test]
    fn scalars() {
        let json = JsonFormat::default();
        assert_eq!(json.deserialize(b"true").unwrap(), Value::Bool(true));
        assert_eq!(json.deserialize(br#""Hello World""#).unwrap(), Value::from("Hello World"));
        assert_eq!(json.serialize(&Value::Bool(true)).unwrap(), b"true");
        assert_eq!(json.serialize(&Value::from("Hello World")).unwrap(), br#""Hello World""#);
    }

    #[test]
    fn binary() {
        let json = JsonFormat::default();
        let value = json
            .deserialize_to(br#""SGVsbG8gV29ybGQ=""#, &DeclaredType::Binary)
            .unwrap();
        assert_eq!(value, Value::Binary(Bytes::from(&b"Hello World"[..])));
        assert_eq!(json.serialize(&value).unwrap(), br#""SGVsbG8gV29ybGQ=""#);

        let bytes: Bytes = json.from_slice(br#""SGVsbG8gV29ybGQ=""#).unwrap();
        assert_eq!(bytes.as_slice(), b"Hello World");
    }

    #[test]
    fn type_hint() {
        let json = JsonFormat::builder().registry(registry()).build();
        let input = br#"{"__type":"test@1.0","Number":123}"#;

        let value = json.deserialize(input).unwrap();
        let record: Typed<dyn Test> = value.as_record().cloned().unwrap().into_typed().unwrap();
        assert_eq!(record.get_number().unwrap(), Some(123));
        assert_eq!(record.get("__type"), Some(Value::from("test@1.0")));

        assert_eq!(
            json_text(&json, &value),
            serde_json::json!({ "__type": "test@1.0", "Number": 123 })
        );

        // Written with a hint even when read without one.
        let plain = json
            .deserialize_to(br#"{"Number":5}"#, &DeclaredType::Record(Some(<dyn Test>::info())))
            .unwrap();
        let written = json.serialize(&plain).unwrap();
        assert!(written.starts_with(br#"{"__type":"test@1.0","#));
    }

    #[test]
    fn declared_type_wins() {
        let json = JsonFormat::builder().registry(registry()).build();
        let record: Typed<dyn Test> = json.from_slice(br#"{"__type":"bogus","Number":7}"#).unwrap();
        assert_eq!(record.get_number().unwrap(), Some(7));
        assert_eq!(record.get("__type"), Some(Value::from("bogus")));
    }

    #[test]
    fn too_wide_for_member() {
        let json = JsonFormat::default();
        let record: Typed<dyn Test> = json.from_slice(br#"{"Number":1000}"#).unwrap();
        assert_eq!(record.get("Number"), Some(Value::Int(1000)));
        assert!(matches!(record.get_number(), Err(RecordError::TypeMismatch { .. })));
    }

    #[test]
    fn round_trip() {
        let binder = Arc::new(Binder::new());
        let json = JsonFormat::builder().binder(binder.clone()).build();

        let mut best = binder.create_typed::<dyn Test>().unwrap();
        best.set_number(Some(-4)).unwrap();
        let mut older = binder.create_typed::<dyn Test>().unwrap();
        older.set_number(Some(1)).unwrap();

        let id = uuid::Uuid::new_v4();
        let mut profile = binder.create_typed::<dyn Profile>().unwrap();
        profile
            .set_name(Some("Ada".into()))
            .and_then(|p| p.set_id(Some(id)))
            .and_then(|p| p.set_avatar(Some(Bytes::from(&[0u8, 159, 255][..]))))
            .and_then(|p| p.set_score(Some(0.75)))
            .and_then(|p| p.set_best(Some(best.clone())))
            .and_then(|p| p.set_history(Some(vec![older, best])))
            .unwrap();
        profile.set("Unknown", Value::List(vec![Value::Int(1), Value::from("x")])).unwrap();

        let bytes = json.serialize(&profile.clone().into()).unwrap();
        let read: Typed<dyn Profile> = json.from_slice(&bytes).unwrap();

        assert_eq!(read, profile);
        assert_eq!(read.get_id().unwrap(), Some(id));
        assert_eq!(read.get_best().unwrap().and_then(|b| b.get_number().ok().flatten()), Some(-4));
        assert_eq!(read.get_history().unwrap().map(|h| h.len()), Some(2));
        assert_eq!(read.get("Unknown"), profile.get("Unknown"));
    }

    #[test]
    fn wide_integers() {
        let json = JsonFormat::default();
        assert_eq!(json.deserialize(b"18446744073709551616").unwrap(), Value::Int(1 << 64));

        let wide = Value::Int(1 << 100);
        let bytes = json.serialize(&wide).unwrap();
        assert_eq!(bytes, b"1267650600228229401496703205376");
        assert_eq!(json.deserialize_to(&bytes, &DeclaredType::Integer).unwrap(), wide);
        assert_eq!(json.deserialize_to(&bytes, &DeclaredType::I64).unwrap(), wide);
        assert_eq!(json.from_slice::<i128>(&bytes).unwrap(), 1 << 100);

        let too_wide = b"170141183460469231731687303715884105728";
        assert!(matches!(json.deserialize(too_wide), Err(DeserializeError::Parse(_))));
    }

    #[test]
    fn comments() {
        let input = b"/* c */ [1, // one\n 2] # two\n";

        let json = JsonFormat::default();
        assert!(json.allows_comments());
        assert_eq!(
            json.deserialize(input).unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        let mut reader: &[u8] = input;
        assert!(json.deserialize_from(&mut reader, &DeclaredType::Any).is_ok());
        assert_eq!(json.deserialize(br#""/* kept */""#).unwrap(), Value::from("/* kept */"));

        let strict = JsonFormat::builder().comments(false).build();
        assert!(matches!(strict.deserialize(input), Err(DeserializeError::Parse(_))));
        assert_eq!(strict.deserialize(b"[1]").unwrap(), Value::List(vec![Value::Int(1)]));
    }

    #[test]
    fn unknown_fields_keep_their_kind() {
        let json = JsonFormat::default();
        let input = br#"{"Number":1,"Flag":true,"Ratio":1.5,"Items":[1,"a"],"Nested":{"k":2},"Big":18446744073709551616}"#;

        let record: Typed<dyn Test> = json.from_slice(input).unwrap();
        assert_eq!(record.get_number().unwrap(), Some(1));
        assert_eq!(record.get("Flag"), Some(Value::Bool(true)));
        assert_eq!(record.get("Ratio"), Some(Value::F64(1.5)));
        assert_eq!(record.get("Items"), Some(Value::List(vec![Value::Int(1), Value::from("a")])));
        assert_eq!(
            record.get("Nested").as_ref().and_then(Value::as_map).and_then(|m| m.get("k")),
            Some(&Value::Int(2))
        );
        assert_eq!(record.get("Big"), Some(Value::Int(1 << 64)));

        let written = json.serialize(&record.clone().into()).unwrap();
        let again: Typed<dyn Test> = json.from_slice(&written).unwrap();
        assert_eq!(again, record);
    }

    #[test]
    fn mixed_list_with_declared_element() {
        let json = JsonFormat::default();
        let input = br#"[true,"Hello World",123]"#;
        let target = DeclaredType::List(Box::new(DeclaredType::I32));

        let value = json.deserialize_to(input, &target).unwrap();
        assert_eq!(
            value,
            Value::List(vec![Value::Bool(true), Value::from("Hello World"), Value::I32(123)])
        );
        assert_eq!(json.serialize(&value).unwrap(), input);
    }

    #[test]
    fn non_finite_floats() {
        let json = JsonFormat::default();
        let value = Value::List(vec![Value::F64(f64::NAN), Value::F32(f32::INFINITY)]);
        assert_eq!(json.serialize(&value).unwrap(), br#"["NaN","Infinity"]"#);

        let mut profile = Binder::shared().create_typed::<dyn Profile>().unwrap();
        profile.set_score(Some(f32::NEG_INFINITY)).unwrap();
        let bytes = json.serialize(&profile.clone().into()).unwrap();
        let read: Typed<dyn Profile> = json.from_slice(&bytes).unwrap();
        assert_eq!(read.get_score().unwrap(), Some(f32::NEG_INFINITY));
    }

    #[test]
    fn pretty() {
        let json = JsonFormat::builder().pretty(true).build();
        let value = Value::List(vec![Value::Bool(true), Value::Int(1)]);
        assert_eq!(json.serialize(&value).unwrap(), b"[\n  true,\n  1\n]");
        assert!(json.is_pretty());
    }

    #[test]
    fn reader_and_errors() {
        let json = JsonFormat::default();
        let mut input: &[u8] = b" [1, 2] ";
        let value = json
            .deserialize_from(&mut input, &DeclaredType::List(Box::new(DeclaredType::I16)))
            .unwrap();
        assert_eq!(value, Value::List(vec![Value::I16(1), Value::I16(2)]));

        assert!(matches!(json.deserialize(b"[1, 2"), Err(DeserializeError::Parse(_))));
        assert!(matches!(json.deserialize(b"1 2"), Err(DeserializeError::Parse(_))));
        assert!(matches!(
            json.from_slice::<bool>(b"1"),
            Err(DeserializeError::Mismatch { expected: DeclaredType::Bool, .. })
        ));
    }
}
