//! The standard serializers.

use alloc::sync::Arc;

use slate_record::{Record, TypeRegistry, Value};

use super::{Serializer, Serializers, TokenSink};
use crate::TYPE_FIELD;
use crate::error::SerializeError;

// -----------------------------------------------------------------------------
// Scalars

/// Null, booleans, strings and numbers of every width.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarSerializer;

impl Serializer for ScalarSerializer {
    fn can_serialize(&self, value: &Value) -> bool {
        matches!(
            value,
            Value::Null
                | Value::Bool(_)
                | Value::String(_)
                | Value::I8(_)
                | Value::I16(_)
                | Value::I32(_)
                | Value::I64(_)
                | Value::Int(_)
                | Value::F32(_)
                | Value::F64(_)
        )
    }

    fn serialize(&self, value: &Value, sink: &mut dyn TokenSink, _: &Serializers) -> Result<(), SerializeError> {
        match value {
            Value::Null => sink.write_null(),
            Value::Bool(v) => sink.write_bool(*v),
            Value::String(v) => sink.write_str(v),
            Value::I8(v) => sink.write_i64(i64::from(*v)),
            Value::I16(v) => sink.write_i64(i64::from(*v)),
            Value::I32(v) => sink.write_i64(i64::from(*v)),
            Value::I64(v) => sink.write_i64(*v),
            Value::Int(v) => sink.write_i128(*v),
            Value::F32(v) => sink.write_f32(*v),
            Value::F64(v) => sink.write_f64(*v),
            _ => Err(SerializeError::NoSerializer { kind: value.kind() }),
        }
    }
}

// -----------------------------------------------------------------------------
// Binary

#[derive(Debug, Clone, Copy, Default)]
pub struct BinarySerializer;

impl Serializer for BinarySerializer {
    fn can_serialize(&self, value: &Value) -> bool {
        matches!(value, Value::Binary(_))
    }

    fn serialize(&self, value: &Value, sink: &mut dyn TokenSink, _: &Serializers) -> Result<(), SerializeError> {
        match value {
            Value::Binary(bytes) => sink.write_binary(bytes),
            _ => Err(SerializeError::NoSerializer { kind: value.kind() }),
        }
    }
}

/// UUIDs as their 16 bytes, most significant first.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSerializer;

impl Serializer for UuidSerializer {
    fn can_serialize(&self, value: &Value) -> bool {
        matches!(value, Value::Uuid(_))
    }

    fn serialize(&self, value: &Value, sink: &mut dyn TokenSink, _: &Serializers) -> Result<(), SerializeError> {
        match value {
            Value::Uuid(uuid) => sink.write_binary(uuid.as_bytes()),
            _ => Err(SerializeError::NoSerializer { kind: value.kind() }),
        }
    }
}

// -----------------------------------------------------------------------------
// Containers

#[derive(Debug, Clone, Copy, Default)]
pub struct ListSerializer;

impl Serializer for ListSerializer {
    fn can_serialize(&self, value: &Value) -> bool {
        matches!(value, Value::List(_))
    }

    fn serialize(&self, value: &Value, sink: &mut dyn TokenSink, chain: &Serializers) -> Result<(), SerializeError> {
        let Value::List(items) = value else {
            return Err(SerializeError::NoSerializer { kind: value.kind() });
        };
        sink.write_start_array(Some(items.len()))?;
        for item in items {
            chain.serialize(item, sink)?;
        }
        sink.write_end_array()
    }
}

/// Maps as objects. Null entries are omitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapSerializer;

impl Serializer for MapSerializer {
    fn can_serialize(&self, value: &Value) -> bool {
        matches!(value, Value::Map(_))
    }

    fn serialize(&self, value: &Value, sink: &mut dyn TokenSink, chain: &Serializers) -> Result<(), SerializeError> {
        let Value::Map(map) = value else {
            return Err(SerializeError::NoSerializer { kind: value.kind() });
        };
        let len = map.values().filter(|v| !v.is_null()).count();
        sink.write_start_object(Some(len))?;
        for (name, value) in map.iter().filter(|(_, v)| !v.is_null()) {
            sink.write_field_name(name)?;
            chain.serialize(value, sink)?;
        }
        sink.write_end_object()
    }
}

/// Records as objects.
///
/// With a registry, a record whose contract is registered and that carries
/// no `__type` entry of its own is written with a leading `__type` field.
#[derive(Debug, Clone, Default)]
pub struct RecordSerializer {
    registry: Option<Arc<TypeRegistry>>,
}

impl RecordSerializer {
    #[inline]
    pub fn new(registry: Option<Arc<TypeRegistry>>) -> Self {
        Self { registry }
    }

    fn type_name<'a>(&'a self, record: &Record) -> Option<&'a str> {
        if record.contains(TYPE_FIELD) {
            return None;
        }
        self.registry.as_deref()?.get_name(record.contract())
    }
}

impl Serializer for RecordSerializer {
    fn can_serialize(&self, value: &Value) -> bool {
        matches!(value, Value::Record(_))
    }

    fn serialize(&self, value: &Value, sink: &mut dyn TokenSink, chain: &Serializers) -> Result<(), SerializeError> {
        let Value::Record(record) = value else {
            return Err(SerializeError::NoSerializer { kind: value.kind() });
        };

        // Snapshot, so the lock is not held while nested values are written.
        let entries = record.entries();
        let type_name = self.type_name(record);

        sink.write_start_object(Some(entries.len() + usize::from(type_name.is_some())))?;
        if let Some(name) = type_name {
            sink.write_field_name(TYPE_FIELD)?;
            sink.write_str(name)?;
        }
        for (name, value) in &entries {
            sink.write_field_name(name)?;
            chain.serialize(value, sink)?;
        }
        sink.write_end_object()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use slate_record::{Binder, Bytes, RecordError, TypeRegistry, Value, ValueMap, contract};

    use crate::error::SerializeError;
    use crate::ser::{Serializer, Serializers, TokenSink};

    /// Records events as text.
    #[derive(Default)]
    struct Events(Vec<String>);

    impl TokenSink for Events {
        fn write_null(&mut self) -> Result<(), SerializeError> {
            self.0.push("null".into());
            Ok(())
        }
        fn write_bool(&mut self, value: bool) -> Result<(), SerializeError> {
            self.0.push(format!("bool {value}"));
            Ok(())
        }
        fn write_str(&mut self, value: &str) -> Result<(), SerializeError> {
            self.0.push(format!("str {value}"));
            Ok(())
        }
        fn write_i64(&mut self, value: i64) -> Result<(), SerializeError> {
            self.0.push(format!("i64 {value}"));
            Ok(())
        }
        fn write_i128(&mut self, value: i128) -> Result<(), SerializeError> {
            self.0.push(format!("i128 {value}"));
            Ok(())
        }
        fn write_f32(&mut self, value: f32) -> Result<(), SerializeError> {
            self.0.push(format!("f32 {value}"));
            Ok(())
        }
        fn write_f64(&mut self, value: f64) -> Result<(), SerializeError> {
            self.0.push(format!("f64 {value}"));
            Ok(())
        }
        fn write_binary(&mut self, value: &[u8]) -> Result<(), SerializeError> {
            self.0.push(format!("binary {value:?}"));
            Ok(())
        }
        fn write_start_array(&mut self, len: Option<usize>) -> Result<(), SerializeError> {
            self.0.push(format!("[ {len:?}"));
            Ok(())
        }
        fn write_end_array(&mut self) -> Result<(), SerializeError> {
            self.0.push("]".into());
            Ok(())
        }
        fn write_start_object(&mut self, len: Option<usize>) -> Result<(), SerializeError> {
            self.0.push(format!("{{ {len:?}"));
            Ok(())
        }
        fn write_field_name(&mut self, name: &str) -> Result<(), SerializeError> {
            self.0.push(format!("name {name}"));
            Ok(())
        }
        fn write_end_object(&mut self) -> Result<(), SerializeError> {
            self.0.push("}".into());
            Ok(())
        }
    }

    fn events(chain: &Serializers, value: &Value) -> Vec<String> {
        let mut sink = Events::default();
        chain.serialize(value, &mut sink).unwrap();
        sink.0
    }

    #[contract]
    pub trait Numbered {
        fn get_number(&self) -> Result<Option<i32>, RecordError>;
        fn set_number(&mut self, number: Option<i32>) -> Result<&mut Self, RecordError>;
    }

    #[test]
    fn scalars_and_containers() {
        let chain = Serializers::standard(None);
        let value = Value::List(vec![
            Value::Bool(true),
            Value::from("Hello World"),
            Value::I8(-3),
            Value::Int(1 << 100),
            Value::Binary(Bytes::from(&b"ab"[..])),
        ]);

        assert_eq!(
            events(&chain, &value),
            [
                "[ Some(5)",
                "bool true",
                "str Hello World",
                "i64 -3",
                "i128 1267650600228229401496703205376",
                "binary [97, 98]",
                "]",
            ]
        );
    }

    #[test]
    fn map_omits_null() {
        let chain = Serializers::standard(None);
        let mut map = ValueMap::default();
        map.insert("gone".into(), Value::Null);
        map.insert("kept".into(), Value::from(1.5f64));

        assert_eq!(
            events(&chain, &Value::Map(map)),
            ["{ Some(1)", "name kept", "f64 1.5", "}"]
        );
    }

    #[test]
    fn uuid_as_bytes() {
        let chain = Serializers::standard(None);
        let uuid = uuid::Uuid::from_bytes([7; 16]);
        assert_eq!(
            events(&chain, &Value::Uuid(uuid)),
            [format!("binary {:?}", [7u8; 16])]
        );
    }

    #[test]
    fn record_type_hint() {
        let binder = Binder::new();
        let mut record = binder.create_typed::<dyn Numbered>().unwrap();
        record.set_number(Some(123)).unwrap();
        let value = Value::from(record.clone());

        let plain = Serializers::standard(None);
        assert_eq!(events(&plain, &value), ["{ Some(1)", "name Number", "i64 123", "}"]);

        let registry = TypeRegistry::builder()
            .register::<dyn Numbered>("test@1.0")
            .unwrap()
            .build();
        let hinted = Serializers::standard(Some(Arc::new(registry)));
        assert_eq!(
            events(&hinted, &value),
            ["{ Some(2)", "name __type", "str test@1.0", "name Number", "i64 123", "}"]
        );

        // An explicit hint is written as a regular entry.
        record.set("__type", "custom").unwrap();
        let value = Value::from(record);
        let written = events(&hinted, &value);
        assert_eq!(written.iter().filter(|e| *e == "name __type").count(), 1);
        assert!(written.contains(&"str custom".to_owned()));
    }

    #[test]
    fn dispatch() {
        struct Upper;

        impl Serializer for Upper {
            fn can_serialize(&self, value: &Value) -> bool {
                matches!(value, Value::String(_))
            }

            fn serialize(
                &self,
                value: &Value,
                sink: &mut dyn TokenSink,
                _: &Serializers,
            ) -> Result<(), SerializeError> {
                sink.write_str(&value.as_str().unwrap_or_default().to_uppercase())
            }
        }

        let base = Serializers::standard(None);
        let chain = crate::ser::SerializersBuilder::copy(&base).with(Upper).build();
        assert_eq!(chain.len(), base.len() + 1);

        let value = Value::List(vec![Value::from("abc"), Value::from(true)]);
        assert_eq!(events(&chain, &value), ["[ Some(2)", "str ABC", "bool true", "]"]);
        assert_eq!(events(&base, &value), ["[ Some(2)", "str abc", "bool true", "]"]);

        let empty = Serializers::builder().build();
        let mut sink = Events::default();
        assert!(matches!(
            empty.serialize(&Value::from(1), &mut sink),
            Err(SerializeError::NoSerializer { kind }) if kind == Value::from(1).kind()
        ));
    }
}
