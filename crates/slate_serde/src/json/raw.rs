use core::fmt;

use serde_core::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use slate_record::{Bytes, Value, ValueMap};

/// Key of the single-entry map `serde_json` hands out for every number when
/// its `arbitrary_precision` feature is on. The value is the number's text.
const NUMBER_TOKEN: &str = "$serde_json::private::Number";

/// Parse the text of a JSON number.
///
/// Integers of any length up to the range of `i128` become [`Value::Int`];
/// wider ones are an error rather than a rounded float.
fn parse_number<E: de::Error>(text: &str) -> Result<Value, E> {
    if text.bytes().any(|b| matches!(b, b'.' | b'e' | b'E')) {
        return text
            .parse::<f64>()
            .map(Value::F64)
            .map_err(|_| E::custom(format_args!("invalid number {text}")));
    }
    text.parse::<i128>()
        .map(Value::Int)
        .map_err(|_| E::custom(format_args!("integer {text} is out of range")))
}

/// Reads any JSON value into an untyped [`Value`] tree.
///
/// Integers become [`Value::Int`] without losing digits, decimals
/// [`Value::F64`], arrays [`Value::List`] and objects [`Value::Map`].
#[derive(Clone, Copy)]
pub(super) struct RawSeed;

impl<'de> DeserializeSeed<'de> for RawSeed {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(RawVisitor)
    }
}

struct RawVisitor;

impl<'de> Visitor<'de> for RawVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    #[inline]
    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    #[inline]
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(i128::from(v)))
    }

    #[inline]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Int(i128::from(v)))
    }

    #[inline]
    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Value, E> {
        i128::try_from(v)
            .map(Value::Int)
            .map_err(|_| E::custom(format_args!("integer {v} is out of range")))
    }

    #[inline]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::F64(v))
    }

    #[inline]
    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    #[inline]
    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    #[inline]
    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Value, E> {
        Ok(Value::Binary(Bytes::from(v)))
    }

    #[inline]
    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Value, E> {
        Ok(Value::Binary(Bytes::new(v)))
    }

    #[inline]
    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    #[inline]
    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        RawSeed.deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(item) = seq.next_element_seed(RawSeed)? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let Some(first) = map.next_key::<String>()? else {
            return Ok(Value::Map(ValueMap::default()));
        };
        if first == NUMBER_TOKEN {
            let text = map.next_value::<String>()?;
            return parse_number(&text);
        }

        let mut entries = ValueMap::default();
        entries.reserve(map.size_hint().unwrap_or_default());
        entries.insert(first, map.next_value_seed(RawSeed)?);
        while let Some(name) = map.next_key::<String>()? {
            let value = map.next_value_seed(RawSeed)?;
            entries.insert(name, value);
        }
        Ok(Value::Map(entries))
    }
}

// -----------------------------------------------------------------------------
// Tests
