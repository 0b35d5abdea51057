use alloc::borrow::Cow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Deref;

use uuid::Uuid;

use crate::hash::{self, HashMap};
use crate::record::Record;

/// A string-keyed map of values.
pub type ValueMap = HashMap<String, Value>;

// -----------------------------------------------------------------------------
// Bytes

/// An opaque byte blob.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    #[inline]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Bytes {
    #[inline]
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes({} bytes)", self.0.len())
    }
}

// -----------------------------------------------------------------------------
// Value

/// A field value.
///
/// Integers and decimals keep the width they were written with. Values read
/// from the wire use the wide variants [`Value::Int`] and [`Value::F64`] until
/// they are narrowed against a declared type.
///
/// `Null` stands for absence: storing it in a [`Record`] removes the field.
///
/// Floats are compared and hashed by bit pattern, so `Value` is `Eq` and `Hash`
/// and can be used inside hashed collections.
///
/// # Examples
///
/// ```
/// use slate_record::Value;
///
/// let list = Value::from(vec![Value::from(true), Value::from("Hello World"), Value::from(123)]);
/// assert_eq!(list.kind(), "list");
/// assert_eq!(Value::from(1.5f64), Value::F64(1.5));
/// ```
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    /// Wide integer.
    Int(i128),
    F32(f32),
    /// Wide decimal.
    F64(f64),
    String(String),
    Binary(Bytes),
    Uuid(Uuid),
    List(Vec<Value>),
    Map(ValueMap),
    Record(Record),
}

impl Value {
    /// A short name of the variant, used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::Int(_) => "integer",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Uuid(_) => "uuid",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer value of any width.
    pub const fn as_integer(&self) -> Option<i128> {
        match *self {
            Value::I8(v) => Some(v as i128),
            Value::I16(v) => Some(v as i128),
            Value::I32(v) => Some(v as i128),
            Value::I64(v) => Some(v as i128),
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::I8(v) => v.hash(state),
            Value::I16(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::F32(v) => v.to_bits().hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::Binary(v) => v.hash(state),
            Value::Uuid(v) => v.hash(state),
            Value::List(v) => v.hash(state),
            Value::Map(v) => state.write_u64(hash::unordered_hash(v)),
            Value::Record(v) => v.hash(state),
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => Int,
    f32 => F32,
    f64 => F64,
    String => String,
    Bytes => Binary,
    Uuid => Uuid,
    Vec<Value> => List,
    ValueMap => Map,
    Record => Record,
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<Cow<'_, str>> for Value {
    #[inline]
    fn from(value: Cow<'_, str>) -> Self {
        Value::String(value.into_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::List(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Bytes, Value, ValueMap};
    use core::hash::BuildHasher;

    use crate::hash::FixedHashState;

    #[test]
    fn float_equality_by_bits() {
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
        assert_ne!(Value::F64(0.0), Value::F64(-0.0));
        assert_ne!(Value::F32(1.0), Value::F64(1.0));
    }

    #[test]
    fn widths_are_distinct() {
        assert_ne!(Value::I8(1), Value::I32(1));
        assert_eq!(Value::I8(1).as_integer(), Value::Int(1).as_integer());
    }

    #[test]
    fn map_hash_ignores_order() {
        let mut a = ValueMap::default();
        a.insert("x".into(), Value::from(1));
        a.insert("y".into(), Value::from("two"));

        let mut b = ValueMap::default();
        b.insert("y".into(), Value::from("two"));
        b.insert("x".into(), Value::from(1));

        let (a, b) = (Value::Map(a), Value::Map(b));
        assert_eq!(a, b);
        assert_eq!(FixedHashState.hash_one(&a), FixedHashState.hash_one(&b));
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::String("a".into()));
        assert_eq!(
            Value::from(Bytes::from(&b"abc"[..])),
            Value::Binary(Bytes(b"abc".to_vec()))
        );

        let list: Value = [Value::from(1), Value::Null].into_iter().collect();
        assert_eq!(list.as_list().map(<[Value]>::len), Some(2));

        let map: Value = [("a", Value::from(true))].into_iter().collect();
        assert_eq!(map.as_map().and_then(|m| m.get("a")), Some(&Value::Bool(true)));
    }
}
