use core::fmt;
use core::hash::BuildHasher;

use uuid::Uuid;

use crate::contract::{Contract, ContractRef};
use crate::record::Record;
use crate::typed::Typed;
use crate::value::{Bytes, Value, ValueMap};

// -----------------------------------------------------------------------------
// DeclaredType

/// The declared type of a member, captured from a writer's argument.
///
/// Deserialization uses it to narrow wide numbers, decode binary data and pick
/// the contract of nested records. `Any` leaves values untyped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DeclaredType {
    #[default]
    Any,
    Bool,
    String,
    I8,
    I16,
    I32,
    I64,
    Integer,
    F32,
    F64,
    Binary,
    Uuid,
    List(Box<DeclaredType>),
    /// String-keyed map with the given value type.
    Map(Box<DeclaredType>),
    /// A record, optionally of a known contract.
    Record(Option<ContractRef>),
}

impl DeclaredType {
    /// Returns `true` for the numeric types scalar narrowing targets.
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            DeclaredType::I8
                | DeclaredType::I16
                | DeclaredType::I32
                | DeclaredType::I64
                | DeclaredType::Integer
                | DeclaredType::F32
                | DeclaredType::F64
        )
    }

    /// Element type of a list, or [`DeclaredType::Any`].
    pub fn element(&self) -> &DeclaredType {
        match self {
            DeclaredType::List(inner) | DeclaredType::Map(inner) => inner,
            _ => &DeclaredType::Any,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Any => f.write_str("any"),
            DeclaredType::Bool => f.write_str("bool"),
            DeclaredType::String => f.write_str("string"),
            DeclaredType::I8 => f.write_str("i8"),
            DeclaredType::I16 => f.write_str("i16"),
            DeclaredType::I32 => f.write_str("i32"),
            DeclaredType::I64 => f.write_str("i64"),
            DeclaredType::Integer => f.write_str("integer"),
            DeclaredType::F32 => f.write_str("f32"),
            DeclaredType::F64 => f.write_str("f64"),
            DeclaredType::Binary => f.write_str("binary"),
            DeclaredType::Uuid => f.write_str("uuid"),
            DeclaredType::List(inner) => write!(f, "list<{inner}>"),
            DeclaredType::Map(inner) => write!(f, "map<string, {inner}>"),
            DeclaredType::Record(None) => f.write_str("record"),
            DeclaredType::Record(Some(contract)) => write!(f, "record<{}>", contract.name()),
        }
    }
}

// -----------------------------------------------------------------------------
// Member

/// A Rust type that can be stored in a record field.
///
/// Accessor arguments and results of a contract must implement `Member`.
/// `Option<T>` maps `None` to absence.
pub trait Member: Sized {
    fn declared_type() -> DeclaredType;

    fn into_value(self) -> Value;

    /// Convert a stored value, `None` if it does not fit this type.
    fn from_value(value: &Value) -> Option<Self>;

    /// The result of reading an absent field, `None` if absence is an error.
    #[inline]
    fn from_absent() -> Option<Self> {
        None
    }
}

macro_rules! impl_integer_member {
    ($($ty:ty => $variant:ident, $declared:ident;)*) => {
        $(
            impl Member for $ty {
                #[inline]
                fn declared_type() -> DeclaredType {
                    DeclaredType::$declared
                }

                #[inline]
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_integer().and_then(|v| <$ty>::try_from(v).ok())
                }
            }
        )*
    };
}

impl_integer_member! {
    i8 => I8, I8;
    i16 => I16, I16;
    i32 => I32, I32;
    i64 => I64, I64;
    i128 => Int, Integer;
}

impl Member for f32 {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::F32
    }

    #[inline]
    fn into_value(self) -> Value {
        Value::F32(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match *value {
            Value::F32(v) => Some(v),
            Value::F64(v) => {
                let narrow = v as f32;
                (narrow as f64 == v).then_some(narrow)
            }
            _ => None,
        }
    }
}

impl Member for f64 {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::F64
    }

    #[inline]
    fn into_value(self) -> Value {
        Value::F64(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match *value {
            Value::F32(v) => Some(v as f64),
            Value::F64(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_simple_member {
    ($($ty:ty => $variant:ident, $declared:ident;)*) => {
        $(
            impl Member for $ty {
                #[inline]
                fn declared_type() -> DeclaredType {
                    DeclaredType::$declared
                }

                #[inline]
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_simple_member! {
    bool => Bool, Bool;
    String => String, String;
    Bytes => Binary, Binary;
    Uuid => Uuid, Uuid;
}

impl Member for Value {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::Any
    }

    #[inline]
    fn into_value(self) -> Value {
        self
    }

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    #[inline]
    fn from_absent() -> Option<Self> {
        Some(Value::Null)
    }
}

impl Member for Record {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::Record(None)
    }

    #[inline]
    fn into_value(self) -> Value {
        Value::Record(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_record().cloned()
    }
}

impl<C: ?Sized + Contract> Member for Typed<C> {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::Record(Some(C::info()))
    }

    #[inline]
    fn into_value(self) -> Value {
        Value::Record(self.into_record())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_record().and_then(|r| r.clone().into_typed().ok())
    }
}

impl<T: Member> Member for Option<T> {
    #[inline]
    fn declared_type() -> DeclaredType {
        T::declared_type()
    }

    #[inline]
    fn into_value(self) -> Value {
        self.map_or(Value::Null, T::into_value)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            v => T::from_value(v).map(Some),
        }
    }

    #[inline]
    fn from_absent() -> Option<Self> {
        Some(None)
    }
}

impl<T: Member> Member for Vec<T> {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::List(Box::new(T::declared_type()))
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(T::into_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_value).collect()
    }
}

impl<T: Member, S: BuildHasher + Default> Member for std::collections::HashMap<String, T, S> {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::Map(Box::new(T::declared_type()))
    }

    fn into_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value
            .as_map()?
            .iter()
            .map(|(k, v)| T::from_value(v).map(|v| (k.clone(), v)))
            .collect()
    }
}

impl<T: Member> Member for crate::hash::HashMap<String, T> {
    #[inline]
    fn declared_type() -> DeclaredType {
        DeclaredType::Map(Box::new(T::declared_type()))
    }

    fn into_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        let map: &ValueMap = value.as_map()?;
        map.iter()
            .map(|(k, v)| T::from_value(v).map(|v| (k.clone(), v)))
            .collect()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{DeclaredType, Member};
    use crate::value::{Bytes, Value};

    #[test]
    fn declared_types() {
        assert_eq!(<Option<String>>::declared_type(), DeclaredType::String);
        assert_eq!(
            <Vec<Option<i8>>>::declared_type(),
            DeclaredType::List(Box::new(DeclaredType::I8))
        );
        assert_eq!(
            <std::collections::HashMap<String, i32>>::declared_type(),
            DeclaredType::Map(Box::new(DeclaredType::I32))
        );
        assert_eq!(<Bytes>::declared_type().to_string(), "binary");
    }

    #[test]
    fn integers_convert_when_they_fit() {
        assert_eq!(i8::from_value(&Value::Int(100)), Some(100));
        assert_eq!(i8::from_value(&Value::Int(1000)), None);
        assert_eq!(i64::from_value(&Value::I8(-3)), Some(-3));
        assert_eq!(i32::from_value(&Value::String("1".into())), None);
    }

    #[test]
    fn floats_convert_exactly() {
        assert_eq!(f32::from_value(&Value::F64(0.5)), Some(0.5));
        assert_eq!(f32::from_value(&Value::F64(0.1)), None);
        assert_eq!(f64::from_value(&Value::F32(0.5)), Some(0.5));
    }

    #[test]
    fn option_maps_absence() {
        assert_eq!(<Option<bool>>::from_absent(), Some(None));
        assert_eq!(<bool>::from_absent(), None);
        assert_eq!(Some(true).into_value(), Value::Bool(true));
        assert_eq!(None::<bool>.into_value(), Value::Null);
    }

    #[test]
    fn collections() {
        let list = vec![Some(1i32), None].into_value();
        assert_eq!(list, Value::List(vec![Value::I32(1), Value::Null]));
        assert_eq!(<Vec<Option<i32>>>::from_value(&list), Some(vec![Some(1), None]));
        assert_eq!(<Vec<i32>>::from_value(&list), None);
    }
}
