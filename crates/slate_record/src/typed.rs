use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use crate::binding::Accessor;
use crate::contract::Contract;
use crate::error::RecordError;
use crate::member::Member;
use crate::record::Record;
use crate::value::Value;

/// A [`Record`] viewed through its contract `C`.
///
/// [`contract`](macro@crate::contract) implements the contract trait for
/// `Typed<dyn Trait>`, so the declared accessors can be called directly.
/// Everything else of [`Record`] is reachable through `Deref`.
pub struct Typed<C: ?Sized> {
    record: Record,
    _marker: PhantomData<fn() -> *const C>,
}

impl<C: ?Sized + Contract> Typed<C> {
    // Callers check that `record` is bound to `C`.
    #[inline]
    pub(crate) fn new_unchecked(record: Record) -> Self {
        Self {
            record,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn as_record(&self) -> &Record {
        &self.record
    }

    #[inline]
    pub fn into_record(self) -> Record {
        self.record
    }

    fn field(&self, index: usize, write: bool) -> Result<&str, RecordError> {
        match (self.record.binding().accessor(index), write) {
            (Some(Accessor::Read(field)), false) | (Some(Accessor::Write(field)), true) => Ok(&**field),
            _ => Err(RecordError::Unbound {
                contract: C::info(),
                index,
            }),
        }
    }

    /// Read through the reader at `index` of the contract's accessors.
    #[doc(hidden)]
    pub fn read<T: Member>(&self, index: usize) -> Result<T, RecordError> {
        let field = self.field(index, false)?;
        match self.record.fields().read().get(field) {
            None => T::from_absent().ok_or_else(|| RecordError::MissingField(field.into())),
            Some(value) => T::from_value(value).ok_or_else(|| RecordError::TypeMismatch {
                field: field.into(),
                expected: T::declared_type(),
                found: value.kind(),
            }),
        }
    }

    /// Write through the writer at `index` of the contract's accessors.
    #[doc(hidden)]
    pub fn write<T: Member>(&mut self, index: usize, value: T) -> Result<(), RecordError> {
        let value: Value = value.into_value();
        let field = self.field(index, true)?;
        self.record.fields().insert(field, value)?;
        Ok(())
    }
}

impl<C: ?Sized> Deref for Typed<C> {
    type Target = Record;

    #[inline]
    fn deref(&self) -> &Record {
        &self.record
    }
}

impl<C: ?Sized> DerefMut for Typed<C> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

impl<C: ?Sized> Clone for Typed<C> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            record: self.record.clone(),
            _marker: PhantomData,
        }
    }
}

impl<C: ?Sized> PartialEq for Typed<C> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record
    }
}

impl<C: ?Sized> Eq for Typed<C> {}

impl<C: ?Sized> Hash for Typed<C> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.record.hash(state);
    }
}

impl<C: ?Sized> fmt::Debug for Typed<C> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.record, f)
    }
}

impl<C: ?Sized> From<Typed<C>> for Record {
    #[inline]
    fn from(value: Typed<C>) -> Self {
        value.record
    }
}

impl<C: ?Sized> From<Typed<C>> for Value {
    #[inline]
    fn from(value: Typed<C>) -> Self {
        Value::Record(value.record)
    }
}
