use alloc::sync::Arc;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::binding::{Binding, Members};
use crate::contract::{Contract, ContractRef};
use crate::error::RecordError;
use crate::fields::Fields;
use crate::hash;
use crate::typed::Typed;
use crate::value::Value;

/// A named-field value bound to a contract.
///
/// The entries live in a shared [`Fields`] store: cloning a record (or calling
/// [`Record::as_map`]) aliases the entries, while
/// [`Binder::copy`](crate::Binder::copy) makes an independent copy.
///
/// Equality and hashing only look at the entries. Records bound to different
/// contracts compare equal when their entries are equal.
///
/// # Examples
///
/// ```
/// use slate_record::{Binder, RecordError, Value, contract};
///
/// #[contract]
/// pub trait Named {
///     fn get_name(&self) -> Result<Option<String>, RecordError>;
///     fn set_name(&mut self, name: Option<String>) -> Result<&mut Self, RecordError>;
/// }
///
/// let binder = Binder::new();
/// let mut record = binder.create(<dyn Named as slate_record::Contract>::info()).unwrap();
///
/// record.set("Name", "Ada").unwrap();
/// record.set("Unknown", 42).unwrap();
/// assert_eq!(record.get("Name"), Some(Value::from("Ada")));
///
/// record.set("Unknown", Value::Null).unwrap();
/// assert_eq!(record.len(), 1);
///
/// record.freeze();
/// assert!(matches!(record.set("Name", "Bob"), Err(RecordError::Frozen(_))));
/// ```
#[derive(Clone)]
pub struct Record {
    binding: Arc<Binding>,
    fields: Fields,
}

impl Record {
    #[inline]
    pub(crate) fn new(binding: Arc<Binding>, fields: Fields) -> Self {
        Self { binding, fields }
    }

    /// The contract this record is bound to.
    #[inline]
    pub fn contract(&self) -> ContractRef {
        self.binding.contract()
    }

    #[inline]
    pub fn binding(&self) -> &Arc<Binding> {
        &self.binding
    }

    /// The member table of the bound contract.
    #[inline]
    pub fn members(&self) -> &Members {
        self.binding.members()
    }

    /// A clone of the value stored under `name`, `None` if absent.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    /// Store `value` under `name`. Storing `Null` removes the field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<&mut Self, RecordError> {
        self.fields.insert(name, value.into())?;
        Ok(self)
    }

    /// Remove `name`, returning its value.
    #[inline]
    pub fn remove(&mut self, name: &str) -> Result<Option<Value>, RecordError> {
        self.fields.remove(name)
    }

    /// A snapshot of the entries.
    #[inline]
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.fields.entries()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Make the record immutable. Freezing is one-way and idempotent.
    #[inline]
    pub fn freeze(&mut self) -> &mut Self {
        self.fields.freeze();
        self
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.fields.is_frozen()
    }

    /// A view of the entries sharing this record's store.
    ///
    /// Mutations through the view affect the record and fail once it is frozen.
    #[inline]
    pub fn as_map(&self) -> Fields {
        self.fields.clone()
    }

    /// Borrow the underlying store.
    #[inline]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// View this record through the contract `C`.
    ///
    /// Fails if the record is bound to another contract; use
    /// [`Binder::cast`](crate::Binder::cast) to re-bind it.
    pub fn into_typed<C: ?Sized + Contract>(self) -> Result<Typed<C>, RecordError> {
        let expected = C::info();
        if self.contract() == expected {
            Ok(Typed::new_unchecked(self))
        } else {
            Err(RecordError::ContractMismatch {
                expected,
                found: self.contract(),
            })
        }
    }
}

impl PartialEq for Record {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(hash::unordered_hash(self.fields.read().iter()));
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("contract", &format_args!("{}", self.contract()))
            .field("frozen", &self.is_frozen())
            .field("fields", &self.fields)
            .finish()
    }
}
