use alloc::sync::Arc;
use core::fmt;
use core::ops::Deref;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use crate::error::RecordError;
use crate::value::{Value, ValueMap};

struct Store {
    map: RwLock<ValueMap>,
    frozen: AtomicBool,
}

/// The entry store behind a record.
///
/// `Fields` is a shared handle: clones refer to the same entries, so a record
/// created with [`Binder::wrap`](crate::Binder::wrap) or viewed through
/// [`Record::as_map`](crate::Record::as_map) sees every change made through any
/// other handle. The frozen flag is part of the store and affects every handle.
///
/// `Null` is never stored. Inserting it removes the entry.
///
/// # Examples
///
/// ```
/// use slate_record::{Fields, Value};
///
/// let fields = Fields::new();
/// let alias = fields.clone();
///
/// fields.insert("Foo", Value::from("bar")).unwrap();
/// assert_eq!(alias.get("Foo"), Some(Value::from("bar")));
///
/// alias.insert("Foo", Value::Null).unwrap();
/// assert!(fields.is_empty());
/// ```
#[derive(Clone)]
pub struct Fields(Arc<Store>);

/// Read access to the entries of [`Fields`].
///
/// Holds a read lock until dropped.
pub struct FieldsRef<'a>(RwLockReadGuard<'a, ValueMap>);

impl Deref for FieldsRef<'_> {
    type Target = ValueMap;

    #[inline]
    fn deref(&self) -> &ValueMap {
        &self.0
    }
}

impl Fields {
    /// Create an empty, mutable store.
    #[inline]
    pub fn new() -> Self {
        Self::from_map(ValueMap::default())
    }

    /// Create a store owning `map`. `Null` entries are dropped.
    pub fn from_map(mut map: ValueMap) -> Self {
        map.retain(|_, v| !v.is_null());
        Self(Arc::new(Store {
            map: RwLock::new(map),
            frozen: AtomicBool::new(false),
        }))
    }

    /// Returns `true` if both handles refer to the same store.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.0.frozen.load(Ordering::Acquire)
    }

    /// Reject further mutation, through this and every other handle.
    pub fn freeze(&self) {
        let _guard = self.0.map.write().unwrap_or_else(PoisonError::into_inner);
        self.0.frozen.store(true, Ordering::Release);
    }

    /// Lock the entries for reading.
    #[inline]
    pub fn read(&self) -> FieldsRef<'_> {
        FieldsRef(self.0.map.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// A clone of the value stored under `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Store `value` under `name`, or remove the entry if `value` is `Null`.
    ///
    /// Returns the previous value.
    pub fn insert(&self, name: impl Into<String>, value: Value) -> Result<Option<Value>, RecordError> {
        let name = name.into();
        let mut map = self.0.map.write().unwrap_or_else(PoisonError::into_inner);
        if self.0.frozen.load(Ordering::Acquire) {
            return Err(RecordError::Frozen(name.into_boxed_str()));
        }
        if value.is_null() {
            Ok(map.remove(&name))
        } else {
            Ok(map.insert(name, value))
        }
    }

    pub fn remove(&self, name: &str) -> Result<Option<Value>, RecordError> {
        let mut map = self.0.map.write().unwrap_or_else(PoisonError::into_inner);
        if self.0.frozen.load(Ordering::Acquire) {
            return Err(RecordError::Frozen(name.into()));
        }
        Ok(map.remove(name))
    }

    /// An independent, mutable copy of the entries.
    pub fn snapshot(&self) -> ValueMap {
        self.read().clone()
    }

    /// A snapshot of the entries as pairs.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Default for Fields {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl From<ValueMap> for Fields {
    #[inline]
    fn from(map: ValueMap) -> Self {
        Self::from_map(map)
    }
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        *self.read() == *other.read()
    }
}

impl Eq for Fields {}

impl fmt::Debug for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.read().iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
