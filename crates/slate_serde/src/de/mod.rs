//! Type-directed conversion of raw values through an ordered chain of deserializers.

// -----------------------------------------------------------------------------
// Modules

mod standard;

// -----------------------------------------------------------------------------
// Exports

pub use standard::{BinaryDeserializer, ListDeserializer, MapDeserializer};
pub use standard::{NarrowingDeserializer, RecordDeserializer, UuidDeserializer};

use alloc::sync::Arc;
use core::fmt;

use slate_record::{Binder, DeclaredType, TypeRegistry, Value};

use crate::error::DeserializeError;

// -----------------------------------------------------------------------------
// Deserializer

/// A strategy converting a raw [`Value`] to a declared type.
///
/// Raw values come straight from the format: integers are [`Value::Int`],
/// decimals [`Value::F64`], objects [`Value::Map`]. Nested values are
/// converted through `chain`.
pub trait Deserializer: Send + Sync {
    fn can_deserialize(&self, value: &Value, target: &DeclaredType) -> bool;

    fn deserialize(
        &self,
        value: Value,
        target: &DeclaredType,
        chain: &Deserializers,
    ) -> Result<Value, DeserializeError>;
}

// -----------------------------------------------------------------------------
// Deserializers

/// An immutable, ordered chain of [`Deserializer`]s.
///
/// The most recently added deserializer that accepts a value wins. A value
/// no deserializer accepts is returned unchanged.
#[derive(Clone)]
pub struct Deserializers {
    chain: Arc<[Arc<dyn Deserializer>]>,
}

impl Deserializers {
    #[inline]
    pub fn builder() -> DeserializersBuilder {
        DeserializersBuilder::default()
    }

    /// The standard chain, creating records with `binder` and resolving
    /// `__type` hints with `registry`.
    #[inline]
    pub fn standard(binder: Arc<Binder>, registry: Option<Arc<TypeRegistry>>) -> Self {
        DeserializersBuilder::standard(binder, registry).build()
    }

    /// The deserializer responsible for converting `value` to `target`.
    pub fn get_deserializer(&self, value: &Value, target: &DeclaredType) -> Option<&dyn Deserializer> {
        self.chain
            .iter()
            .rev()
            .find(|deserializer| deserializer.can_deserialize(value, target))
            .map(|deserializer| &**deserializer)
    }

    /// Convert `value` to `target`.
    pub fn deserialize_to(&self, value: Value, target: &DeclaredType) -> Result<Value, DeserializeError> {
        match self.get_deserializer(&value, target) {
            Some(deserializer) => deserializer.deserialize(value, target, self),
            None => {
                log::trace!("no deserializer for `{}` as `{target}`, kept as is", value.kind());
                Ok(value)
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

impl Default for Deserializers {
    /// The standard chain over the shared binder, without a registry.
    #[inline]
    fn default() -> Self {
        Self::standard(Binder::shared(), None)
    }
}

impl fmt::Debug for Deserializers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deserializers").field("len", &self.chain.len()).finish()
    }
}

// -----------------------------------------------------------------------------
// DeserializersBuilder

/// Builder of [`Deserializers`]. Later deserializers take precedence.
#[derive(Default)]
pub struct DeserializersBuilder {
    chain: Vec<Arc<dyn Deserializer>>,
}

impl DeserializersBuilder {
    /// Start from the deserializers of `chain`.
    pub fn copy(chain: &Deserializers) -> Self {
        Self {
            chain: chain.chain.to_vec(),
        }
    }

    /// Start from the standard deserializers.
    pub fn standard(binder: Arc<Binder>, registry: Option<Arc<TypeRegistry>>) -> Self {
        Self::default()
            .with(NarrowingDeserializer)
            .with(BinaryDeserializer)
            .with(UuidDeserializer)
            .with(ListDeserializer)
            .with(MapDeserializer)
            .with(RecordDeserializer::new(binder, registry))
    }

    /// Append `deserializer`, with priority over the ones already added.
    #[inline]
    pub fn with(mut self, deserializer: impl Deserializer + 'static) -> Self {
        self.chain.push(Arc::new(deserializer));
        self
    }

    /// Append a shared deserializer.
    #[inline]
    pub fn with_shared(mut self, deserializer: Arc<dyn Deserializer>) -> Self {
        self.chain.push(deserializer);
        self
    }

    #[inline]
    pub fn build(self) -> Deserializers {
        Deserializers {
            chain: self.chain.into(),
        }
    }
}
