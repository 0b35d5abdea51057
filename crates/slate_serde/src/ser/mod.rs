//! Value serialization through an ordered chain of serializers.

// -----------------------------------------------------------------------------
// Modules

mod sink;
mod standard;

// -----------------------------------------------------------------------------
// Exports

pub use sink::TokenSink;
pub use standard::{BinarySerializer, ListSerializer, MapSerializer};
pub use standard::{RecordSerializer, ScalarSerializer, UuidSerializer};

use alloc::sync::Arc;
use core::fmt;

use slate_record::{TypeRegistry, Value};

use crate::error::SerializeError;

// -----------------------------------------------------------------------------
// Serializer

/// A strategy writing some kinds of [`Value`] into a [`TokenSink`].
///
/// Nested values are written through `chain`, so every level is dispatched
/// again.
pub trait Serializer: Send + Sync {
    fn can_serialize(&self, value: &Value) -> bool;

    fn serialize(
        &self,
        value: &Value,
        sink: &mut dyn TokenSink,
        chain: &Serializers,
    ) -> Result<(), SerializeError>;
}

// -----------------------------------------------------------------------------
// Serializers

/// An immutable, ordered chain of [`Serializer`]s.
///
/// The most recently added serializer that accepts a value wins, so a chain
/// is extended by appending overrides to a copy of an existing one.
///
/// # Examples
///
/// ```
/// use slate_record::Value;
/// use slate_serde::ser::Serializers;
///
/// let chain = Serializers::standard(None);
/// assert!(chain.get_serializer(&Value::from(1)).is_ok());
///
/// let empty = Serializers::builder().build();
/// assert!(empty.get_serializer(&Value::from(1)).is_err());
/// ```
#[derive(Clone)]
pub struct Serializers {
    chain: Arc<[Arc<dyn Serializer>]>,
}

impl Serializers {
    #[inline]
    pub fn builder() -> SerializersBuilder {
        SerializersBuilder::default()
    }

    /// The standard chain. With a `registry`, records are written with
    /// their `__type` name.
    #[inline]
    pub fn standard(registry: Option<Arc<TypeRegistry>>) -> Self {
        SerializersBuilder::standard(registry).build()
    }

    /// The serializer responsible for `value`.
    pub fn get_serializer(&self, value: &Value) -> Result<&dyn Serializer, SerializeError> {
        self.chain
            .iter()
            .rev()
            .find(|serializer| serializer.can_serialize(value))
            .map(|serializer| &**serializer)
            .ok_or(SerializeError::NoSerializer { kind: value.kind() })
    }

    /// Write `value` with the serializer responsible for it.
    #[inline]
    pub fn serialize(&self, value: &Value, sink: &mut dyn TokenSink) -> Result<(), SerializeError> {
        self.get_serializer(value)?.serialize(value, sink, self)
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

impl Default for Serializers {
    #[inline]
    fn default() -> Self {
        Self::standard(None)
    }
}

impl fmt::Debug for Serializers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializers").field("len", &self.chain.len()).finish()
    }
}

// -----------------------------------------------------------------------------
// SerializersBuilder

/// Builder of [`Serializers`]. Later serializers take precedence.
#[derive(Default)]
pub struct SerializersBuilder {
    chain: Vec<Arc<dyn Serializer>>,
}

impl SerializersBuilder {
    /// Start from the serializers of `chain`.
    pub fn copy(chain: &Serializers) -> Self {
        Self {
            chain: chain.chain.to_vec(),
        }
    }

    /// Start from the standard serializers.
    pub fn standard(registry: Option<Arc<TypeRegistry>>) -> Self {
        Self::default()
            .with(ScalarSerializer)
            .with(BinarySerializer)
            .with(UuidSerializer)
            .with(ListSerializer)
            .with(MapSerializer)
            .with(RecordSerializer::new(registry))
    }

    /// Append `serializer`, with priority over the ones already added.
    #[inline]
    pub fn with(mut self, serializer: impl Serializer + 'static) -> Self {
        self.chain.push(Arc::new(serializer));
        self
    }

    /// Append a shared serializer.
    #[inline]
    pub fn with_shared(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.chain.push(serializer);
        self
    }

    #[inline]
    pub fn build(self) -> Serializers {
        Serializers {
            chain: self.chain.into(),
        }
    }
}
