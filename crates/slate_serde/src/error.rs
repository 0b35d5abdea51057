use std::io;

use slate_record::{BindError, DeclaredType, RecordError};
use thiserror::Error;

/// Failure while writing a value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializeError {
    /// No serializer of the chain accepts the value.
    #[error("no serializer accepts a value of kind `{kind}`")]
    NoSerializer { kind: &'static str },
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Failure while reading a value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeserializeError {
    /// The input is not well-formed.
    #[error("malformed input: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Record(#[from] RecordError),
    /// The result could not be converted to the requested type.
    #[error("expected a value of type `{expected}`, found `{found}`")]
    Mismatch {
        expected: DeclaredType,
        found: &'static str,
    },
}
