#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;

pub mod de;
pub mod json;
pub mod ser;

// -----------------------------------------------------------------------------
// Exports

pub use error::{DeserializeError, SerializeError};

/// Field carrying the wire name of a record's contract.
pub const TYPE_FIELD: &str = "__type";
