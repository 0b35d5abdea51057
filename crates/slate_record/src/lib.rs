#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// The `#[contract]` macro emits absolute `::slate_record` paths, which must
// also resolve when the macro is expanded inside this crate.
extern crate self as slate_record;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod binder;
mod binding;
mod contract;
mod error;
mod fields;
mod member;
mod record;
mod typed;
mod value;

pub mod hash;
pub mod registry;
pub mod writer;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use slate_record_derive::contract;

pub use binder::{Binder, RecordFactory};
pub use binding::{Accessor, Binding, Members};
pub use contract::{AccessorInfo, Contract, ContractInfo, ContractRef};
pub use contract::{Receiver, Returns, Visibility};
pub use error::{BindError, RecordError, RegistryError, WriterError};
pub use fields::{Fields, FieldsRef};
pub use member::{DeclaredType, Member};
pub use record::Record;
pub use registry::TypeRegistry;
pub use typed::Typed;
pub use value::{Bytes, Value, ValueMap};
