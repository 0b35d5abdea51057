//! Provides the [`contract`] attribute macro of `slate_record`.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{ItemTrait, parse_macro_input};

static MEMBER_ATTRIBUTE_NAME: &str = "member";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;
mod utils;

// -----------------------------------------------------------------------------
// Macros

/// # Record Contracts
///
/// `#[contract]` turns a trait into a record contract. It implements:
///
/// - `Contract` for `dyn Trait`, describing every accessor in a static descriptor;
/// - `Trait` for `Typed<dyn Trait>`, reading and writing the record's fields.
///
/// The descriptor is validated by the `Binder` the first time the contract is
/// bound; records (and therefore `Typed` views) only exist for contracts that
/// passed validation.
///
/// ## Accessors
///
/// ```rust, ignore
/// #[contract]
/// pub trait Person {
///     // Reader: `get_`/`is_`, no arguments, returns `Result<T, E>`.
///     fn get_name(&self) -> Result<Option<String>, RecordError>;
///     fn is_admin(&self) -> Result<Option<bool>, RecordError>;
///
///     // Writer: `set_`/`with_`, one argument, returns `Result<&mut Self, E>` or `Result<(), E>`.
///     fn set_name(&mut self, name: Option<String>) -> Result<&mut Self, RecordError>;
///     fn with_admin(&mut self, admin: Option<bool>) -> Result<(), RecordError>;
/// }
/// ```
///
/// The member name is the accessor name without its prefix, in UpperCamel case
/// (`get_first_name` -> `FirstName`). The declared type of a member is the
/// argument type of its writer. `E` must implement `From<RecordError>`.
///
/// Methods with a default body are left alone.
///
/// ## Member names
///
/// `#[member(name = "...")]` overrides the name of one accessor:
///
/// ```rust, ignore
/// #[contract]
/// pub trait Hinted {
///     #[member(name = "__type")]
///     fn get_type_hint(&self) -> Result<Option<String>, RecordError>;
/// }
/// ```
///
/// ## Auto registration
///
/// With the `auto_register` feature, `#[contract(type_name = "name@1.0")]` submits
/// the contract under that wire name, to be collected by
/// `TypeRegistryBuilder::with_registered`. Without the feature the name is ignored.
///
/// ## Dyn compatibility
///
/// Accessors whose signature mentions `Self` get a `where Self: Sized` bound so
/// that `dyn Trait` stays a valid type. Generic methods, associated types and
/// associated constants are rejected.
#[proc_macro_attribute]
pub fn contract(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut attrs = derive_data::ContractAttributes::default();
    let parser = syn::meta::parser(|meta| attrs.parse(meta));
    parse_macro_input!(args with parser);

    let item = parse_macro_input!(input as ItemTrait);

    match derive_data::ContractMeta::new(attrs, item) {
        Ok(meta) => impls::impl_contract(&meta).into(),
        Err(err) => err.into_compile_error().into(),
    }
}
