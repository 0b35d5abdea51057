use thiserror::Error;

use crate::contract::ContractRef;
use crate::member::DeclaredType;

/// A contract that cannot be bound.
///
/// Raised once, when the contract is first bound. The outcome is cached by the
/// [`Binder`](crate::Binder), so binding the same contract again returns the
/// same error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BindError {
    #[error("contract `{0}` is not public")]
    NotPublic(ContractRef),
    #[error("accessor `{accessor}` of contract `{contract}` has an invalid receiver")]
    InvalidReceiver {
        contract: ContractRef,
        accessor: &'static str,
    },
    #[error(
        "accessor `{accessor}` of contract `{contract}` takes {found} parameters, expected {expected}"
    )]
    ParameterCount {
        contract: ContractRef,
        accessor: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("reader `{accessor}` of contract `{contract}` does not return a value")]
    VoidReader {
        contract: ContractRef,
        accessor: &'static str,
    },
    #[error("writer `{accessor}` of contract `{contract}` must return `&mut Self` or `()`")]
    InvalidWriterReturn {
        contract: ContractRef,
        accessor: &'static str,
    },
    #[error("`{accessor}` of contract `{contract}` is neither a reader nor a writer")]
    UnknownAccessor {
        contract: ContractRef,
        accessor: &'static str,
    },
    #[error(
        "member `{member}` of contract `{contract}` is declared as both `{first}` and `{second}`"
    )]
    AmbiguousMember {
        contract: ContractRef,
        member: Box<str>,
        first: DeclaredType,
        second: DeclaredType,
    },
}

/// An error raised by record access.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordError {
    #[error("cannot modify field `{0}` of a frozen record")]
    Frozen(Box<str>),
    #[error("field `{field}` holds a {found} value, expected `{expected}`")]
    TypeMismatch {
        field: Box<str>,
        expected: DeclaredType,
        found: &'static str,
    },
    #[error("field `{0}` is absent")]
    MissingField(Box<str>),
    #[error("record is bound to `{found}`, expected `{expected}`")]
    ContractMismatch {
        expected: ContractRef,
        found: ContractRef,
    },
    #[error("accessor #{index} of contract `{contract}` is not bound to a field")]
    Unbound {
        contract: ContractRef,
        index: usize,
    },
    #[error(transparent)]
    Bind(#[from] BindError),
}

/// A duplicate registration in a [`TypeRegistry`](crate::TypeRegistry).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("type name `{name}` is already registered for `{contract}`")]
    DuplicateName { name: Box<str>, contract: ContractRef },
    #[error("contract `{contract}` is already registered as `{name}`")]
    DuplicateContract { contract: ContractRef, name: Box<str> },
}

/// A misuse of the [`ValueWriter`](crate::writer::ValueWriter) state machine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriterError {
    #[error("writer is already finished")]
    Finished,
    #[error("name is already set")]
    NameAlreadySet,
    #[error("names can only be written inside a map or record")]
    NameOutsideContainer,
    #[error("a name is required inside a map or record")]
    NameRequired,
    #[error("not writing a {expected}")]
    Mismatched { expected: &'static str },
    #[error("{0} container(s) are still open")]
    Incomplete(usize),
    #[error("nothing was written")]
    Empty,
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Record(#[from] RecordError),
}
