use core::fmt;
use core::hash::{Hash, Hasher};
use core::ptr;

use crate::member::DeclaredType;

/// A reference to a contract descriptor.
///
/// Descriptors are statics emitted by [`contract`](macro@crate::contract), so the
/// reference is also the contract's identity.
pub type ContractRef = &'static ContractInfo;

/// A trait (object type) that describes a record contract.
///
/// Implemented by [`contract`](macro@crate::contract) for `dyn Trait`.
pub trait Contract: 'static {
    fn info() -> ContractRef;
}

/// Visibility of the contract trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Restricted,
}

/// Receiver of an accessor declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// `&self`
    Ref,
    /// `&mut self`
    Mut,
    /// `self`
    Owned,
    /// Associated function.
    None,
}

/// Return shape of an accessor declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returns {
    /// No return type.
    Nothing,
    /// `Result<(), E>`
    Unit,
    /// `Result<&mut Self, E>`
    Chain,
    /// `Result<T, E>` for any other `T`.
    Value,
}

/// One method declared by a contract.
#[derive(Clone, Copy)]
pub struct AccessorInfo {
    name: &'static str,
    member: Option<&'static str>,
    receiver: Receiver,
    arity: usize,
    declared: Option<fn() -> DeclaredType>,
    returns: Returns,
}

impl AccessorInfo {
    /// Describe an accessor.
    ///
    /// `declared` is the type of the single argument of a writer, `member`
    /// overrides the member name derived from `name`.
    #[inline]
    pub const fn new(
        name: &'static str,
        member: Option<&'static str>,
        receiver: Receiver,
        arity: usize,
        declared: Option<fn() -> DeclaredType>,
        returns: Returns,
    ) -> Self {
        Self {
            name,
            member,
            receiver,
            arity,
            declared,
            returns,
        }
    }

    /// The method name, e.g. `set_foo`.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn member_override(&self) -> Option<&'static str> {
        self.member
    }

    #[inline]
    pub const fn receiver(&self) -> Receiver {
        self.receiver
    }

    #[inline]
    pub const fn arity(&self) -> usize {
        self.arity
    }

    /// Declared type of the argument, for single-argument accessors.
    #[inline]
    pub fn declared_type(&self) -> Option<DeclaredType> {
        self.declared.map(|f| f())
    }

    #[inline]
    pub const fn returns(&self) -> Returns {
        self.returns
    }
}

impl fmt::Debug for AccessorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorInfo")
            .field("name", &self.name)
            .field("member", &self.member)
            .field("receiver", &self.receiver)
            .field("arity", &self.arity)
            .field("returns", &self.returns)
            .finish()
    }
}

/// Static description of a contract trait.
///
/// Compared and hashed by address: two contracts with the same shape are still
/// different contracts.
pub struct ContractInfo {
    name: &'static str,
    module_path: &'static str,
    visibility: Visibility,
    accessors: &'static [AccessorInfo],
}

impl ContractInfo {
    #[inline]
    pub const fn new(
        name: &'static str,
        module_path: &'static str,
        visibility: Visibility,
        accessors: &'static [AccessorInfo],
    ) -> Self {
        Self {
            name,
            module_path,
            visibility,
            accessors,
        }
    }

    /// Name of the trait, e.g. `Person`.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn module_path(&self) -> &'static str {
        self.module_path
    }

    #[inline]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Accessors in declaration order.
    ///
    /// The index of an accessor in this slice is the index used by the
    /// binding's dispatch table.
    #[inline]
    pub const fn accessors(&self) -> &'static [AccessorInfo] {
        self.accessors
    }
}

impl PartialEq for ContractInfo {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for ContractInfo {}

impl Hash for ContractInfo {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(self, state);
    }
}

impl fmt::Display for ContractInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module_path, self.name)
    }
}

impl fmt::Debug for ContractInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractInfo")
            .field("path", &format_args!("{self}"))
            .field("visibility", &self.visibility)
            .field("accessors", &self.accessors)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{AccessorInfo, ContractInfo, Receiver, Returns, Visibility};
    use crate::member::{DeclaredType, Member};

    static EMPTY: ContractInfo = ContractInfo::new("Empty", "tests", Visibility::Public, &[]);
    static SAME_SHAPE: ContractInfo = ContractInfo::new("Empty", "tests", Visibility::Public, &[]);

    #[test]
    fn identity_by_address() {
        assert_eq!(&EMPTY, &EMPTY);
        assert_ne!(&EMPTY, &SAME_SHAPE);
        assert_eq!(EMPTY.to_string(), "tests::Empty");
    }

    #[test]
    fn accessor_declared_type() {
        let writer = AccessorInfo::new(
            "set_foo",
            None,
            Receiver::Mut,
            1,
            Some(<Option<String> as Member>::declared_type),
            Returns::Chain,
        );
        assert_eq!(writer.declared_type(), Some(DeclaredType::String));
        assert_eq!(writer.name(), "set_foo");
    }
}
