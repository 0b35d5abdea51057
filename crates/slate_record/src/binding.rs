use alloc::sync::Arc;
use core::fmt;

use crate::contract::{AccessorInfo, ContractRef, Receiver, Returns, Visibility};
use crate::error::BindError;
use crate::hash::HashMap;
use crate::member::DeclaredType;

// -----------------------------------------------------------------------------
// Members

/// The immutable member table of a contract: member name to declared type.
///
/// Cheap to clone.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Members(Arc<HashMap<Box<str>, DeclaredType>>);

impl Members {
    #[inline]
    pub fn get(&self, name: &str) -> Option<&DeclaredType> {
        self.0.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeclaredType)> {
        self.0.iter().map(|(k, v)| (&**k, v))
    }
}

impl fmt::Debug for Members {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// Binding

/// What an accessor does, by index in [`ContractInfo::accessors`](crate::ContractInfo::accessors).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// Read the named field.
    Read(Box<str>),
    /// Write the named field.
    Write(Box<str>),
}

impl Accessor {
    #[inline]
    pub fn field(&self) -> &str {
        match self {
            Accessor::Read(field) | Accessor::Write(field) => field,
        }
    }
}

/// A validated contract with its member table and accessor dispatch table.
///
/// Built once per contract by the [`Binder`](crate::Binder) and shared by every
/// record bound to the contract.
#[derive(Debug)]
pub struct Binding {
    contract: ContractRef,
    members: Members,
    accessors: Box<[Accessor]>,
}

const READ_PREFIXES: [&str; 2] = ["get_", "is_"];
const WRITE_PREFIXES: [&str; 2] = ["set_", "with_"];

/// `get_foo_bar` -> `FooBar`.
pub(crate) fn member_name(suffix: &str) -> String {
    let mut name = String::with_capacity(suffix.len());
    for part in suffix.split('_').filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name
}

fn strip_any<'a>(name: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|p| name.strip_prefix(p))
}

impl Binding {
    /// Validate `contract` and build its dispatch tables.
    pub fn build(contract: ContractRef) -> Result<Self, BindError> {
        if contract.visibility() != Visibility::Public {
            return Err(BindError::NotPublic(contract));
        }

        let mut members: HashMap<Box<str>, DeclaredType> = HashMap::default();
        let mut accessors = Vec::with_capacity(contract.accessors().len());

        for info in contract.accessors() {
            let accessor = if let Some(suffix) = strip_any(info.name(), &READ_PREFIXES) {
                Self::check_reader(contract, info)?;
                Accessor::Read(Self::field_name(contract, info, suffix)?)
            } else if let Some(suffix) = strip_any(info.name(), &WRITE_PREFIXES) {
                let declared = Self::check_writer(contract, info)?;
                let field = Self::field_name(contract, info, suffix)?;

                if let Some(first) = members.get(&field) {
                    if *first != declared {
                        return Err(BindError::AmbiguousMember {
                            contract,
                            member: field,
                            first: first.clone(),
                            second: declared,
                        });
                    }
                } else {
                    members.insert(field.clone(), declared);
                }
                Accessor::Write(field)
            } else {
                return Err(BindError::UnknownAccessor {
                    contract,
                    accessor: info.name(),
                });
            };
            accessors.push(accessor);
        }

        log::debug!(
            "bound contract `{contract}`: {} accessors, {} members",
            accessors.len(),
            members.len()
        );

        Ok(Self {
            contract,
            members: Members(Arc::new(members)),
            accessors: accessors.into_boxed_slice(),
        })
    }

    fn field_name(contract: ContractRef, info: &AccessorInfo, suffix: &str) -> Result<Box<str>, BindError> {
        let name = match info.member_override() {
            Some(name) => name.to_owned(),
            None => member_name(suffix),
        };
        if name.is_empty() {
            return Err(BindError::UnknownAccessor {
                contract,
                accessor: info.name(),
            });
        }
        Ok(name.into_boxed_str())
    }

    fn check_reader(contract: ContractRef, info: &AccessorInfo) -> Result<(), BindError> {
        let accessor = info.name();
        if !matches!(info.receiver(), Receiver::Ref | Receiver::Mut) {
            return Err(BindError::InvalidReceiver { contract, accessor });
        }
        if info.arity() != 0 {
            return Err(BindError::ParameterCount {
                contract,
                accessor,
                expected: 0,
                found: info.arity(),
            });
        }
        match info.returns() {
            Returns::Value => Ok(()),
            // `Result<&mut Self, _>` has nothing to read either.
            Returns::Nothing | Returns::Unit | Returns::Chain => {
                Err(BindError::VoidReader { contract, accessor })
            }
        }
    }

    fn check_writer(contract: ContractRef, info: &AccessorInfo) -> Result<DeclaredType, BindError> {
        let accessor = info.name();
        if info.receiver() != Receiver::Mut {
            return Err(BindError::InvalidReceiver { contract, accessor });
        }
        if info.arity() != 1 {
            return Err(BindError::ParameterCount {
                contract,
                accessor,
                expected: 1,
                found: info.arity(),
            });
        }
        if !matches!(info.returns(), Returns::Unit | Returns::Chain) {
            return Err(BindError::InvalidWriterReturn { contract, accessor });
        }
        info.declared_type()
            .ok_or(BindError::ParameterCount {
                contract,
                accessor,
                expected: 1,
                found: 0,
            })
    }

    #[inline]
    pub fn contract(&self) -> ContractRef {
        self.contract
    }

    #[inline]
    pub fn members(&self) -> &Members {
        &self.members
    }

    /// The dispatch entry of the accessor at `index`.
    #[inline]
    pub fn accessor(&self, index: usize) -> Option<&Accessor> {
        self.accessors.get(index)
    }

    #[inline]
    pub fn accessors(&self) -> &[Accessor] {
        &self.accessors
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Accessor, Binding, member_name};
    use crate::contract::{AccessorInfo, ContractInfo, Receiver, Returns, Visibility};
    use crate::error::BindError;
    use crate::member::{DeclaredType, Member};

    const fn reader(name: &'static str) -> AccessorInfo {
        AccessorInfo::new(name, None, Receiver::Ref, 0, None, Returns::Value)
    }

    const fn writer(name: &'static str, declared: fn() -> DeclaredType, returns: Returns) -> AccessorInfo {
        AccessorInfo::new(name, None, Receiver::Mut, 1, Some(declared), returns)
    }

    const GOOD_ACCESSORS: &[AccessorInfo] = &[
        reader("get_foo_bar"),
        writer("set_foo_bar", <Option<String> as Member>::declared_type, Returns::Chain),
        writer("with_foo_bar", <String as Member>::declared_type, Returns::Unit),
        reader("is_done"),
    ];
    static GOOD: ContractInfo =
        ContractInfo::new("Good", "tests", Visibility::Public, GOOD_ACCESSORS);

    static HIDDEN: ContractInfo = ContractInfo::new("Hidden", "tests", Visibility::Restricted, &[]);

    const VOID_READER_ACCESSORS: &[AccessorInfo] = &[
        AccessorInfo::new("get_foo", None, Receiver::Ref, 0, None, Returns::Nothing),
    ];
    static VOID_READER: ContractInfo =
        ContractInfo::new("VoidReader", "tests", Visibility::Public, VOID_READER_ACCESSORS);

    const TWO_ARGS_ACCESSORS: &[AccessorInfo] = &[
        AccessorInfo::new("set_foo", None, Receiver::Mut, 2, None, Returns::Unit),
    ];
    static TWO_ARGS: ContractInfo =
        ContractInfo::new("TwoArgs", "tests", Visibility::Public, TWO_ARGS_ACCESSORS);

    const BAD_RETURN_ACCESSORS: &[AccessorInfo] = &[
        writer("set_foo", <i32 as Member>::declared_type, Returns::Value),
    ];
    static BAD_RETURN: ContractInfo =
        ContractInfo::new("BadReturn", "tests", Visibility::Public, BAD_RETURN_ACCESSORS);

    const AMBIGUOUS_ACCESSORS: &[AccessorInfo] = &[
        writer("set_foo", <i32 as Member>::declared_type, Returns::Unit),
        writer("with_foo", <String as Member>::declared_type, Returns::Chain),
    ];
    static AMBIGUOUS: ContractInfo =
        ContractInfo::new("Ambiguous", "tests", Visibility::Public, AMBIGUOUS_ACCESSORS);

    const UNKNOWN_ACCESSORS: &[AccessorInfo] = &[
        reader("foo"), reader("get_"),
    ];
    static UNKNOWN: ContractInfo =
        ContractInfo::new("Unknown", "tests", Visibility::Public, UNKNOWN_ACCESSORS);

    #[test]
    fn member_names() {
        assert_eq!(member_name("foo"), "Foo");
        assert_eq!(member_name("foo_bar"), "FooBar");
        assert_eq!(member_name("slug_list"), "SlugList");
        assert_eq!(member_name(""), "");
    }

    #[test]
    fn build_good() {
        let binding = Binding::build(&GOOD).unwrap();
        assert_eq!(binding.accessor(0), Some(&Accessor::Read("FooBar".into())));
        assert_eq!(binding.accessor(1), Some(&Accessor::Write("FooBar".into())));
        assert_eq!(binding.accessor(3), Some(&Accessor::Read("Done".into())));
        assert_eq!(binding.accessor(4), None);

        assert_eq!(binding.members().len(), 1);
        assert_eq!(binding.members().get("FooBar"), Some(&DeclaredType::String));
        // Readers do not declare members.
        assert!(!binding.members().contains("Done"));
    }

    #[test]
    fn malformed_contracts() {
        assert!(matches!(Binding::build(&HIDDEN), Err(BindError::NotPublic(_))));
        assert!(matches!(
            Binding::build(&VOID_READER),
            Err(BindError::VoidReader { accessor: "get_foo", .. })
        ));
        assert!(matches!(
            Binding::build(&TWO_ARGS),
            Err(BindError::ParameterCount { expected: 1, found: 2, .. })
        ));
        assert!(matches!(
            Binding::build(&BAD_RETURN),
            Err(BindError::InvalidWriterReturn { .. })
        ));
        assert!(matches!(
            Binding::build(&AMBIGUOUS),
            Err(BindError::AmbiguousMember { .. })
        ));
        assert!(matches!(
            Binding::build(&UNKNOWN),
            Err(BindError::UnknownAccessor { accessor: "foo", .. })
        ));
    }
}
