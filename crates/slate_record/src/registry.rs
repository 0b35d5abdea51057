//! Bijective mapping between contracts and wire type names.

use core::fmt;

use crate::contract::{Contract, ContractRef};
use crate::error::RegistryError;
use crate::hash::HashMap;

// -----------------------------------------------------------------------------
// TypeRegistry

/// A bijective mapping between contracts and stable, wire-safe type names.
///
/// The serializer writes the name as a leading `__type` field, and the
/// deserializer resolves that hint back to a contract.
///
/// A registry is assembled with [`TypeRegistryBuilder`] and is read-only once
/// built. Each name maps to exactly one contract and each contract to exactly
/// one name.
///
/// # Example
///
/// ```
/// use slate_record::{Contract, RecordError, RegistryError, TypeRegistry, contract};
///
/// #[contract]
/// pub trait Test {
///     fn get_number(&self) -> Result<Option<i32>, RecordError>;
///     fn set_number(&mut self, n: Option<i32>) -> Result<(), RecordError>;
/// }
///
/// let registry = TypeRegistry::builder()
///     .register::<dyn Test>("test@1.0")
///     .unwrap()
///     .build();
///
/// assert_eq!(registry.get_name(<dyn Test>::info()), Some("test@1.0"));
/// assert_eq!(registry.get_type("test@1.0"), Some(<dyn Test>::info()));
///
/// let err = TypeRegistry::builder()
///     .register::<dyn Test>("test@1.0")
///     .unwrap()
///     .register::<dyn Test>("test@2.0");
/// assert!(matches!(err, Err(RegistryError::DuplicateContract { .. })));
/// ```
#[derive(Default)]
pub struct TypeRegistry {
    names: HashMap<ContractRef, Box<str>>,
    types: HashMap<Box<str>, ContractRef>,
}

impl TypeRegistry {
    #[inline]
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// An empty registry.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The wire name of `contract`.
    #[inline]
    pub fn get_name(&self, contract: ContractRef) -> Option<&str> {
        self.names.get(contract).map(|name| &**name)
    }

    /// The contract registered under `name`.
    #[inline]
    pub fn get_type(&self, name: &str) -> Option<ContractRef> {
        self.types.get(name).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over `(name, contract)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ContractRef)> {
        self.types.iter().map(|(name, contract)| (&**name, *contract))
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(name, contract)| (name, contract.to_string())))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// TypeRegistryBuilder

/// Builder of a [`TypeRegistry`].
///
/// Rejects a second registration of either the name or the contract.
#[derive(Default)]
pub struct TypeRegistryBuilder {
    registry: TypeRegistry,
}

impl TypeRegistryBuilder {
    /// Register `contract` under `name`.
    pub fn with(mut self, name: impl Into<Box<str>>, contract: ContractRef) -> Result<Self, RegistryError> {
        let name = name.into();

        if let Some(existing) = self.registry.types.get(&name) {
            return Err(RegistryError::DuplicateName {
                name,
                contract: *existing,
            });
        }
        if let Some(existing) = self.registry.names.get(contract) {
            return Err(RegistryError::DuplicateContract {
                contract,
                name: existing.clone(),
            });
        }

        self.registry.names.insert(contract, name.clone());
        self.registry.types.insert(name, contract);
        Ok(self)
    }

    /// Register the contract `C` under `name`.
    #[inline]
    pub fn register<C: ?Sized + Contract>(self, name: impl Into<Box<str>>) -> Result<Self, RegistryError> {
        self.with(name, C::info())
    }

    /// Register every contract declared with `#[contract(type_name = "...")]`
    /// in the linked crates.
    ///
    /// Does nothing unless the `auto_register` feature is enabled.
    pub fn with_registered(self) -> Result<Self, RegistryError> {
        #[cfg(feature = "auto_register")]
        {
            use crate::__macro_exports::auto_register::{RegisteredContract, inventory};

            let mut this = self;
            for entry in inventory::iter::<RegisteredContract> {
                this = this.with(entry.name(), entry.info())?;
            }
            Ok(this)
        }
        #[cfg(not(feature = "auto_register"))]
        {
            Ok(self)
        }
    }

    #[inline]
    pub fn build(self) -> TypeRegistry {
        self.registry
    }
}

// -----------------------------------------------------------------------------
// Tests
