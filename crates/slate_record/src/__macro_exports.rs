//! Items used by code generated with `#[contract]`. Not public API.

pub use core::option::Option;
pub use core::result::Result;

#[cfg(feature = "auto_register")]
pub mod auto_register {
    use crate::contract::ContractRef;

    pub use inventory;

    /// A `(type name, contract)` pair submitted by `#[contract(type_name = "...")]`.
    pub struct RegisteredContract {
        name: &'static str,
        info: fn() -> ContractRef,
    }

    impl RegisteredContract {
        #[inline]
        pub const fn new(name: &'static str, info: fn() -> ContractRef) -> Self {
            Self { name, info }
        }

        #[inline]
        pub fn name(&self) -> &'static str {
            self.name
        }

        #[inline]
        pub fn info(&self) -> ContractRef {
            (self.info)()
        }
    }

    inventory::collect!(RegisteredContract);
}
