// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod trait_contract;
mod trait_typed;

// -----------------------------------------------------------------------------
// Internal API

use auto_register::get_auto_register_impl;
use trait_contract::impl_trait_contract;
use trait_typed::impl_trait_typed;

use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::ContractMeta;

/// The contract trait followed by everything generated for it.
pub(crate) fn impl_contract(meta: &ContractMeta) -> TokenStream {
    let item = &meta.item;
    let contract_impl = impl_trait_contract(meta);
    let typed_impl = impl_trait_typed(meta);
    let auto_register = get_auto_register_impl(meta);

    quote! {
        #item

        #contract_impl

        #typed_impl

        #auto_register
    }
}
