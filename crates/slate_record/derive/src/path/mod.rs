//! Paths of the `slate_record` items used by generated code.
//!
//! Kept in one place so the generated code follows when the runtime crate
//! moves things around.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// Get the access path to the `slate_record` crate from the invoking crate.
///
/// 1. For crates that depend on `slate_record` (or rename it), its name is returned.
/// 2. For crates that depend on `slate`, `::slate::record` is returned.
/// 3. Otherwise `::slate_record` is returned, which may be incorrect.
///
/// Reading the manifest is not cheap, so the path is resolved once per
/// expansion and passed around.
pub(crate) fn slate_record() -> syn::Path {
    slate_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("slate_record"))
}

// -----------------------------------------------------------------------------
// Items

#[inline(always)]
pub(crate) fn macro_exports_(slate_record_path: &syn::Path) -> TokenStream {
    quote! {
        #slate_record_path::__macro_exports
    }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(slate_record_path: &syn::Path) -> TokenStream {
    quote! {
        #slate_record_path::__macro_exports::auto_register
    }
}

#[inline(always)]
pub(crate) fn contract_(slate_record_path: &syn::Path) -> TokenStream {
    quote! {
        #slate_record_path::Contract
    }
}

#[inline(always)]
pub(crate) fn contract_info_(slate_record_path: &syn::Path) -> TokenStream {
    quote! {
        #slate_record_path::ContractInfo
    }
}

#[inline(always)]
pub(crate) fn accessor_info_(slate_record_path: &syn::Path) -> TokenStream {
    quote! {
        #slate_record_path::AccessorInfo
    }
}

#[inline(always)]
pub(crate) fn receiver_(slate_record_path: &syn::Path) -> TokenStream {
    quote! {
        #slate_record_path::Receiver
    }
}

#[inline(always)]
pub(crate) fn returns_(slate_record_path: &syn::Path) -> TokenStream {
    quote! {
        #slate_record_path::Returns
    }
}

#[inline(always)]
pub(crate) fn visibility_(slate_record_path: &syn::Path) -> TokenStream {
    quote! {
        #slate_record_path::Visibility
    }
}

#[inline(always)]
pub(crate) fn member_(slate_record_path: &syn::Path) -> TokenStream {
    quote! {
        #slate_record_path::Member
    }
}

#[inline(always)]
pub(crate) fn declared_type_(slate_record_path: &syn::Path) -> TokenStream {
    quote! {
        #slate_record_path::DeclaredType
    }
}

#[inline(always)]
pub(crate) fn typed_(slate_record_path: &syn::Path) -> TokenStream {
    quote! {
        #slate_record_path::Typed
    }
}
