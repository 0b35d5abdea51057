use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{AccessorDecl, ContractMeta, ReturnKind, Role};

fn accessor_body(meta: &ContractMeta, index: usize, accessor: &AccessorDecl, args: &[syn::Ident]) -> TokenStream {
    let typed_ = crate::path::typed_(meta.slate_record_path());
    let macro_exports_ = crate::path::macro_exports_(meta.slate_record_path());
    let ident = meta.ident();

    if !accessor.is_bindable() {
        // The binder rejects the contract, so no `Typed` view exists.
        let message = format!(
            "`{}::{}` is not a valid accessor",
            ident, accessor.method.sig.ident
        );
        return quote!(::core::unreachable!(#message));
    }

    match (accessor.role, accessor.returns, args) {
        (Role::Reader, _, _) => quote! {
            #macro_exports_::Result::Ok(#typed_::<dyn #ident>::read(self, #index)?)
        },
        (Role::Writer, ReturnKind::Chain, [arg]) => quote! {
            #typed_::<dyn #ident>::write(self, #index, #arg)?;
            #macro_exports_::Result::Ok(self)
        },
        (Role::Writer, _, [arg]) => quote! {
            #typed_::<dyn #ident>::write(self, #index, #arg)?;
            #macro_exports_::Result::Ok(())
        },
        _ => quote!(::core::unreachable!()),
    }
}

/// `impl Trait for Typed<dyn Trait>`.
pub(crate) fn impl_trait_typed(meta: &ContractMeta) -> TokenStream {
    let typed_ = crate::path::typed_(meta.slate_record_path());
    let ident = meta.ident();

    let methods = meta.accessors.iter().enumerate().map(|(index, accessor)| {
        let (sig, args) = accessor.impl_signature();
        let body = accessor_body(meta, index, accessor, &args);
        quote! {
            #[inline]
            #[allow(unused_variables)]
            #sig {
                #body
            }
        }
    });

    quote! {
        impl #ident for #typed_<dyn #ident> {
            #(#methods)*
        }
    }
}
