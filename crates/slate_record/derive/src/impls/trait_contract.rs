use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

use crate::derive_data::{AccessorDecl, ContractMeta, ReceiverKind, ReturnKind};
use crate::utils::{mentions_self, replace_self};

/// One `AccessorInfo::new(..)` of the descriptor table.
fn accessor_info(meta: &ContractMeta, accessor: &AccessorDecl) -> TokenStream {
    let slate_record_path = meta.slate_record_path();
    let accessor_info_ = crate::path::accessor_info_(slate_record_path);
    let receiver_ = crate::path::receiver_(slate_record_path);
    let returns_ = crate::path::returns_(slate_record_path);
    let member_ = crate::path::member_(slate_record_path);
    let declared_type_ = crate::path::declared_type_(slate_record_path);
    let typed_ = crate::path::typed_(slate_record_path);
    let macro_exports_ = crate::path::macro_exports_(slate_record_path);

    let name = accessor.method.sig.ident.to_string();
    let member = match &accessor.member {
        Some(lit) => quote!(#macro_exports_::Option::Some(#lit)),
        None => quote!(#macro_exports_::Option::None),
    };
    let receiver = match accessor.receiver {
        ReceiverKind::Ref => quote!(#receiver_::Ref),
        ReceiverKind::Mut => quote!(#receiver_::Mut),
        ReceiverKind::Owned => quote!(#receiver_::Owned),
        ReceiverKind::None => quote!(#receiver_::None),
    };
    let returns = match accessor.returns {
        ReturnKind::Nothing => quote!(#returns_::Nothing),
        ReturnKind::Unit => quote!(#returns_::Unit),
        ReturnKind::Chain => quote!(#returns_::Chain),
        ReturnKind::Value => quote!(#returns_::Value),
    };
    let arity = accessor.params.len();

    let declared = match accessor.declared_param() {
        Some(ty) => {
            // `Self` is not nameable from the descriptor.
            let ty = ty.to_token_stream();
            let ty = if mentions_self(ty.clone()) {
                let ident = meta.ident();
                replace_self(ty, &quote!(#typed_<dyn #ident>))
            } else {
                ty
            };
            quote! {
                #macro_exports_::Option::Some(
                    <#ty as #member_>::declared_type as fn() -> #declared_type_
                )
            }
        }
        None => quote!(#macro_exports_::Option::None),
    };

    quote! {
        #accessor_info_::new(#name, #member, #receiver, #arity, #declared, #returns)
    }
}

/// `impl Contract for dyn Trait`.
pub(crate) fn impl_trait_contract(meta: &ContractMeta) -> TokenStream {
    let slate_record_path = meta.slate_record_path();
    let contract_ = crate::path::contract_(slate_record_path);
    let contract_info_ = crate::path::contract_info_(slate_record_path);
    let accessor_info_ = crate::path::accessor_info_(slate_record_path);
    let visibility_ = crate::path::visibility_(slate_record_path);

    let ident = meta.ident();
    let ident_str = ident.to_string();
    let visibility = if meta.is_public() {
        quote!(#visibility_::Public)
    } else {
        quote!(#visibility_::Restricted)
    };
    let accessors = meta.accessors.iter().map(|accessor| accessor_info(meta, accessor));

    quote! {
        impl #contract_ for dyn #ident {
            fn info() -> &'static #contract_info_ {
                const __ACCESSORS: &[#accessor_info_] = &[#(#accessors),*];
                static __INFO: #contract_info_ = #contract_info_::new(
                    #ident_str,
                    ::core::module_path!(),
                    #visibility,
                    __ACCESSORS,
                );
                &__INFO
            }
        }
    }
}
