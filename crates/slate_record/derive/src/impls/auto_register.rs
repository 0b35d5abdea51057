use crate::derive_data::ContractMeta;

/// Submit the contract under its `type_name`.
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(meta: &ContractMeta) -> proc_macro2::TokenStream {
    use quote::quote_spanned;

    let Some(type_name) = &meta.attrs.type_name else {
        return crate::utils::empty();
    };

    let slate_record_path = meta.slate_record_path();
    let auto_register_ = crate::path::auto_register_(slate_record_path);
    let contract_ = crate::path::contract_(slate_record_path);
    let ident = meta.ident();

    quote_spanned! { type_name.span() =>
        #auto_register_::inventory::submit!{
            #auto_register_::RegisteredContract::new(
                #type_name,
                <dyn #ident as #contract_>::info
            )
        }
    }
}

/// `type_name` is ignored without `auto_register`.
#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &ContractMeta) -> proc_macro2::TokenStream {
    crate::utils::empty()
}
