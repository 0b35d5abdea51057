//! Parse a contract trait into the data needed for code generation.

use proc_macro2::Span;
use quote::ToTokens;
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{FnArg, Ident, ItemTrait, LitStr, Pat, PatIdent, ReturnType, TraitItem, TraitItemFn, Type};
use syn::{GenericArgument, PathArguments, Visibility, WherePredicate, parse_quote};

use crate::MEMBER_ATTRIBUTE_NAME;
use crate::utils::mentions_self;

// -----------------------------------------------------------------------------
// Attributes

/// Arguments of `#[contract(...)]`.
#[derive(Default)]
pub(crate) struct ContractAttributes {
    /// `type_name = "..."`, used by `auto_register`.
    pub type_name: Option<LitStr>,
}

impl ContractAttributes {
    pub fn parse(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("type_name") {
            if self.type_name.is_some() {
                return Err(meta.error("duplicate `type_name`"));
            }
            self.type_name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported contract attribute, expected `type_name`"))
        }
    }
}

/// Take `#[member(name = "...")]` out of `attrs`.
fn take_member_name(attrs: &mut Vec<syn::Attribute>) -> syn::Result<Option<LitStr>> {
    let mut name = None;
    let mut error = None;

    attrs.retain(|attr| {
        if !attr.path().is_ident(MEMBER_ATTRIBUTE_NAME) {
            return true;
        }
        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported member attribute, expected `name`"))
            }
        });
        if let Err(err) = result {
            error.get_or_insert(err);
        }
        false
    });

    match error {
        Some(err) => Err(err),
        None => Ok(name),
    }
}

// -----------------------------------------------------------------------------
// Accessors

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReceiverKind {
    Ref,
    Mut,
    Owned,
    None,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReturnKind {
    Nothing,
    Unit,
    Chain,
    Value,
}

/// Accessor role derived from the method name.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Reader,
    Writer,
    Unknown,
}

/// One accessor method of the contract.
pub(crate) struct AccessorDecl {
    /// The method as it appears in the generated trait.
    pub method: TraitItemFn,
    pub member: Option<LitStr>,
    pub role: Role,
    pub receiver: ReceiverKind,
    pub returns: ReturnKind,
    /// Non-receiver argument types.
    pub params: Vec<Type>,
}

fn receiver_kind(method: &TraitItemFn) -> ReceiverKind {
    match method.sig.receiver() {
        None => ReceiverKind::None,
        Some(receiver) => match &*receiver.ty {
            Type::Reference(reference) if reference.mutability.is_some() => ReceiverKind::Mut,
            Type::Reference(_) => ReceiverKind::Ref,
            _ => ReceiverKind::Owned,
        },
    }
}

/// `Result<T, E>`: the `T`.
fn result_ok_type(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    }
}

fn is_mut_self(ty: &Type) -> bool {
    match ty {
        Type::Reference(reference) if reference.mutability.is_some() => {
            matches!(&*reference.elem, Type::Path(p) if p.qself.is_none() && p.path.is_ident("Self"))
        }
        _ => false,
    }
}

fn return_kind(output: &ReturnType) -> syn::Result<ReturnKind> {
    let ty = match output {
        ReturnType::Default => return Ok(ReturnKind::Nothing),
        ReturnType::Type(_, ty) => ty,
    };
    if let Type::Tuple(tuple) = &**ty
        && tuple.elems.is_empty()
    {
        return Ok(ReturnKind::Nothing);
    }

    let Some(ok) = result_ok_type(ty) else {
        return Err(syn::Error::new(
            ty.span(),
            "contract accessors must return `Result<_, _>` or nothing",
        ));
    };

    Ok(match ok {
        Type::Tuple(tuple) if tuple.elems.is_empty() => ReturnKind::Unit,
        ty if is_mut_self(ty) => ReturnKind::Chain,
        _ => ReturnKind::Value,
    })
}

fn role(name: &Ident) -> Role {
    let name = name.to_string();
    if name.starts_with("get_") || name.starts_with("is_") {
        Role::Reader
    } else if name.starts_with("set_") || name.starts_with("with_") {
        Role::Writer
    } else {
        Role::Unknown
    }
}

impl AccessorDecl {
    fn new(mut method: TraitItemFn) -> syn::Result<Self> {
        let sig = &method.sig;
        if !sig.generics.params.is_empty() {
            return Err(syn::Error::new(
                sig.generics.span(),
                "contract accessors cannot be generic",
            ));
        }
        if let Some(asyncness) = sig.asyncness {
            return Err(syn::Error::new(asyncness.span(), "contract accessors cannot be async"));
        }

        let member = take_member_name(&mut method.attrs)?;
        let receiver = receiver_kind(&method);
        let returns = return_kind(&method.sig.output)?;

        let params: Vec<Type> = method
            .sig
            .inputs
            .iter()
            .filter_map(|arg| match arg {
                FnArg::Typed(pat) => Some((*pat.ty).clone()),
                FnArg::Receiver(_) => None,
            })
            .collect();

        // Keep `dyn Trait` valid.
        let needs_sized = receiver == ReceiverKind::None
            || params.iter().any(|ty| mentions_self(ty.to_token_stream()))
            || mentions_self(method.sig.output.to_token_stream());
        if needs_sized {
            let predicate: WherePredicate = parse_quote!(Self: ::core::marker::Sized);
            method
                .sig
                .generics
                .make_where_clause()
                .predicates
                .push(predicate);
        }

        Ok(Self {
            role: role(&method.sig.ident),
            method,
            member,
            receiver,
            returns,
            params,
        })
    }

    /// Returns `true` if the binder accepts this accessor, so its body can be generated.
    pub fn is_bindable(&self) -> bool {
        match self.role {
            Role::Reader => {
                matches!(self.receiver, ReceiverKind::Ref | ReceiverKind::Mut)
                    && self.params.is_empty()
                    && self.returns == ReturnKind::Value
            }
            Role::Writer => {
                self.receiver == ReceiverKind::Mut
                    && self.params.len() == 1
                    && matches!(self.returns, ReturnKind::Unit | ReturnKind::Chain)
            }
            Role::Unknown => false,
        }
    }

    /// The argument whose type declares the member, for writers.
    pub fn declared_param(&self) -> Option<&Type> {
        match (self.role, self.params.as_slice()) {
            (Role::Writer, [ty]) => Some(ty),
            _ => None,
        }
    }

    /// The signature with every argument bound to a plain identifier.
    pub fn impl_signature(&self) -> (syn::Signature, Vec<Ident>) {
        let mut sig = self.method.sig.clone();
        let mut names = Vec::new();
        for (index, arg) in sig.inputs.iter_mut().enumerate() {
            if let FnArg::Typed(pat) = arg {
                let ident = Ident::new(&format!("__arg{index}"), Span::call_site());
                *pat.pat = Pat::Ident(PatIdent {
                    attrs: Vec::new(),
                    by_ref: None,
                    mutability: None,
                    ident: ident.clone(),
                    subpat: None,
                });
                names.push(ident);
            }
        }
        (sig, names)
    }
}

// -----------------------------------------------------------------------------
// Contract

pub(crate) struct ContractMeta {
    #[cfg_attr(not(feature = "auto_register"), allow(dead_code))]
    pub attrs: ContractAttributes,
    /// The trait with contract-only attributes removed.
    pub item: ItemTrait,
    pub accessors: Vec<AccessorDecl>,
    slate_record_path: syn::Path,
}

impl ContractMeta {
    pub fn new(attrs: ContractAttributes, mut item: ItemTrait) -> syn::Result<Self> {
        if !item.generics.params.is_empty() {
            return Err(syn::Error::new(item.generics.span(), "contracts cannot be generic"));
        }
        if let Some(unsafety) = item.unsafety {
            return Err(syn::Error::new(unsafety.span(), "contracts cannot be unsafe"));
        }

        let mut accessors = Vec::new();
        let mut items = Vec::with_capacity(item.items.len());

        for trait_item in core::mem::take(&mut item.items) {
            match trait_item {
                TraitItem::Fn(method) if method.default.is_none() => {
                    let accessor = AccessorDecl::new(method)?;
                    items.push(TraitItem::Fn(accessor.method.clone()));
                    accessors.push(accessor);
                }
                TraitItem::Fn(method) => items.push(TraitItem::Fn(method)),
                TraitItem::Macro(_) | TraitItem::Verbatim(_) => items.push(trait_item),
                other => {
                    return Err(syn::Error::new(
                        other.span(),
                        "contracts may only declare accessor methods",
                    ));
                }
            }
        }
        item.items = items;

        Ok(Self {
            attrs,
            item,
            accessors,
            slate_record_path: crate::path::slate_record(),
        })
    }

    #[inline]
    pub fn slate_record_path(&self) -> &syn::Path {
        &self.slate_record_path
    }

    #[inline]
    pub fn ident(&self) -> &Ident {
        &self.item.ident
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        matches!(self.item.vis, Visibility::Public(_))
    }
}
