//! `#[forwardable]` 宏实现

use crate::utils;
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{parse_macro_input, FnArg, Ident, ItemTrait, Pat, PatIdent, TraitItem, TraitItemFn};

/// 实现 #[forwardable] 宏
pub fn forwardable_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new(Span::call_site(), "#[forwardable] 不接受参数")
            .to_compile_error()
            .into();
    }

    let item = parse_macro_input!(input as ItemTrait);
    match expand(&item) {
        Ok(expanded) => expanded.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand(item: &ItemTrait) -> syn::Result<TokenStream2> {
    validate_trait(item)?;

    let trait_name = &item.ident;
    let mut methods = Vec::new();

    for trait_item in &item.items {
        match trait_item {
            TraitItem::Fn(method) => {
                if utils::requires_sized_self(&method.sig) {
                    if method.default.is_none() {
                        return Err(syn::Error::new_spanned(
                            &method.sig,
                            "带有 `where Self: Sized` 的方法必须提供默认实现",
                        ));
                    }
                    continue;
                }
                methods.push(forward_method(trait_name, method)?);
            }
            TraitItem::Type(associated) => {
                return Err(syn::Error::new_spanned(
                    associated,
                    "#[forwardable] 不支持关联类型",
                ));
            }
            TraitItem::Const(associated) => {
                return Err(syn::Error::new_spanned(
                    associated,
                    "#[forwardable] 不支持关联常量",
                ));
            }
            other => {
                return Err(syn::Error::new_spanned(other, "#[forwardable] 不支持该 trait 项"));
            }
        }
    }

    Ok(quote! {
        #item

        impl #trait_name for ::di_abstractions::ForwardRef<dyn #trait_name> {
            #(#methods)*
        }

        impl ::di_abstractions::Deferrable for dyn #trait_name {
            fn defer(reference: ::di_abstractions::ForwardRef<Self>) -> ::std::sync::Arc<Self> {
                ::std::sync::Arc::new(reference)
            }
        }
    })
}

fn validate_trait(item: &ItemTrait) -> syn::Result<()> {
    if item.unsafety.is_some() || item.auto_token.is_some() {
        return Err(syn::Error::new_spanned(&item.ident, "#[forwardable] 只支持普通 trait"));
    }

    if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[forwardable] 不支持泛型 trait",
        ));
    }

    if !utils::has_supertrait(item, "Send") || !utils::has_supertrait(item, "Sync") {
        return Err(syn::Error::new_spanned(
            &item.ident,
            "#[forwardable] trait 必须以 `Send + Sync` 为父 trait",
        ));
    }

    if let Some(bound) = utils::unsupported_supertrait(item) {
        return Err(syn::Error::new_spanned(
            bound,
            "#[forwardable] trait 的父 trait 只能是 `Send` 与 `Sync`",
        ));
    }

    Ok(())
}

fn forward_method(trait_name: &Ident, method: &TraitItemFn) -> syn::Result<TokenStream2> {
    let sig = &method.sig;

    if sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(sig, "#[forwardable] 不支持 async 方法"));
    }
    if sig.generics.type_params().next().is_some() || sig.generics.const_params().next().is_some() {
        return Err(syn::Error::new_spanned(&sig.generics, "#[forwardable] 不支持泛型方法"));
    }
    if !utils::takes_shared_self(sig) {
        return Err(syn::Error::new_spanned(sig, "前向引用只能转发 `&self` 方法"));
    }
    if !utils::returns_result(sig) {
        return Err(syn::Error::new_spanned(
            &sig.output,
            "转发方法必须返回 Result，且错误类型实现 From<DependencyError>",
        ));
    }
    if utils::returns_borrow(sig) {
        return Err(syn::Error::new_spanned(
            &sig.output,
            "转发方法的返回值不能借用接收者",
        ));
    }

    let mut forwarded_sig = sig.clone();
    let mut arguments = Vec::new();

    for (index, input) in forwarded_sig.inputs.iter_mut().skip(1).enumerate() {
        if let FnArg::Typed(typed) = input {
            let argument = format_ident!("__arg{}", index);
            typed.pat = Box::new(Pat::Ident(PatIdent {
                attrs: Vec::new(),
                by_ref: None,
                mutability: None,
                ident: argument.clone(),
                subpat: None,
            }));
            arguments.push(argument);
        }
    }

    let method_name = &sig.ident;
    Ok(quote! {
        #forwarded_sig {
            let __target = ::di_abstractions::ForwardRef::target(self)?;
            <dyn #trait_name as #trait_name>::#method_name(&*__target, #(#arguments),*)
        }
    })
}
