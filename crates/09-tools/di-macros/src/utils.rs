//! 宏工具函数

use proc_macro2::{TokenStream, TokenTree};
use quote::ToTokens;
use syn::{FnArg, ItemTrait, ReturnType, Signature, Type, TypeParamBound, WherePredicate};

/// 检查 trait 是否声明了指定名称的父 trait
pub fn has_supertrait(item: &ItemTrait, name: &str) -> bool {
    item.supertraits.iter().any(|bound| match bound {
        TypeParamBound::Trait(trait_bound) => trait_bound
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == name),
        _ => false,
    })
}

/// 查找除 `Send`、`Sync` 与生命周期之外的父 trait
pub fn unsupported_supertrait(item: &ItemTrait) -> Option<&TypeParamBound> {
    item.supertraits.iter().find(|bound| match bound {
        TypeParamBound::Trait(trait_bound) => !trait_bound
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Send" || segment.ident == "Sync"),
        TypeParamBound::Lifetime(_) => false,
        _ => true,
    })
}

/// 接收者是否为 `&self`
pub fn takes_shared_self(sig: &Signature) -> bool {
    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) => {
            receiver.reference.is_some() && receiver.mutability.is_none() && receiver.colon_token.is_none()
        }
        _ => false,
    }
}

/// 方法是否带有 `where Self: Sized` 约束
pub fn requires_sized_self(sig: &Signature) -> bool {
    let Some(where_clause) = &sig.generics.where_clause else {
        return false;
    };

    where_clause.predicates.iter().any(|predicate| match predicate {
        WherePredicate::Type(predicate) => {
            is_self_type(&predicate.bounded_ty)
                && predicate.bounds.iter().any(|bound| match bound {
                    TypeParamBound::Trait(trait_bound) => trait_bound.path.is_ident("Sized"),
                    _ => false,
                })
        }
        _ => false,
    })
}

fn is_self_type(ty: &Type) -> bool {
    matches!(ty, Type::Path(type_path) if type_path.qself.is_none() && type_path.path.is_ident("Self"))
}

/// 返回类型是否为 `*Result<..>`
pub fn returns_result(sig: &Signature) -> bool {
    match &sig.output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(type_path) => type_path
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident.to_string().ends_with("Result")),
            _ => false,
        },
        ReturnType::Default => false,
    }
}

/// 返回类型是否借用了接收者（包含引用或生命周期）
pub fn returns_borrow(sig: &Signature) -> bool {
    match &sig.output {
        ReturnType::Type(_, ty) => contains_borrow(ty.to_token_stream()),
        ReturnType::Default => false,
    }
}

fn contains_borrow(tokens: TokenStream) -> bool {
    tokens.into_iter().any(|token| match token {
        TokenTree::Punct(punct) => punct.as_char() == '&' || punct.as_char() == '\'',
        TokenTree::Group(group) => contains_borrow(group.stream()),
        _ => false,
    })
}
