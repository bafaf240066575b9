//! 宏工具函数

use quote::ToTokens;
use syn::{Attribute, GenericArgument, PathArguments, Type};

/// 依赖槽位类型名
const DEP_TYPE: &str = "Dep";

/// 查找指定名称的属性
pub fn find_attribute<'a>(attrs: &'a [Attribute], attr_name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| attr.path().is_ident(attr_name))
}

/// 从类型中提取第一个泛型参数
pub fn extract_generic_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(GenericArgument::Type(inner_type)) => Some(inner_type),
            _ => None,
        },
        _ => None,
    }
}

/// 如果类型是 `Dep<T>`，返回 `T`
pub fn dep_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != DEP_TYPE {
        return None;
    }
    extract_generic_type(ty)
}

/// 检查类型是否为 trait object（`dyn Trait`）
pub fn is_trait_object(ty: &Type) -> bool {
    match ty {
        Type::TraitObject(_) => true,
        Type::Paren(inner) => is_trait_object(&inner.elem),
        Type::Group(inner) => is_trait_object(&inner.elem),
        _ => false,
    }
}

/// 类型的源码文本，用于错误信息
pub fn type_to_string(ty: &Type) -> String {
    ty.to_token_stream()
        .to_string()
        .replace(" :: ", "::")
        .replace(" < ", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
}
