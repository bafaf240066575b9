//! `#[derive(Component)]` 实现

use crate::utils::{dep_inner_type, find_attribute, is_trait_object, type_to_string};
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    parenthesized, punctuated::Punctuated, Attribute, Data, DeriveInput, Error, Expr, Field,
    Fields, Ident, Lit, LitStr, Meta, Result, Token, Type,
};

/// 构造函数的默认方法名
const DEFAULT_CONSTRUCTOR: &str = "constructor";

/// `#[component(...)]` 参数
#[derive(Default)]
struct ComponentArgs {
    /// 自定义组件名称
    name: Option<String>,
    /// 构造函数方法名
    constructor: Option<Ident>,
    /// 提供的能力
    provides: Vec<Type>,
}

impl ComponentArgs {
    fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut args = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("component")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    args.name = Some(value.value());
                } else if meta.path.is_ident("constructor") {
                    let method = if meta.input.peek(Token![=]) {
                        let value: LitStr = meta.value()?.parse()?;
                        value.parse::<Ident>()?
                    } else {
                        Ident::new(DEFAULT_CONSTRUCTOR, Span::call_site())
                    };
                    args.constructor = Some(method);
                } else if meta.path.is_ident("provides") {
                    let content;
                    parenthesized!(content in meta.input);
                    let types = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
                    for ty in types {
                        if !is_trait_object(&ty) {
                            return Err(Error::new_spanned(ty, "provides 只接受 `dyn Trait` 类型"));
                        }
                        args.provides.push(ty);
                    }
                } else {
                    return Err(meta.error("不支持的 component 参数, 可选: name, constructor, provides"));
                }
                Ok(())
            })?;
        }

        Ok(args)
    }
}

/// 解析字段上的 `#[dep]` 属性
///
/// 没有标记时返回 `None`；空字符串表示依赖名称由字段类型推导。
fn dep_name(field: &Field) -> Result<Option<String>> {
    let Some(attr) = find_attribute(&field.attrs, "dep") else {
        return Ok(None);
    };

    match &attr.meta {
        Meta::Path(_) => Ok(Some(String::new())),
        Meta::NameValue(name_value) => match &name_value.value {
            Expr::Lit(expr) => match &expr.lit {
                Lit::Str(value) => Ok(Some(value.value())),
                other => Err(Error::new_spanned(other, "dep 名称必须是字符串")),
            },
            other => Err(Error::new_spanned(other, "dep 名称必须是字符串")),
        },
        Meta::List(_) => {
            let mut name = String::new();
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    name = value.value();
                    Ok(())
                } else {
                    Err(meta.error("不支持的 dep 参数, 可选: name"))
                }
            })?;
            Ok(Some(name))
        }
    }
}

/// 实现 #[derive(Component)] 宏
pub fn derive_component_impl(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> Result<TokenStream2> {
    let struct_name = &input.ident;

    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(Error::new_spanned(
                    struct_name,
                    "Component 只能用于具名字段或无字段的结构体",
                ))
            }
        },
        _ => return Err(Error::new_spanned(struct_name, "Component 只能用于结构体")),
    };
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(&input.generics, "Component 不支持泛型参数"));
    }

    let args = ComponentArgs::from_attrs(&input.attrs)?;
    let mut statements = Vec::new();

    for field in fields {
        let Some(name) = dep_name(field)? else {
            continue;
        };
        let Some(ident) = &field.ident else {
            continue;
        };
        let field_name = ident.to_string();

        statements.push(match dep_inner_type(&field.ty) {
            Some(inner) if is_trait_object(inner) => quote! {
                definition.capability_dependency::<#inner>(#field_name, #name, |c| &mut c.#ident);
            },
            Some(inner) => quote! {
                definition.dependency::<#inner>(#field_name, #name, |c| &mut c.#ident);
            },
            None => {
                let declared = type_to_string(&field.ty);
                quote! {
                    definition.unsupported_field(#field_name, #declared);
                }
            }
        });
    }

    for capability in &args.provides {
        statements.push(quote! {
            definition.provides::<#capability>(|c| c as ::std::sync::Arc<#capability>);
        });
    }

    if let Some(method) = &args.constructor {
        statements.push(quote! {
            definition.constructor(Self::#method);
        });
    }

    if statements.is_empty() {
        statements.push(quote! {
            let _ = definition;
        });
    }

    let name_override = args.name.map(|name| {
        quote! {
            fn component_name() -> ::std::string::String {
                ::std::string::String::from(#name)
            }
        }
    });

    Ok(quote! {
        impl ::di_abstractions::Component for #struct_name {
            #name_override

            fn describe(definition: &mut ::di_abstractions::ComponentDefinition<Self>) {
                #(#statements)*
            }
        }

        impl ::di_abstractions::ConstructorReturn for #struct_name {
            fn into_values(self) -> ::di_abstractions::ConstructorValues {
                ::std::result::Result::Ok(::std::vec![
                    ::di_abstractions::Constructed::of(::std::sync::Arc::new(self))
                ])
            }
        }
    })
}
