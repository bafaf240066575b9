//! # Component Macros
//!
//! 这个 crate 提供 `#[derive(Component)]`，根据字段上的 `#[dep]` 标记
//! 生成组件的类型描述（依赖字段、提供的能力、构造函数）。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::Component;
//! use di_abstractions::Dep;
//!
//! pub trait Counter: Send + Sync {
//!     fn counter(&self) -> i32;
//! }
//!
//! #[derive(Debug, Default, Component)]
//! #[component(constructor, provides(dyn Counter))]
//! pub struct Low {
//!     value: i32,
//! }
//!
//! impl Low {
//!     fn constructor(&self) -> Self {
//!         Self { value: 12 }
//!     }
//! }
//!
//! #[derive(Debug, Default, Component)]
//! pub struct Top {
//!     #[dep]
//!     low: Dep<dyn Counter>,
//!     #[dep = "surplus"]
//!     provided: Dep<Provided>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod component;
mod utils;

/// 组件派生宏
///
/// 为具名字段结构体或单元结构体实现 `di_abstractions::Component` 和
/// `di_abstractions::ConstructorReturn`。
///
/// # 结构体参数 `#[component(...)]`
///
/// - `name = "..."` - 自定义组件名称（默认为类型的限定名称）
/// - `constructor` / `constructor = "method"` - 构造函数方法，签名为 `fn(&self) -> R`
/// - `provides(dyn A, dyn B)` - 组件满足的能力
///
/// # 字段参数
///
/// - `#[dep]` - 依赖名称由字段类型推导
/// - `#[dep = "name"]` / `#[dep(name = "name")]` - 显式依赖名称
///
/// 标记字段的类型必须是 `Dep<T>` 或 `Dep<dyn Trait>`，其他类型在注册时被拒绝。
/// 枚举、联合体和元组结构体会产生编译错误。
#[proc_macro_derive(Component, attributes(component, dep))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::derive_component_impl(input)
}
