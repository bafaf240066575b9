//! # DI Common
//!
//! 依赖注入各层共享的基础类型。
//!
//! ## 核心内容
//!
//! - [`DependencyError`] / [`ValidationError`] - 注册与解析的错误分类
//! - [`TypeInfo`] - 类型的限定名称与类型ID
//! - [`ComponentMetadata`] - 组件及其依赖字段的描述
//! - [`ContainerConfig`] - 容器行为配置
//!
//! 本 crate 不持有任何全局状态，每个容器各自拥有自己的依赖图与实例缓存。

pub mod configuration;
pub mod errors;
pub mod metadata;

pub use configuration::*;
pub use errors::*;
pub use metadata::*;
