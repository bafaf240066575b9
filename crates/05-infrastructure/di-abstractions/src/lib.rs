//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件描述、注册和依赖解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`Component`] - 组件类型描述
//! - [`ComponentDefinition`] - 依赖字段、能力和构造函数的声明构建器
//! - [`ComponentShell`] - 依赖图中的类型擦除节点
//! - [`ComponentRegistry`] - 组件注册表接口
//! - [`ComponentResolver`] - 依赖解析器接口
//! - [`DiContainer`] - 依赖注入容器接口

pub mod component;
pub mod container;
pub mod descriptor;
pub mod registry;
pub mod resolver;

pub use component::*;
pub use container::*;
pub use descriptor::*;
pub use registry::*;
pub use resolver::*;

pub use di_common::{
    ComponentMetadata, ContainerConfig, DependencyError, DependencyResult, DuplicatePolicy,
    TypeInfo, ValidationError,
};
