//! 依赖注入容器抽象接口
//!
//! 提供依赖注入容器的核心抽象

use crate::component::Component;
use crate::registry::ComponentRegistry;
use crate::resolver::ComponentResolver;
use di_common::{ContainerConfig, DependencyResult};
use serde::{Deserialize, Serialize};

/// 依赖注入容器 trait
///
/// 组合注册表和解析器，每个容器独立持有依赖图和实例缓存
pub trait DiContainer: ComponentRegistry + ComponentResolver {
    /// 容器标识，用于区分同一进程中的多个容器
    fn id(&self) -> &str;

    /// 容器配置
    fn config(&self) -> &ContainerConfig;

    /// 容器统计信息
    fn stats(&self) -> ContainerStats;
}

/// 容器构建器 trait
pub trait ContainerBuilder {
    /// 关联的容器类型
    type Container: DiContainer;

    /// 设置容器配置
    fn with_config(self, config: ContainerConfig) -> Self
    where
        Self: Sized;

    /// 添加组件注册，`build` 时按添加顺序注册
    fn register<T: Component>(self, template: T) -> Self
    where
        Self: Sized;

    /// 以指定名称添加组件注册
    fn register_as<T: Component>(self, name: &str, template: T) -> Self
    where
        Self: Sized;

    /// 构建容器
    fn build(self) -> DependencyResult<Self::Container>;
}

/// 容器统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStats {
    /// 已注册组件数量（包含自动注册的组件）
    pub registered_components: usize,
    /// 已解析组件数量
    pub resolved_components: usize,
    /// 自动注册的组件数量
    pub auto_registered_components: usize,
    /// 解析错误数量
    pub resolution_errors: usize,
}
