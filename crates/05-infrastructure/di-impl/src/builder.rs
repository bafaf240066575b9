//! 容器构建器实现

use crate::container::DiContainerImpl;
use di_abstractions::{Component, ComponentRegistry, ContainerBuilder};
use di_common::{ContainerConfig, DependencyResult};
use tracing::info;

/// 延迟执行的注册
type Registration = Box<dyn FnOnce(&mut DiContainerImpl) -> DependencyResult<()>>;

/// 容器构建器实现
///
/// 收集配置和注册，`build` 时按添加顺序注册到新容器。
pub struct DiContainerBuilder {
    config: ContainerConfig,
    registrations: Vec<Registration>,
}

impl DiContainerBuilder {
    /// 创建使用默认配置的构建器
    pub fn new() -> Self {
        Self {
            config: ContainerConfig::default(),
            registrations: Vec::new(),
        }
    }
}

impl Default for DiContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder for DiContainerBuilder {
    type Container = DiContainerImpl;

    fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    fn register<T: Component>(mut self, template: T) -> Self {
        self.registrations
            .push(Box::new(move |container: &mut DiContainerImpl| {
                container.register(template)
            }));
        self
    }

    fn register_as<T: Component>(mut self, name: &str, template: T) -> Self {
        let name = name.to_string();
        self.registrations
            .push(Box::new(move |container: &mut DiContainerImpl| {
                container.register_as(&name, template)
            }));
        self
    }

    fn build(self) -> DependencyResult<Self::Container> {
        let mut container = DiContainerImpl::with_config(self.config);

        // 记录注册组件数量
        let registration_count = self.registrations.len();
        for registration in self.registrations {
            registration(&mut container)?;
        }

        info!("构建容器完成，注册了 {} 个组件", registration_count);
        Ok(container)
    }
}
