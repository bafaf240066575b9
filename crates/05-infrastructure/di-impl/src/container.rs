//! 依赖注入容器实现
//!
//! 依赖图以组件名称为键，解析时按字段声明顺序深度优先地解析依赖，
//! 通过解析路径检测循环依赖，结果缓存为容器内单例。

use crate::capability_index::CapabilityIndex;
use di_abstractions::{
    CircularDependencyDetector, Component, ComponentRegistry, ComponentResolver, ComponentShell,
    ContainerStats, DefaultCircularDependencyDetector, DependencyField, DependencyGraphNode,
    DiContainer, Instance, ResolutionPath, TypedShell,
};
use di_common::{
    qualified_name, ComponentMetadata, ContainerConfig, DependencyError, DependencyKind,
    DependencyResult, DuplicatePolicy, TypeInfo, ValidationError,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 依赖图节点
struct ComponentNode {
    shell: Box<dyn ComponentShell>,
    auto_registered: bool,
}

/// 已解析的实例
#[derive(Clone)]
struct CachedInstance {
    instance: Instance,
    type_name: String,
}

/// 具体的依赖注入容器实现
///
/// 不是线程安全的，调用方需要自行串行化访问。
pub struct DiContainerImpl {
    id: String,
    config: ContainerConfig,
    /// 组件名称 -> 节点
    graph: HashMap<String, ComponentNode>,
    /// 注册顺序
    order: Vec<String>,
    /// 组件名称 -> 实例
    cache: HashMap<String, CachedInstance>,
    /// 能力依赖名称 -> 转换后的能力实例，与组件实例分开存放
    capability_cache: HashMap<String, CachedInstance>,
    capabilities: CapabilityIndex,
    resolution_errors: usize,
}

impl DiContainerImpl {
    /// 使用默认配置创建容器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建容器
    pub fn with_config(config: ContainerConfig) -> Self {
        let id = Uuid::new_v4().to_string();
        debug!(container = %id, "创建容器: {:?}", config);

        Self {
            id,
            config,
            graph: HashMap::new(),
            order: Vec::new(),
            cache: HashMap::new(),
            capability_cache: HashMap::new(),
            capabilities: CapabilityIndex::new(),
            resolution_errors: 0,
        }
    }

    fn insert_node(&mut self, shell: Box<dyn ComponentShell>, auto_registered: bool) {
        let name = shell.name().to_string();
        self.capability_cache.remove(&name);
        self.capabilities
            .insert(&name, shell.capabilities().into_iter().map(|c| c.id));
        self.order.push(name.clone());
        self.graph.insert(
            name,
            ComponentNode {
                shell,
                auto_registered,
            },
        );
    }

    fn remove_node(&mut self, name: &str) {
        self.graph.remove(name);
        self.order.retain(|entry| entry != name);
        self.capabilities.remove(name);
    }

    fn register_shell(&mut self, shell: Box<dyn ComponentShell>) -> DependencyResult<()> {
        let name = shell.name().to_string();

        if self.graph.contains_key(&name) {
            return match self.config.duplicate_registration {
                DuplicatePolicy::Reject => {
                    warn!(container = %self.id, "拒绝重复注册: {}", name);
                    Err(ValidationError::DuplicateComponent { name }.into())
                }
                DuplicatePolicy::Ignore => {
                    warn!(container = %self.id, "忽略重复注册: {}", name);
                    Ok(())
                }
            };
        }

        if let Err(e) = shell.validate() {
            warn!(container = %self.id, "组件注册被拒绝: {} - {}", name, e);
            return Err(e.into());
        }

        let leaf = shell.fields().is_empty();
        info!(container = %self.id, "注册组件: {} ({})", name, shell.type_info().short_name());
        self.insert_node(shell, false);

        // 无依赖的组件立即实例化
        if leaf && self.config.eager_leaf_resolution {
            let mut path = ResolutionPath::new();
            if let Err(e) = self.resolve_node(&name, None, &mut path) {
                self.remove_node(&name);
                self.resolution_errors += 1;
                warn!(container = %self.id, "无依赖组件实例化失败, 撤销注册: {} - {}", name, e);
                return Err(DependencyError::injection_failed(name, e));
            }
        }

        Ok(())
    }

    /// 顶层解析，错误包装为 `InjectionFailed`
    fn resolve_root(&mut self, name: &str) -> DependencyResult<CachedInstance> {
        let mut path = ResolutionPath::new();
        match self.resolve_node(name, None, &mut path) {
            Ok(resolved) => Ok(resolved),
            Err(e) => {
                self.resolution_errors += 1;
                warn!(container = %self.id, "解析组件失败: {} - {}", name, e);
                Err(DependencyError::injection_failed(name, e))
            }
        }
    }

    fn resolve_node(
        &mut self,
        name: &str,
        requested_by: Option<&str>,
        path: &mut ResolutionPath,
    ) -> DependencyResult<CachedInstance> {
        if let Some(cached) = self.cache.get(name) {
            return Ok(cached.clone());
        }
        let fields = match self.graph.get(name) {
            Some(node) => node.shell.fields().to_vec(),
            None => {
                return Err(DependencyError::NotProvided {
                    dependency: name.to_string(),
                    required_by: requested_by.unwrap_or(name).to_string(),
                })
            }
        };

        path.enter(name, requested_by)?;
        debug!(container = %self.id, depth = path.depth(), "解析组件: {}", name);
        let result = self
            .populate(name, &fields, path)
            .and_then(|()| self.construct(name));
        path.leave(name);
        result
    }

    /// 按声明顺序解析并注入依赖字段
    fn populate(
        &mut self,
        name: &str,
        fields: &[DependencyField],
        path: &mut ResolutionPath,
    ) -> DependencyResult<()> {
        for (index, field) in fields.iter().enumerate() {
            let resolved = match field.kind {
                DependencyKind::Concrete => self.resolve_concrete(name, field, path)?,
                DependencyKind::Capability => self.resolve_capability(name, field, path)?,
                DependencyKind::Unsupported => return Err(unsupported(name, field).into()),
            };

            let injected = self
                .graph
                .get_mut(name)
                .is_some_and(|node| node.shell.inject(index, &resolved.instance));
            if !injected {
                return Err(DependencyError::TypeMismatch {
                    dependency: field.name.clone(),
                    expected: field.declared_type.clone(),
                    actual: resolved.type_name,
                });
            }
            debug!(container = %self.id, "注入依赖: {}.{} <- {}", name, field.field, field.name);
        }
        Ok(())
    }

    fn resolve_concrete(
        &mut self,
        owner: &str,
        field: &DependencyField,
        path: &mut ResolutionPath,
    ) -> DependencyResult<CachedInstance> {
        if !self.graph.contains_key(&field.name) {
            self.auto_register(owner, field)?;
        }
        self.resolve_node(&field.name, Some(owner), path)
    }

    /// 为未注册的具体类型依赖注册零值占位组件
    fn auto_register(&mut self, owner: &str, field: &DependencyField) -> DependencyResult<()> {
        match field.placeholder {
            Some(factory) if field.derived_name && self.config.auto_register_missing => {
                warn!(container = %self.id, "自动注册未注册的依赖: {} (被 '{}' 依赖)", field.name, owner);
                let shell = factory(&field.name);
                shell.validate()?;
                self.insert_node(shell, true);
                Ok(())
            }
            _ => Err(DependencyError::NotProvided {
                dependency: field.name.clone(),
                required_by: owner.to_string(),
            }),
        }
    }

    fn resolve_capability(
        &mut self,
        owner: &str,
        field: &DependencyField,
        path: &mut ResolutionPath,
    ) -> DependencyResult<CachedInstance> {
        let Some(capability) = field.required.as_ref() else {
            return Err(unsupported(owner, field).into());
        };

        let named_provider = self
            .graph
            .get(&field.name)
            .map(|node| node.shell.implements(capability.id));
        let provider = match named_provider {
            // 显式名称指向满足能力的组件时直接使用该组件
            Some(true) if !field.derived_name => field.name.clone(),
            Some(_) => self.unique_implementer(owner, &field.name, capability)?,
            None => {
                if let Some(cached) = self.capability_cache.get(&field.name) {
                    return Ok(cached.clone());
                }
                self.unique_implementer(owner, &field.name, capability)?
            }
        };

        let resolved = self.resolve_node(&provider, Some(owner), path)?;
        let instance = self
            .graph
            .get(&provider)
            .and_then(|node| node.shell.cast_to(capability.id, &resolved.instance))
            .ok_or_else(|| DependencyError::TypeMismatch {
                dependency: field.name.clone(),
                expected: capability.name.clone(),
                actual: resolved.type_name.clone(),
            })?;
        let cast = CachedInstance {
            instance,
            type_name: resolved.type_name,
        };

        // 同名组件存在时不缓存，之后按组件解析
        if !self.graph.contains_key(&field.name) {
            self.capability_cache.insert(field.name.clone(), cast.clone());
        }
        Ok(cast)
    }

    fn unique_implementer(
        &self,
        owner: &str,
        dependency: &str,
        capability: &TypeInfo,
    ) -> DependencyResult<String> {
        let mut candidates = self.capabilities.implementers(capability.id);
        match candidates.len() {
            0 => Err(DependencyError::NotProvided {
                dependency: dependency.to_string(),
                required_by: owner.to_string(),
            }),
            1 => Ok(candidates.remove(0)),
            _ => Err(DependencyError::AmbiguousImplementation {
                capability: capability.name.clone(),
                candidates,
            }),
        }
    }

    fn construct(&mut self, name: &str) -> DependencyResult<CachedInstance> {
        let node = self
            .graph
            .get_mut(name)
            .ok_or_else(|| DependencyError::NotProvided {
                dependency: name.to_string(),
                required_by: name.to_string(),
            })?;
        let (instance, type_name) = node.shell.construct()?;

        let resolved = CachedInstance {
            instance,
            type_name,
        };
        self.cache.insert(name.to_string(), resolved.clone());
        debug!(container = %self.id, "组件已解析: {}", name);
        Ok(resolved)
    }

    /// 静态检查单个字段，返回依赖边指向的组件名称
    fn check_field(&self, owner: &str, field: &DependencyField) -> Result<Option<String>, DependencyError> {
        match field.kind {
            DependencyKind::Unsupported => Err(unsupported(owner, field).into()),
            DependencyKind::Concrete => {
                if self.graph.contains_key(&field.name) {
                    Ok(Some(field.name.clone()))
                } else if field.placeholder.is_some()
                    && field.derived_name
                    && self.config.auto_register_missing
                {
                    Ok(None)
                } else {
                    Err(DependencyError::NotProvided {
                        dependency: field.name.clone(),
                        required_by: owner.to_string(),
                    })
                }
            }
            DependencyKind::Capability => {
                let Some(capability) = field.required.as_ref() else {
                    return Err(unsupported(owner, field).into());
                };
                let named = self
                    .graph
                    .get(&field.name)
                    .is_some_and(|node| node.shell.implements(capability.id));
                if named && !field.derived_name {
                    return Ok(Some(field.name.clone()));
                }
                self.unique_implementer(owner, &field.name, capability)
                    .map(Some)
            }
        }
    }
}

fn unsupported(owner: &str, field: &DependencyField) -> ValidationError {
    ValidationError::UnsupportedFieldType {
        component: owner.to_string(),
        field: field.field.to_string(),
        declared: field.declared_type.clone(),
    }
}

impl Default for DiContainerImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DiContainerImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiContainerImpl")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("components", &self.order)
            .finish_non_exhaustive()
    }
}

impl ComponentRegistry for DiContainerImpl {
    fn register<T: Component>(&mut self, template: T) -> DependencyResult<()> {
        self.register_shell(Box::new(TypedShell::new(T::component_name(), template)))
    }

    fn register_as<T: Component>(&mut self, name: &str, template: T) -> DependencyResult<()> {
        self.register_shell(Box::new(TypedShell::new(name, template)))
    }

    fn is_registered_by_name(&self, name: &str) -> bool {
        self.graph.contains_key(name)
    }

    fn registered_components(&self) -> Vec<ComponentMetadata> {
        self.order
            .iter()
            .filter_map(|name| self.graph.get(name).map(|node| (name, node)))
            .map(|(name, node)| ComponentMetadata {
                auto_registered: node.auto_registered,
                resolved: self.cache.contains_key(name),
                ..node.shell.metadata()
            })
            .collect()
    }

    fn validate(&self) -> Result<(), Vec<DependencyError>> {
        info!(container = %self.id, "验证依赖图: {} 个组件", self.order.len());
        let mut errors = Vec::new();
        let mut graph = Vec::with_capacity(self.order.len());

        for name in &self.order {
            let Some(node) = self.graph.get(name) else {
                continue;
            };
            let mut dependencies = Vec::new();
            for field in node.shell.fields() {
                match self.check_field(name, field) {
                    Ok(Some(dependency)) => dependencies.push(dependency),
                    Ok(None) => {}
                    Err(e) => errors.push(e),
                }
            }
            graph.push(DependencyGraphNode {
                name: name.clone(),
                dependencies,
            });
        }

        errors.extend(DefaultCircularDependencyDetector.detect_circular_dependencies(&graph));
        if errors.is_empty() {
            Ok(())
        } else {
            warn!(container = %self.id, "依赖图存在 {} 个问题", errors.len());
            Err(errors)
        }
    }
}

impl ComponentResolver for DiContainerImpl {
    fn get<T: Component>(&mut self) -> DependencyResult<Option<Arc<T>>> {
        let name = T::component_name();
        let Some(instance) = self.get_by_name(&name)? else {
            return Ok(None);
        };
        match instance.downcast::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(DependencyError::TypeMismatch {
                actual: self
                    .cache
                    .get(&name)
                    .map(|cached| cached.type_name.clone())
                    .unwrap_or_default(),
                dependency: name,
                expected: qualified_name::<T>(),
            }),
        }
    }

    fn get_by_name(&mut self, name: &str) -> DependencyResult<Option<Instance>> {
        if !self.graph.contains_key(name) {
            debug!(container = %self.id, "组件未注册: {}", name);
            return Ok(None);
        }
        self.resolve_root(name).map(|resolved| Some(resolved.instance))
    }

    fn get_capability<D>(&mut self) -> DependencyResult<Option<Arc<D>>>
    where
        D: ?Sized + Send + Sync + 'static,
    {
        let capability = TypeInfo::of::<D>();
        let mut candidates = self.capabilities.implementers(capability.id);
        let provider = match candidates.len() {
            0 => return Ok(None),
            1 => candidates.remove(0),
            _ => {
                self.resolution_errors += 1;
                return Err(DependencyError::injection_failed(
                    capability.name.clone(),
                    DependencyError::AmbiguousImplementation {
                        capability: capability.name,
                        candidates,
                    },
                ));
            }
        };

        let resolved = self.resolve_root(&provider)?;
        let value = self
            .graph
            .get(&provider)
            .and_then(|node| node.shell.cast_to(capability.id, &resolved.instance));
        match value.as_ref().and_then(|v| v.downcast_ref::<Arc<D>>()) {
            Some(value) => Ok(Some(Arc::clone(value))),
            None => Err(DependencyError::TypeMismatch {
                dependency: provider,
                expected: capability.name,
                actual: resolved.type_name,
            }),
        }
    }

    fn resolve_all(&mut self) -> DependencyResult<()> {
        info!(container = %self.id, "解析全部组件: {} 个", self.order.len());
        // 解析过程中自动注册的组件追加在末尾，同样会被解析
        let mut index = 0;
        while index < self.order.len() {
            let name = self.order[index].clone();
            if !self.cache.contains_key(&name) {
                self.resolve_root(&name)?;
            }
            index += 1;
        }
        info!(container = %self.id, "全部组件解析完成");
        Ok(())
    }
}

impl DiContainer for DiContainerImpl {
    fn id(&self) -> &str {
        &self.id
    }

    fn config(&self) -> &ContainerConfig {
        &self.config
    }

    fn stats(&self) -> ContainerStats {
        ContainerStats {
            registered_components: self.graph.len(),
            resolved_components: self
                .graph
                .keys()
                .filter(|name| self.cache.contains_key(*name))
                .count(),
            auto_registered_components: self
                .graph
                .values()
                .filter(|node| node.auto_registered)
                .count(),
            resolution_errors: self.resolution_errors,
        }
    }
}
