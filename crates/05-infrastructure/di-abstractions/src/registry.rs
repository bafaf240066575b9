//! 组件注册表抽象接口

use crate::component::Component;
use di_common::{ComponentMetadata, DependencyError, DependencyResult};
use std::collections::{HashMap, HashSet};

/// 组件注册表 trait
///
/// 提供组件注册和依赖图查询的核心接口
pub trait ComponentRegistry {
    /// 以 `T::component_name()` 为名称注册组件模板
    fn register<T: Component>(&mut self, template: T) -> DependencyResult<()>;

    /// 以指定名称注册组件模板
    fn register_as<T: Component>(&mut self, name: &str, template: T) -> DependencyResult<()>;

    /// 检查组件是否已注册
    fn is_registered<T: Component>(&self) -> bool {
        self.is_registered_by_name(&T::component_name())
    }

    /// 检查组件是否已注册（通过名称）
    fn is_registered_by_name(&self, name: &str) -> bool;

    /// 按注册顺序获取所有组件的元数据
    fn registered_components(&self) -> Vec<ComponentMetadata>;

    /// 不实例化任何组件，静态检查依赖关系
    fn validate(&self) -> Result<(), Vec<DependencyError>>;
}

/// 依赖图节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraphNode {
    /// 组件名称
    pub name: String,
    /// 依赖的组件名称列表（抽象依赖已替换为唯一实现）
    pub dependencies: Vec<String>,
}

/// 循环依赖检测器
pub trait CircularDependencyDetector {
    /// 检测循环依赖，返回发现的每个环
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> Vec<DependencyError>;
}

/// 默认循环依赖检测器
#[derive(Debug, Default)]
pub struct DefaultCircularDependencyDetector;

impl CircularDependencyDetector for DefaultCircularDependencyDetector {
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> Vec<DependencyError> {
        // 使用深度优先搜索检测循环依赖
        let index: HashMap<&str, &DependencyGraphNode> =
            graph.iter().map(|node| (node.name.as_str(), node)).collect();
        let mut visited = HashSet::new();
        let mut visiting = Vec::new();
        let mut cycles = Vec::new();

        for node in graph {
            if !visited.contains(node.name.as_str()) {
                Self::dfs_check(node, &index, &mut visited, &mut visiting, &mut cycles);
            }
        }

        cycles
    }
}

impl DefaultCircularDependencyDetector {
    fn dfs_check<'a>(
        current: &'a DependencyGraphNode,
        index: &HashMap<&'a str, &'a DependencyGraphNode>,
        visited: &mut HashSet<&'a str>,
        visiting: &mut Vec<&'a str>,
        cycles: &mut Vec<DependencyError>,
    ) {
        visiting.push(&current.name);

        for dependency in &current.dependencies {
            if let Some(start) = visiting.iter().position(|name| *name == dependency.as_str()) {
                // 检测到循环依赖
                let mut chain: Vec<String> =
                    visiting[start..].iter().map(ToString::to_string).collect();
                chain.push(dependency.clone());
                cycles.push(DependencyError::CircularDependency {
                    component: current.name.clone(),
                    dependency: dependency.clone(),
                    chain,
                });
                continue;
            }
            if visited.contains(dependency.as_str()) {
                continue;
            }
            if let Some(&next) = index.get(dependency.as_str()) {
                Self::dfs_check(next, index, visited, visiting, cycles);
            }
        }

        visiting.pop();
        visited.insert(&current.name);
    }
}
