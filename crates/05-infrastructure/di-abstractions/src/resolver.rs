//! 组件解析器抽象接口
//!
//! 提供依赖解析和组件实例化的能力

use crate::component::{Component, Instance};
use di_common::{DependencyError, DependencyResult};
use std::sync::Arc;

/// 组件解析器 trait
///
/// 负责解析组件依赖并创建组件实例。解析会写入实例缓存和依赖图，
/// 因此所有方法都需要 `&mut self`。
pub trait ComponentResolver {
    /// 解析指定类型的组件，未注册时返回 `Ok(None)`
    fn get<T: Component>(&mut self) -> DependencyResult<Option<Arc<T>>>;

    /// 解析指定名称的组件，未注册时返回 `Ok(None)`
    fn get_by_name(&mut self, name: &str) -> DependencyResult<Option<Instance>>;

    /// 解析能力 `D` 的唯一实现，没有实现时返回 `Ok(None)`
    fn get_capability<D>(&mut self) -> DependencyResult<Option<Arc<D>>>
    where
        D: ?Sized + Send + Sync + 'static;

    /// 按注册顺序解析全部组件，遇到第一个错误即停止
    fn resolve_all(&mut self) -> DependencyResult<()>;
}

/// 解析路径
///
/// 记录一次顶层解析中正在进行的组件，按进入顺序排列，用于检测循环依赖。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionPath {
    chain: Vec<String>,
}

impl ResolutionPath {
    /// 创建空路径
    pub fn new() -> Self {
        Self::default()
    }

    /// 进入组件
    ///
    /// 组件已在路径上时返回循环依赖错误，`requested_by` 为发起请求的组件。
    pub fn enter(&mut self, name: &str, requested_by: Option<&str>) -> DependencyResult<()> {
        if self.contains(name) {
            return Err(DependencyError::CircularDependency {
                component: requested_by.unwrap_or(name).to_string(),
                dependency: name.to_string(),
                chain: self.chain_with(name),
            });
        }
        self.chain.push(name.to_string());
        Ok(())
    }

    /// 离开组件（无论成功或失败）
    pub fn leave(&mut self, name: &str) {
        if let Some(position) = self.chain.iter().rposition(|entry| entry == name) {
            self.chain.truncate(position);
        }
    }

    /// 组件是否正在解析
    pub fn contains(&self, name: &str) -> bool {
        self.chain.iter().any(|entry| entry == name)
    }

    /// 路径深度
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// 当前路径
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// 从 `name` 第一次出现的位置截取路径，并在末尾补上 `name`
    pub fn chain_with(&self, name: &str) -> Vec<String> {
        let start = self
            .chain
            .iter()
            .position(|entry| entry == name)
            .unwrap_or(0);
        let mut chain = self.chain[start..].to_vec();
        chain.push(name.to_string());
        chain
    }
}
