//! 能力到实现组件的索引

use std::any::TypeId;
use std::collections::{BTreeSet, HashMap};

/// 能力索引
///
/// 注册（包括自动注册）时更新，因此每次查找都能看到当前所有的实现组件。
#[derive(Debug, Default)]
pub struct CapabilityIndex {
    implementers: HashMap<TypeId, BTreeSet<String>>,
}

impl CapabilityIndex {
    /// 创建空索引
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录组件 `name` 满足的能力
    pub fn insert(&mut self, name: &str, capabilities: impl IntoIterator<Item = TypeId>) {
        for capability in capabilities {
            self.implementers
                .entry(capability)
                .or_default()
                .insert(name.to_string());
        }
    }

    /// 移除组件 `name` 的全部记录
    pub fn remove(&mut self, name: &str) {
        self.implementers.retain(|_, names| {
            names.remove(name);
            !names.is_empty()
        });
    }

    /// 满足能力的组件名称，按名称排序
    pub fn implementers(&self, capability: TypeId) -> Vec<String> {
        self.implementers
            .get(&capability)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// 已索引的能力数量
    pub fn len(&self) -> usize {
        self.implementers.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.implementers.is_empty()
    }
}
