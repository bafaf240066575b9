//! 元数据定义
//!
//! 提供组件和类型的元数据信息

use serde::{Deserialize, Serialize};
use std::any::TypeId;

/// 获取类型的限定名称（包含完整模块路径）
///
/// 同一进程内对同一类型总是返回相同的字符串。
pub fn qualified_name<T: ?Sized + 'static>() -> String {
    std::any::type_name::<T>().to_string()
}

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 限定名称
    pub name: String,
    /// 类型ID
    pub id: TypeId,
}

impl TypeInfo {
    /// 从类型获取类型信息，支持 `dyn Trait`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            name: qualified_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &str {
        let base = self.name.split('<').next().unwrap_or(&self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

/// 依赖字段声明的类型种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// 具体类型引用 `Dep<T>`
    Concrete,
    /// 抽象能力 `Dep<dyn Trait>`
    Capability,
    /// 值类型字段，注册时会被拒绝
    Unsupported,
}

/// 依赖字段元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyMetadata {
    /// 字段名
    pub field: String,
    /// 依赖名称
    pub name: String,
    /// 字段声明的类型
    pub declared_type: String,
    /// 类型种类
    pub kind: DependencyKind,
}

/// 组件元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    /// 组件名称（依赖图中的键）
    pub name: String,
    /// 具体类型的限定名称
    pub type_name: String,
    /// 按声明顺序排列的依赖字段
    pub dependencies: Vec<DependencyMetadata>,
    /// 提供的能力（trait object 限定名称）
    pub capabilities: Vec<String>,
    /// 是否声明了构造函数
    pub has_constructor: bool,
    /// 是否为自动注册的占位组件
    pub auto_registered: bool,
    /// 是否已经解析出实例
    pub resolved: bool,
}
