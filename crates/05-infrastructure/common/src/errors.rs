//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置源无法读取或反序列化
    #[error("配置解析失败: {source}")]
    ParseError {
        /// 底层错误
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 组件注册校验错误
///
/// 注册时发现的结构问题，注册被拒绝且不会重试。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 标记为依赖的字段不是 `Dep<T>` 或 `Dep<dyn Trait>`
    #[error("组件 '{component}' 的字段 '{field}' 类型 '{declared}' 不是 Dep<T> 或 Dep<dyn Trait>")]
    UnsupportedFieldType {
        /// 组件名称
        component: String,
        /// 字段名
        field: String,
        /// 字段声明的类型
        declared: String,
    },

    /// 同名组件已存在
    #[error("组件 '{name}' 已注册")]
    DuplicateComponent {
        /// 组件名称
        name: String,
    },
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    /// 注册校验失败
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 依赖没有提供者且不能自动注册
    #[error("'{dependency}' 未提供(未注册), 被 '{required_by}' 依赖")]
    NotProvided {
        /// 依赖名称
        dependency: String,
        /// 声明该依赖的组件
        required_by: String,
    },

    /// 能力有多个实现
    #[error("接口 '{capability}' 存在多个实现:\n  {}", .candidates.join("\n  "))]
    AmbiguousImplementation {
        /// 能力的限定名称
        capability: String,
        /// 排序后的候选组件
        candidates: Vec<String>,
    },

    /// 解析路径上出现循环
    #[error("检测到循环依赖, '{component}' 和 '{dependency}' 相互依赖 ({})", .chain.join(" -> "))]
    CircularDependency {
        /// 发起请求的组件
        component: String,
        /// 已在解析路径上的依赖
        dependency: String,
        /// 完整的解析链
        chain: Vec<String>,
    },

    /// 实例无法赋值给字段类型
    #[error("'{actual}' 无法赋值给 '{expected}' (依赖 '{dependency}')")]
    TypeMismatch {
        /// 依赖名称
        dependency: String,
        /// 字段期望的类型
        expected: String,
        /// 实例的实际类型
        actual: String,
    },

    /// 构造函数返回值数量不是一个
    #[error("'{component}' 的构造函数返回值数量错误, 期望: {expected}, 实际: {actual}")]
    ConstructorArity {
        /// 组件名称
        component: String,
        /// 期望数量
        expected: usize,
        /// 实际数量
        actual: usize,
    },

    /// 构造函数返回错误或 panic
    #[error("调用 '{component}' 的构造函数失败: {message}")]
    ConstructorFault {
        /// 组件名称
        component: String,
        /// 错误或 panic 信息
        message: String,
    },

    /// 顶层解析错误
    #[error("注入 '{root}' 的依赖时出错:\n  {source}")]
    InjectionFailed {
        /// 顶层请求的组件
        root: String,
        /// 内层错误
        #[source]
        source: Box<DependencyError>,
    },
}

impl DependencyError {
    /// 包装为顶层注入错误
    pub fn injection_failed(root: impl Into<String>, source: Self) -> Self {
        Self::InjectionFailed {
            root: root.into(),
            source: Box::new(source),
        }
    }

    /// 剥掉所有 `InjectionFailed` 包装，返回最内层的错误
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::InjectionFailed { source, .. } = current {
            current = source.as_ref();
        }
        current
    }
}

/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;
/// 依赖注入结果类型
pub type DependencyResult<T> = Result<T, DependencyError>;
