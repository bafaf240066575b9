//! 容器配置
//!
//! 配置来源按优先级从低到高：默认值、配置文件、`DI__` 前缀的环境变量。

use crate::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "DI";

/// 环境变量层级分隔符
pub const ENV_SEPARATOR: &str = "__";

/// 重复注册策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// 返回 `ValidationError::DuplicateComponent`
    #[default]
    Reject,
    /// 保留已有组件，忽略本次注册
    Ignore,
}

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 具体类型依赖未注册时是否自动注册零值占位组件
    pub auto_register_missing: bool,
    /// 无依赖组件是否在注册时立即实例化
    pub eager_leaf_resolution: bool,
    /// 重复注册策略
    pub duplicate_registration: DuplicatePolicy,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            auto_register_missing: true,
            eager_leaf_resolution: true,
            duplicate_registration: DuplicatePolicy::Reject,
        }
    }
}

impl ContainerConfig {
    /// 从配置文件（可不存在）和环境变量加载配置
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("加载容器配置: {}", path.display());

        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR))
            .build()
            .map_err(parse_error)?;

        settings.try_deserialize().map_err(parse_error)
    }

    /// 从 TOML 字符串加载配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()
            .map_err(parse_error)?;

        settings.try_deserialize().map_err(parse_error)
    }
}

fn parse_error(e: config::ConfigError) -> ConfigError {
    ConfigError::ParseError {
        source: Box::new(e),
    }
}
