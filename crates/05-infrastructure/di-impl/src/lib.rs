//! # 依赖注入具体实现
//!
//! 提供具体的依赖注入容器、能力索引和容器构建器实现

pub mod builder;
pub mod capability_index;
pub mod container;

pub use builder::DiContainerBuilder;
pub use capability_index::CapabilityIndex;
pub use container::DiContainerImpl;
