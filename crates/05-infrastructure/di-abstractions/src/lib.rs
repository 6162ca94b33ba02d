//! # Dependency Injection Abstractions
//!
//! 依赖解析引擎的抽象层，定义键、模板、依赖图节点与前向引用。
//!
//! ## 核心接口
//!
//! - [`Key`] - 类型化键
//! - [`Dependencies`] - 随工厂注册的有序依赖键
//! - [`TemplateRegistry`] - 键名到模板的映射
//! - [`DependencyGraphNode`] - 解析过程中的祖先链，用于循环检测与诊断
//! - [`ForwardRef`] / [`Deferrable`] - 单例依赖环的前向引用
//! - [`ComponentResolver`] - 按名称解析的接口
//! - [`ContainerConfig`] - 容器配置

pub mod container;
pub mod factory;
pub mod forward;
pub mod key;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use factory::*;
pub use forward::*;
pub use key::*;
pub use registry::*;
pub use resolver::*;
