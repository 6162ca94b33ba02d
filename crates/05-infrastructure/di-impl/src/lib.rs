//! # 依赖解析引擎实现
//!
//! 提供容器构建器与解析引擎
//!
//! - [`ContainerBuilder`] - 收集模板注册并构建容器
//! - [`Container`] - 解析引擎，持有单例缓存、待绑定前向引用与已解析集合

pub mod builder;
pub mod container;

pub use builder::ContainerBuilder;
pub use container::Container;
