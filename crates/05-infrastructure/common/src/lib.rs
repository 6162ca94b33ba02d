//! # Infrastructure Common
//!
//! 依赖解析相关 crate 共享的公共类型。
//!
//! ## 核心内容
//!
//! - [`DependencyError`] - 注册、解析与前向引用访问的错误分类
//! - [`ConfigError`] - 容器配置加载错误
//! - [`Lifetime`] - 单例 / 瞬时作用域
//! - [`DependencyPath`] - `root-->...-->leaf` 形式的诊断路径

pub mod diagnostics;
pub mod errors;
pub mod lifecycle;

pub use diagnostics::*;
pub use errors::*;
pub use lifecycle::*;
