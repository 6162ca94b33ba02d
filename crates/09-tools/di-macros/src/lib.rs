//! # DI Macros
//!
//! 为依赖环成员的 trait 生成前向引用转发层的过程宏。
//!
//! ## 核心宏
//!
//! - [`forwardable`] - 为 `ForwardRef<dyn Trait>` 实现该 trait，并为 `dyn Trait` 实现 `Deferrable`
//!
//! ## 使用示例
//!
//! ```rust
//! use di_macros::forwardable;
//! use infrastructure_common::DependencyResult;
//!
//! #[forwardable]
//! pub trait Clock: Send + Sync {
//!     fn now(&self) -> DependencyResult<u64>;
//! }
//!
//! let reference = di_abstractions::ForwardRef::<dyn Clock>::new("Clock");
//! assert!(reference.now().is_err());
//! ```

use proc_macro::TokenStream;

mod forwardable;
mod utils;

/// 前向引用转发宏
///
/// 生成的代码引用 `::di_abstractions`，使用方需要依赖该 crate。
///
/// trait 需要满足：
///
/// - 父 trait 为 `Send + Sync`，不带泛型参数、关联类型或关联常量
/// - 每个方法以 `&self` 为接收者，不是 `async fn`
/// - 每个方法返回 `Result<_, E>`，`E: From<DependencyError>`，且返回值不借用接收者
///
/// 带有 `where Self: Sized` 的默认方法不参与转发。
///
/// # 示例
///
/// ```rust
/// use di_macros::forwardable;
/// use infrastructure_common::DependencyResult;
///
/// #[forwardable]
/// pub trait Repository: Send + Sync {
///     fn count(&self) -> DependencyResult<usize>;
///     fn find(&self, id: u32) -> DependencyResult<Option<String>>;
/// }
/// ```
#[proc_macro_attribute]
pub fn forwardable(args: TokenStream, input: TokenStream) -> TokenStream {
    forwardable::forwardable_impl(args, input)
}
