//! 前向引用
//!
//! 单例依赖环中，闭合环的成员在构造完成前由前向引用代替。前向引用实现与目标
//! 相同的 trait，绑定前的任何访问都返回
//! [`DependencyError::UninitializedPropertyAccess`]，绑定后透明转发到目标。
//!
//! 前向引用只持有目标的弱引用，强引用由容器的单例缓存持有，
//! 因此环中的成员之间不会形成 `Arc` 引用环。

use crate::factory::{downcast_instance, erase, Instance};
use infrastructure_common::{DependencyError, DependencyResult};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

/// 前向引用
///
/// 克隆出的句柄共享同一个目标槽位，槽位只能绑定一次。
pub struct ForwardRef<T: ?Sized> {
    key_name: &'static str,
    slot: Arc<OnceCell<Weak<T>>>,
}

impl<T: ?Sized> ForwardRef<T> {
    /// 创建未绑定的前向引用
    pub fn new(key_name: &'static str) -> Self {
        Self {
            key_name,
            slot: Arc::new(OnceCell::new()),
        }
    }

    /// 被代替的键名
    pub fn key_name(&self) -> &'static str {
        self.key_name
    }

    /// 是否已绑定目标
    pub fn is_bound(&self) -> bool {
        self.slot.get().is_some()
    }

    /// 获取目标
    ///
    /// 绑定前返回 [`DependencyError::UninitializedPropertyAccess`]；目标已被释放时返回
    /// [`DependencyError::ForwardTargetDropped`]。
    pub fn target(&self) -> DependencyResult<Arc<T>> {
        let weak = self
            .slot
            .get()
            .ok_or_else(|| DependencyError::uninitialized(self.key_name))?;

        weak.upgrade()
            .ok_or_else(|| DependencyError::ForwardTargetDropped {
                key_name: self.key_name.to_string(),
            })
    }

    /// 绑定目标，只能调用一次
    pub fn bind(&self, target: &Arc<T>) -> DependencyResult<()> {
        self.slot
            .set(Arc::downgrade(target))
            .map_err(|_| DependencyError::ForwardReferenceAlreadyBound {
                key_name: self.key_name.to_string(),
            })
    }
}

impl<T: ?Sized> Clone for ForwardRef<T> {
    fn clone(&self) -> Self {
        Self {
            key_name: self.key_name,
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: ?Sized> fmt::Debug for ForwardRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwardRef")
            .field("key_name", &self.key_name)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// 可被前向引用代替的值类型
///
/// 通常为 `dyn Trait` 实现，并同时为 `ForwardRef<dyn Trait>` 实现该 trait，
/// 每个方法通过 [`ForwardRef::target`] 转发：
///
/// ```
/// use di_abstractions::{Deferrable, ForwardRef};
/// use infrastructure_common::DependencyResult;
/// use std::sync::Arc;
///
/// pub trait Clock: Send + Sync {
///     fn now(&self) -> DependencyResult<u64>;
/// }
///
/// impl Clock for ForwardRef<dyn Clock> {
///     fn now(&self) -> DependencyResult<u64> {
///         self.target()?.now()
///     }
/// }
///
/// impl Deferrable for dyn Clock {
///     fn defer(reference: ForwardRef<Self>) -> Arc<Self> {
///         Arc::new(reference)
///     }
/// }
/// ```
///
/// `#[forwardable]` 属性宏可以生成以上两个实现。
pub trait Deferrable: Send + Sync + 'static {
    /// 用前向引用构造一个可代替目标的值
    fn defer(reference: ForwardRef<Self>) -> Arc<Self>;
}

/// 待绑定的前向引用，接收构造完成的实例
pub type PendingForward = Box<dyn FnOnce(&Instance) -> DependencyResult<()> + Send>;

/// 类型擦除的前向引用签发器
pub type ForwardFactory = Arc<dyn Fn() -> (Instance, PendingForward) + Send + Sync>;

/// 为键 `key_name` 创建前向引用签发器
///
/// 每次调用签发一个新的前向引用，返回其代替值以及之后用于绑定的回调。
pub fn forward_factory<T>(key_name: &'static str) -> ForwardFactory
where
    T: ?Sized + Deferrable,
{
    Arc::new(move || {
        let reference = ForwardRef::<T>::new(key_name);
        let stand_in = erase(T::defer(reference.clone()));

        let pending: PendingForward = Box::new(move |instance: &Instance| {
            let target = downcast_instance::<T>(reference.key_name(), instance)?;
            reference.bind(&target)?;
            debug!(key = reference.key_name(), "前向引用已绑定");
            Ok(())
        });

        (stand_in, pending)
    })
}
