//! 类型化键
//!
//! 键以唯一名称标识一个可注册的值，并通过幻影类型携带该值的类型

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// 类型化键
///
/// `Key<T>` 解析得到 `Arc<T>`。`T` 可以是具体类型、trait 对象
/// （例如 `dyn Service`）或函数 trait 对象（例如 `dyn Fn(f64) -> f64 + Send + Sync`）。
///
/// 名称唯一性只在注册时检查；两个键即使值类型不同，只要名称相同就视为同一个键。
///
/// ```
/// use di_abstractions::Key;
///
/// const TAX_RATE: Key<f64> = Key::new("TaxRate");
/// assert_eq!(TAX_RATE.name(), "TaxRate");
/// ```
pub struct Key<T: ?Sized> {
    name: &'static str,
    _value: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized> Key<T> {
    /// 创建新的键
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _value: PhantomData,
        }
    }

    /// 键名
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// 值类型名称
    pub fn value_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl<T: ?Sized> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Key<T> {}

impl<T: ?Sized> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T: ?Sized> Eq for Key<T> {}

impl<T: ?Sized> Hash for Key<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.name)
            .field("value_type", &self.value_type())
            .finish()
    }
}

impl<T: ?Sized> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
