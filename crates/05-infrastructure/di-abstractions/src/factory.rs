//! 组件工厂抽象
//!
//! 提供类型擦除的实例表示，以及随工厂一起注册的有序依赖键列表

use crate::key::Key;
use infrastructure_common::{DependencyError, DependencyResult};
use std::any::Any;
use std::sync::Arc;

/// 类型擦除后的已解析实例
///
/// `Key<T>` 对应的实例内部保存的是一个 `Arc<T>`。
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 类型擦除的实例工厂，按声明顺序接收已解析的依赖
pub type InstanceFactory = Arc<dyn Fn(Vec<Instance>) -> DependencyResult<Instance> + Send + Sync>;

/// 擦除 `Arc<T>` 的具体类型
pub fn erase<T>(value: Arc<T>) -> Instance
where
    T: ?Sized + Send + Sync + 'static,
{
    Arc::new(value)
}

/// 将擦除后的实例还原为 `Arc<T>`
pub fn downcast_instance<T>(key_name: &str, instance: &Instance) -> DependencyResult<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    instance
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| DependencyError::type_mismatch(key_name, std::any::type_name::<T>()))
}

fn instance_at<T>(instances: &[Instance], index: usize, key_name: &str) -> DependencyResult<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    match instances.get(index) {
        Some(instance) => downcast_instance(key_name, instance),
        None => Err(DependencyError::DependencyResolutionFailed {
            key_name: key_name.to_string(),
            message: format!("缺少第 {index} 个依赖实例"),
        }),
    }
}

/// 有序依赖列表
///
/// 为 `()`、单个 [`Key`] 以及最多 8 个键组成的元组实现。`key_names` 给出引擎
/// 需要按顺序解析的键，`resolve` 把引擎解析出的实例转换为工厂参数。
pub trait Dependencies: Send + Sync + 'static {
    /// 传给工厂的已解析依赖
    type Resolved;

    /// 按声明顺序排列的依赖键名
    fn key_names(&self) -> Vec<&'static str>;

    /// 将按声明顺序解析出的实例转换为类型化的依赖
    fn resolve(&self, instances: &[Instance]) -> DependencyResult<Self::Resolved>;
}

impl Dependencies for () {
    type Resolved = ();

    fn key_names(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn resolve(&self, _instances: &[Instance]) -> DependencyResult<Self::Resolved> {
        Ok(())
    }
}

impl<A> Dependencies for Key<A>
where
    A: ?Sized + Send + Sync + 'static,
{
    type Resolved = Arc<A>;

    fn key_names(&self) -> Vec<&'static str> {
        vec![self.name()]
    }

    fn resolve(&self, instances: &[Instance]) -> DependencyResult<Self::Resolved> {
        instance_at(instances, 0, self.name())
    }
}

macro_rules! impl_dependencies {
    ($($ty:ident : $idx:tt),+) => {
        impl<$($ty: ?Sized + Send + Sync + 'static),+> Dependencies for ($(Key<$ty>,)+) {
            type Resolved = ($(Arc<$ty>,)+);

            fn key_names(&self) -> Vec<&'static str> {
                vec![$(self.$idx.name()),+]
            }

            fn resolve(&self, instances: &[Instance]) -> DependencyResult<Self::Resolved> {
                Ok(($(instance_at::<$ty>(instances, $idx, self.$idx.name())?,)+))
            }
        }
    };
}

impl_dependencies!(A: 0);
impl_dependencies!(A: 0, B: 1);
impl_dependencies!(A: 0, B: 1, C: 2);
impl_dependencies!(A: 0, B: 1, C: 2, D: 3);
impl_dependencies!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_dependencies!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_dependencies!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_dependencies!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
