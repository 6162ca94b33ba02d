//! 容器构建器
//!
//! 收集模板注册，`build()` 之后注册表不可再修改。

use crate::container::Container;
use di_abstractions::{ContainerConfig, Deferrable, Dependencies, Key, Registration, TemplateRegistry};
use infrastructure_common::{DependencyResult, Lifetime};
use std::sync::Arc;
use tracing::{debug, info};

/// 容器构建器
///
/// ```
/// use di_abstractions::Key;
/// use di_impl::ContainerBuilder;
/// use std::sync::Arc;
///
/// const GREETING: Key<String> = Key::new("Greeting");
/// const MESSAGE: Key<String> = Key::new("Message");
///
/// let mut builder = ContainerBuilder::new();
/// builder
///     .register_constant(GREETING, "你好".to_string())?
///     .register_transient(MESSAGE, GREETING, |greeting| {
///         Ok(Arc::new(format!("{greeting}，世界")))
///     })?;
///
/// let container = builder.build();
/// assert_eq!(container.get(&MESSAGE)?.as_str(), "你好，世界");
/// # Ok::<(), infrastructure_common::DependencyError>(())
/// ```
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    registry: TemplateRegistry,
    config: ContainerConfig,
}

impl ContainerBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定的容器配置
    pub fn with_config(&mut self, config: ContainerConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// 注册常量
    pub fn register_constant<T>(&mut self, key: Key<T>, value: T) -> DependencyResult<&mut Self>
    where
        T: Send + Sync + 'static,
    {
        self.register_shared_constant(key, Arc::new(value))
    }

    /// 注册共享常量，值类型可以是 trait 对象
    pub fn register_shared_constant<T>(&mut self, key: Key<T>, value: Arc<T>) -> DependencyResult<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.register(Registration::constant(key, value))
    }

    /// 注册函数绑定
    ///
    /// 工厂接收解析出的依赖，返回部分应用后的函数值。函数绑定不缓存。
    pub fn register_function<T, D, F>(&mut self, key: Key<T>, dependencies: D, factory: F) -> DependencyResult<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D::Resolved) -> DependencyResult<Arc<T>> + Send + Sync + 'static,
    {
        self.register(Registration::function(key, dependencies, factory))
    }

    /// 注册瞬时构造绑定
    pub fn register_transient<T, D, F>(&mut self, key: Key<T>, dependencies: D, factory: F) -> DependencyResult<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D::Resolved) -> DependencyResult<Arc<T>> + Send + Sync + 'static,
    {
        self.register(Registration::construction(key, Lifetime::Transient, dependencies, factory))
    }

    /// 注册单例构造绑定
    ///
    /// 该单例不能闭合依赖环；需要闭合依赖环时使用
    /// [`register_deferrable_singleton`](Self::register_deferrable_singleton)。
    pub fn register_singleton<T, D, F>(&mut self, key: Key<T>, dependencies: D, factory: F) -> DependencyResult<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D::Resolved) -> DependencyResult<Arc<T>> + Send + Sync + 'static,
    {
        self.register(Registration::construction(key, Lifetime::Singleton, dependencies, factory))
    }

    /// 注册可闭合依赖环的单例构造绑定
    ///
    /// 闭合依赖环时，容器交出一个 [`ForwardRef`](di_abstractions::ForwardRef)，
    /// 在该单例构造完成后绑定。
    pub fn register_deferrable_singleton<T, D, F>(
        &mut self,
        key: Key<T>,
        dependencies: D,
        factory: F,
    ) -> DependencyResult<&mut Self>
    where
        T: ?Sized + Deferrable,
        D: Dependencies,
        F: Fn(D::Resolved) -> DependencyResult<Arc<T>> + Send + Sync + 'static,
    {
        self.register(Registration::deferrable_singleton(key, dependencies, factory))
    }

    fn register(&mut self, registration: Registration) -> DependencyResult<&mut Self> {
        let key_name = registration.key_name();
        let kind = registration.template().kind();

        self.registry.insert(registration)?;
        debug!(key = key_name, kind, "注册模板");
        Ok(self)
    }

    /// 检查键名是否已注册
    pub fn is_registered(&self, key_name: &str) -> bool {
        self.registry.contains(key_name)
    }

    /// 已注册的模板数量
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// 是否没有任何注册
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// 构建容器
    pub fn build(self) -> Container {
        let container = Container::new(self.registry, self.config);

        let stats = container.stats();
        info!(
            templates = stats.registered_templates,
            singletons = stats.singleton_templates,
            "构建容器完成"
        );
        container
    }
}
