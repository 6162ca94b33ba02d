//! 模板注册表
//!
//! 键名到模板的映射。模板描述如何产生一个键的值：常量、函数绑定或构造绑定。

use crate::factory::{erase, Dependencies, Instance, InstanceFactory};
use crate::forward::{forward_factory, Deferrable, ForwardFactory};
use crate::key::Key;
use infrastructure_common::{DependencyError, DependencyResult, Lifetime};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 工厂与其有序依赖键
#[derive(Clone)]
pub struct Binding {
    dependencies: Vec<&'static str>,
    factory: InstanceFactory,
}

impl Binding {
    /// 由类型化的依赖列表和工厂创建绑定
    pub fn new<T, D, F>(dependencies: D, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D::Resolved) -> DependencyResult<Arc<T>> + Send + Sync + 'static,
    {
        let key_names = dependencies.key_names();
        let factory: InstanceFactory = Arc::new(move |instances: Vec<Instance>| {
            let resolved = dependencies.resolve(&instances)?;
            factory(resolved).map(erase)
        });

        Self {
            dependencies: key_names,
            factory,
        }
    }

    /// 按声明顺序排列的依赖键名
    pub fn dependencies(&self) -> &[&'static str] {
        &self.dependencies
    }

    /// 用按声明顺序解析出的依赖调用工厂
    pub fn invoke(&self, resolved: Vec<Instance>) -> DependencyResult<Instance> {
        (self.factory)(resolved)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("dependencies", &self.dependencies)
            .field("factory", &"<function>")
            .finish()
    }
}

/// 模板
#[derive(Clone)]
pub enum Template {
    /// 固定值，不缓存，也不参与循环检测
    Constant(Instance),
    /// 函数绑定，每次解析都以解析出的依赖重新部分应用
    Function(Binding),
    /// 构造绑定
    Construction {
        binding: Binding,
        lifetime: Lifetime,
        /// 闭合单例依赖环时用于签发前向引用
        forward: Option<ForwardFactory>,
    },
}

impl Template {
    /// 依赖键名，常量没有依赖
    pub fn dependencies(&self) -> &[&'static str] {
        match self {
            Self::Constant(_) => &[],
            Self::Function(binding) | Self::Construction { binding, .. } => binding.dependencies(),
        }
    }

    /// 是否为单例构造绑定
    pub fn is_singleton(&self) -> bool {
        matches!(self, Self::Construction { lifetime, .. } if lifetime.is_singleton())
    }

    /// 闭合依赖环时能否签发前向引用
    pub fn is_deferrable(&self) -> bool {
        matches!(self, Self::Construction { forward: Some(_), .. })
    }

    /// 模板种类名称
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Constant(_) => "constant",
            Self::Function(_) => "function",
            Self::Construction { lifetime, .. } => match lifetime {
                Lifetime::Singleton => "singleton",
                Lifetime::Transient => "transient",
            },
        }
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(_) => f.debug_tuple("Constant").field(&"<value>").finish(),
            Self::Function(binding) => f.debug_tuple("Function").field(binding).finish(),
            Self::Construction {
                binding,
                lifetime,
                forward,
            } => f
                .debug_struct("Construction")
                .field("binding", binding)
                .field("lifetime", lifetime)
                .field("deferrable", &forward.is_some())
                .finish(),
        }
    }
}

/// 注册信息
#[derive(Debug, Clone)]
pub struct Registration {
    key_name: &'static str,
    value_type: &'static str,
    template: Template,
}

impl Registration {
    /// 常量注册
    pub fn constant<T>(key: Key<T>, value: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self::with_template(key, Template::Constant(erase(value)))
    }

    /// 函数绑定注册
    pub fn function<T, D, F>(key: Key<T>, dependencies: D, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D::Resolved) -> DependencyResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::with_template(key, Template::Function(Binding::new(dependencies, factory)))
    }

    /// 构造绑定注册
    pub fn construction<T, D, F>(key: Key<T>, lifetime: Lifetime, dependencies: D, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        D: Dependencies,
        F: Fn(D::Resolved) -> DependencyResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::with_template(
            key,
            Template::Construction {
                binding: Binding::new(dependencies, factory),
                lifetime,
                forward: None,
            },
        )
    }

    /// 可闭合依赖环的单例构造绑定注册
    pub fn deferrable_singleton<T, D, F>(key: Key<T>, dependencies: D, factory: F) -> Self
    where
        T: ?Sized + Deferrable,
        D: Dependencies,
        F: Fn(D::Resolved) -> DependencyResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::with_template(
            key,
            Template::Construction {
                binding: Binding::new(dependencies, factory),
                lifetime: Lifetime::Singleton,
                forward: Some(forward_factory::<T>(key.name())),
            },
        )
    }

    fn with_template<T: ?Sized>(key: Key<T>, template: Template) -> Self {
        Self {
            key_name: key.name(),
            value_type: key.value_type(),
            template,
        }
    }

    /// 键名
    pub fn key_name(&self) -> &'static str {
        self.key_name
    }

    /// 值类型名称
    pub fn value_type(&self) -> &'static str {
        self.value_type
    }

    /// 模板
    pub fn template(&self) -> &Template {
        &self.template
    }
}

/// 模板注册表
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    registrations: HashMap<&'static str, Registration>,
}

impl TemplateRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加注册，键名重复时返回 [`DependencyError::DuplicateKey`]
    pub fn insert(&mut self, registration: Registration) -> DependencyResult<()> {
        if self.registrations.contains_key(registration.key_name) {
            return Err(DependencyError::duplicate_key(registration.key_name));
        }

        self.registrations.insert(registration.key_name, registration);
        Ok(())
    }

    /// 按键名查找
    pub fn get(&self, key_name: &str) -> Option<&Registration> {
        self.registrations.get(key_name)
    }

    /// 是否包含指定键名
    pub fn contains(&self, key_name: &str) -> bool {
        self.registrations.contains_key(key_name)
    }

    /// 注册数量
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// 遍历全部注册
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.values()
    }
}
