//! 解析引擎
//!
//! 每次顶层解析都从根节点开始递归解析依赖。单例在首次构建成功后缓存；
//! 只由单例组成的依赖环在闭合处交出前向引用，待该单例构建完成后绑定。
//!
//! 状态锁只在读写缓存和待绑定列表时持有，工厂调用期间不持锁，
//! 因此工厂可以重入容器。

use di_abstractions::{
    downcast_instance, ComponentResolver, ContainerConfig, ContainerStats, DependencyGraphNode,
    ForwardFactory, Instance, Key, PendingForward, Registration, Template, TemplateRegistry,
};
use infrastructure_common::{DependencyError, DependencyPath, DependencyResult};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// 引擎内部可变状态
#[derive(Default)]
struct ResolutionState {
    /// 单例缓存，构建容器时为每个单例键创建空槽位
    singletons: HashMap<&'static str, Option<Instance>>,
    /// 按键名登记的待绑定前向引用
    pending: HashMap<&'static str, Vec<PendingForward>>,
    /// 至少完整构建过一次的单例键
    resolved: HashSet<&'static str>,
}

/// 依赖注入容器
pub struct Container {
    registry: TemplateRegistry,
    config: ContainerConfig,
    state: Mutex<ResolutionState>,
}

impl Container {
    pub(crate) fn new(registry: TemplateRegistry, config: ContainerConfig) -> Self {
        let singletons = registry
            .iter()
            .filter(|registration| registration.template().is_singleton())
            .map(|registration| (registration.key_name(), None))
            .collect();

        Self {
            registry,
            config,
            state: Mutex::new(ResolutionState {
                singletons,
                ..ResolutionState::default()
            }),
        }
    }

    /// 按类型化键解析
    pub fn get<T>(&self, key: &Key<T>) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let instance = self.resolve_by_name(key.name())?;
        downcast_instance(key.name(), &instance)
    }

    /// 按键名解析，返回类型擦除的实例
    pub fn resolve_by_name(&self, name: &str) -> DependencyResult<Instance> {
        let root = DependencyGraphNode::root(name, self.is_singleton(name));
        self.resolve_node(&root)
    }

    /// 检查键名是否已注册
    pub fn can_resolve(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// 检查键名是否注册为单例
    pub fn is_singleton(&self, name: &str) -> bool {
        self.registry
            .get(name)
            .is_some_and(|registration| registration.template().is_singleton())
    }

    /// 已注册的键名，按字典序排列
    pub fn registered_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.registry.iter().map(Registration::key_name).collect();
        keys.sort_unstable();
        keys
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 统计信息
    pub fn stats(&self) -> ContainerStats {
        let state = self.state.lock();
        ContainerStats {
            registered_templates: self.registry.len(),
            singleton_templates: state.singletons.len(),
            built_singletons: state.resolved.len(),
            pending_forward_references: state.pending.values().map(Vec::len).sum(),
        }
    }

    fn resolve_node(&self, node: &DependencyGraphNode<'_>) -> DependencyResult<Instance> {
        let key_name = node.key_name();
        if self.config.trace_resolution {
            trace!(key = key_name, depth = node.depth(), singleton = node.is_singleton(), "解析节点");
        }

        if let Some(instance) = self.cached_singleton(key_name) {
            return Ok(instance);
        }

        if let Some(max_depth) = self.config.max_resolution_depth {
            if node.depth() > max_depth {
                return Err(DependencyError::ResolutionDepthExceeded {
                    key_name: key_name.to_string(),
                    max_depth,
                    path: node.path(),
                });
            }
        }

        let Some(registration) = self.registry.get(key_name) else {
            return Err(node.missing_error());
        };

        let (binding, forward) = match registration.template() {
            Template::Constant(value) => return Ok(Arc::clone(value)),
            Template::Function(binding) => (binding, None),
            Template::Construction { binding, forward, .. } => (binding, forward.as_ref()),
        };

        if let Some(instance) = self.resolved_once(key_name) {
            return Ok(instance);
        }
        if let Some(cycle) = node.singleton_cycle()? {
            return self.issue_forward(registration, forward, cycle);
        }

        let mut dependencies = Vec::with_capacity(binding.dependencies().len());
        for &dependency in binding.dependencies() {
            let child = node.child(dependency, self.is_singleton(dependency));
            dependencies.push(self.resolve_node(&child)?);
        }

        let instance = binding.invoke(dependencies)?;
        if registration.template().is_singleton() {
            self.commit_singleton(registration.key_name(), instance)
        } else {
            Ok(instance)
        }
    }

    fn cached_singleton(&self, key_name: &str) -> Option<Instance> {
        self.state.lock().singletons.get(key_name).cloned().flatten()
    }

    fn resolved_once(&self, key_name: &str) -> Option<Instance> {
        let state = self.state.lock();
        if !state.resolved.contains(key_name) {
            return None;
        }
        state.singletons.get(key_name).cloned().flatten()
    }

    fn issue_forward(
        &self,
        registration: &Registration,
        forward: Option<&ForwardFactory>,
        cycle: DependencyPath,
    ) -> DependencyResult<Instance> {
        let key_name = registration.key_name();
        let Some(forward) = forward else {
            return Err(DependencyError::ForwardReferenceUnsupported {
                key_name: key_name.to_string(),
                cycle,
            });
        };

        let (stand_in, pending) = forward();
        self.state.lock().pending.entry(key_name).or_default().push(pending);

        debug!(key = key_name, cycle = %cycle, "签发前向引用");
        Ok(stand_in)
    }

    fn commit_singleton(&self, key_name: &'static str, instance: Instance) -> DependencyResult<Instance> {
        let (committed, pending) = {
            let mut state = self.state.lock();
            // 并发构建时先提交者胜出
            let committed = Arc::clone(
                state
                    .singletons
                    .entry(key_name)
                    .or_insert(None)
                    .get_or_insert_with(|| instance),
            );
            let pending = state.pending.remove(key_name).unwrap_or_default();
            state.resolved.insert(key_name);
            (committed, pending)
        };

        // 列表已整体取出，单个绑定失败时其余引用仍需绑定
        let bound = pending.len();
        let mut first_error = None;
        for bind in pending {
            if let Err(error) = bind(&committed) {
                warn!(key = key_name, error = %error, "前向引用绑定失败");
                first_error.get_or_insert(error);
            }
        }

        debug!(key = key_name, forward_references = bound, "单例已提交");
        match first_error {
            Some(error) => Err(error),
            None => Ok(committed),
        }
    }
}

impl ComponentResolver for Container {
    fn resolve_by_name(&self, name: &str) -> DependencyResult<Instance> {
        Container::resolve_by_name(self, name)
    }

    fn can_resolve(&self, name: &str) -> bool {
        Container::can_resolve(self, name)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered_keys", &self.registered_keys())
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
