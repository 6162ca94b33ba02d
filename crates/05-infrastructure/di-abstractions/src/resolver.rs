//! 组件解析器抽象接口
//!
//! 提供依赖图节点（用于循环检测与诊断路径）以及按名称解析的能力

use crate::factory::{downcast_instance, Instance};
use crate::key::Key;
use infrastructure_common::{DependencyError, DependencyPath, DependencyResult};
use std::sync::Arc;

/// 组件解析器 trait
///
/// 只需要按名称访问容器的调用方依赖此 trait
pub trait ComponentResolver: Send + Sync {
    /// 按键名解析，返回类型擦除的实例
    fn resolve_by_name(&self, name: &str) -> DependencyResult<Instance>;

    /// 检查是否可以解析指定名称的组件
    fn can_resolve(&self, name: &str) -> bool;

    /// 按类型化键解析
    fn resolve<T>(&self, key: &Key<T>) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
        Self: Sized,
    {
        let instance = self.resolve_by_name(key.name())?;
        downcast_instance(key.name(), &instance)
    }
}

/// 依赖图节点
///
/// 每次顶层解析调用都会重新构建一条祖先链，节点借用其父节点，
/// 随调用栈展开而销毁。
#[derive(Debug, Clone, Copy)]
pub struct DependencyGraphNode<'a> {
    key_name: &'a str,
    is_singleton: bool,
    parent: Option<&'a DependencyGraphNode<'a>>,
}

impl<'a> DependencyGraphNode<'a> {
    /// 创建根节点
    pub fn root(key_name: &'a str, is_singleton: bool) -> Self {
        Self {
            key_name,
            is_singleton,
            parent: None,
        }
    }

    /// 创建以当前节点为父节点的子节点
    pub fn child(&'a self, key_name: &'a str, is_singleton: bool) -> Self {
        Self {
            key_name,
            is_singleton,
            parent: Some(self),
        }
    }

    /// 键名
    pub fn key_name(&self) -> &'a str {
        self.key_name
    }

    /// 遍历到此节点时该键是否为单例
    pub fn is_singleton(&self) -> bool {
        self.is_singleton
    }

    /// 父节点
    pub fn parent(&self) -> Option<&'a DependencyGraphNode<'a>> {
        self.parent
    }

    /// 是否为根节点
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// 从父节点开始向根遍历的祖先
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors { next: self.parent }
    }

    /// 节点深度，根节点为 0
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// 从根到当前节点的路径
    pub fn path(&self) -> DependencyPath {
        DependencyPath::from_leaf_to_root(
            std::iter::once(self.key_name).chain(self.ancestors().map(|node| node.key_name)),
        )
    }

    /// 检查当前节点是否闭合了一个依赖环
    ///
    /// 沿祖先链查找同名节点。找到时，如果从先前出现处到当前节点（含两端）
    /// 全部为单例，返回该环的路径，该环可以通过前向引用打破；否则返回
    /// [`DependencyError::CircularDependency`]。未找到时返回 `Ok(None)`。
    pub fn singleton_cycle(&self) -> DependencyResult<Option<DependencyPath>> {
        let mut only_singletons = self.is_singleton;
        let mut span = vec![self.key_name];

        for ancestor in self.ancestors() {
            only_singletons &= ancestor.is_singleton;
            span.push(ancestor.key_name);

            if ancestor.key_name == self.key_name {
                let cycle = DependencyPath::from_leaf_to_root(span);
                if !only_singletons {
                    return Err(DependencyError::CircularDependency {
                        key_name: self.key_name.to_string(),
                        cycle,
                    });
                }
                return Ok(Some(cycle));
            }
        }

        Ok(None)
    }

    /// 以当前节点为叶，构造“依赖缺失”错误
    ///
    /// 根节点缺失报告 [`DependencyError::MissingInjectable`]，嵌套节点缺失
    /// 报告携带完整路径的 [`DependencyError::MissingDependency`]。
    pub fn missing_error(&self) -> DependencyError {
        if self.is_root() {
            DependencyError::MissingInjectable {
                key_name: self.key_name.to_string(),
            }
        } else {
            DependencyError::MissingDependency {
                key_name: self.key_name.to_string(),
                path: self.path(),
            }
        }
    }
}

/// 祖先节点迭代器
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    next: Option<&'a DependencyGraphNode<'a>>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a DependencyGraphNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.parent;
        Some(node)
    }
}
