//! 依赖路径诊断
//!
//! 将一次解析调用中的祖先链渲染为 `root-->...-->leaf` 形式的字符串

use std::fmt;

/// 路径分隔符
pub const PATH_SEPARATOR: &str = "-->";

/// 依赖路径，按根到叶的顺序保存键名
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DependencyPath {
    keys: Vec<String>,
}

impl DependencyPath {
    /// 从根到叶顺序的键名创建路径
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// 从叶到根顺序的键名创建路径
    pub fn from_leaf_to_root<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        keys.reverse();
        Self { keys }
    }

    /// 路径中的键名
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// 根节点键名
    pub fn root(&self) -> Option<&str> {
        self.keys.first().map(String::as_str)
    }

    /// 叶节点键名
    pub fn leaf(&self) -> Option<&str> {
        self.keys.last().map(String::as_str)
    }

    /// 路径长度
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// 路径是否为空
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Display for DependencyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.keys.join(PATH_SEPARATOR))
    }
}
