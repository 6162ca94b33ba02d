//! 错误类型定义

use crate::diagnostics::DependencyPath;
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// 创建解析错误
    pub fn parse_error(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::ParseError {
            source: Box::new(source),
        }
    }

    /// 创建验证错误
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

/// 依赖解析错误类型
///
/// 覆盖注册期（重复键）、解析期（缺失、循环、深度超限）以及使用期
/// （前向引用在目标构建完成前被访问）的全部失败情形。
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("键 \"{key_name}\" 已被注册")]
    DuplicateKey { key_name: String },

    #[error("未找到键为 \"{key_name}\" 的可注入项，是否已注册？")]
    MissingInjectable { key_name: String },

    #[error("未找到键为 {key_name} 的服务，依赖图为 {path}")]
    MissingDependency {
        key_name: String,
        path: DependencyPath,
    },

    #[error("解析 \"{key_name}\" 时发现循环依赖 ({cycle})，依赖环中的所有成员必须是单例")]
    CircularDependency {
        key_name: String,
        cycle: DependencyPath,
    },

    #[error("依赖环成员 \"{key_name}\" 在依赖环解析完成之前被另一个成员的构造过程访问")]
    UninitializedPropertyAccess { key_name: String },

    #[error("键 \"{key_name}\" 的值类型不匹配，期望 {expected}")]
    TypeMismatch {
        key_name: String,
        expected: &'static str,
    },

    #[error("依赖环 ({cycle}) 在单例 \"{key_name}\" 处闭合，但该单例的值类型不支持前向引用")]
    ForwardReferenceUnsupported {
        key_name: String,
        cycle: DependencyPath,
    },

    #[error("前向引用 \"{key_name}\" 的目标已被释放")]
    ForwardTargetDropped { key_name: String },

    #[error("前向引用 \"{key_name}\" 已经绑定过目标")]
    ForwardReferenceAlreadyBound { key_name: String },

    #[error("解析 \"{key_name}\" 超出最大解析深度 {max_depth}，依赖图为 {path}")]
    ResolutionDepthExceeded {
        key_name: String,
        max_depth: usize,
        path: DependencyPath,
    },

    #[error("依赖解析失败: {key_name}, 原因: {message}")]
    DependencyResolutionFailed { key_name: String, message: String },

    #[error("组件创建失败: {key_name}, 原因: {source}")]
    ComponentCreationFailed {
        key_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DependencyError {
    /// 创建重复键错误
    pub fn duplicate_key(key_name: impl Into<String>) -> Self {
        Self::DuplicateKey {
            key_name: key_name.into(),
        }
    }

    /// 创建前向引用未初始化访问错误
    pub fn uninitialized(key_name: impl Into<String>) -> Self {
        Self::UninitializedPropertyAccess {
            key_name: key_name.into(),
        }
    }

    /// 创建类型不匹配错误
    pub fn type_mismatch(key_name: impl Into<String>, expected: &'static str) -> Self {
        Self::TypeMismatch {
            key_name: key_name.into(),
            expected,
        }
    }

    /// 包装工厂自身报告的失败
    pub fn creation_failed(
        key_name: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ComponentCreationFailed {
            key_name: key_name.into(),
            source: Box::new(source),
        }
    }

    /// 出错的键名
    pub fn key_name(&self) -> &str {
        match self {
            Self::DuplicateKey { key_name }
            | Self::MissingInjectable { key_name }
            | Self::MissingDependency { key_name, .. }
            | Self::CircularDependency { key_name, .. }
            | Self::UninitializedPropertyAccess { key_name }
            | Self::TypeMismatch { key_name, .. }
            | Self::ForwardReferenceUnsupported { key_name, .. }
            | Self::ForwardTargetDropped { key_name }
            | Self::ForwardReferenceAlreadyBound { key_name }
            | Self::ResolutionDepthExceeded { key_name, .. }
            | Self::DependencyResolutionFailed { key_name, .. }
            | Self::ComponentCreationFailed { key_name, .. } => key_name,
        }
    }

    /// 出错时的依赖路径（如果有）
    pub fn path(&self) -> Option<&DependencyPath> {
        match self {
            Self::MissingDependency { path, .. } | Self::ResolutionDepthExceeded { path, .. } => {
                Some(path)
            }
            Self::CircularDependency { cycle, .. }
            | Self::ForwardReferenceUnsupported { cycle, .. } => Some(cycle),
            _ => None,
        }
    }

    /// 是否为注册期错误
    pub fn is_registration_error(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    /// 是否由前向引用的使用引起
    pub fn is_forward_reference_error(&self) -> bool {
        matches!(
            self,
            Self::UninitializedPropertyAccess { .. }
                | Self::ForwardTargetDropped { .. }
                | Self::ForwardReferenceAlreadyBound { .. }
        )
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
