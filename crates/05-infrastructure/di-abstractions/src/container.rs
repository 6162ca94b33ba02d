//! 容器配置与统计
//!
//! 配置通过 `config` crate 加载：可选的配置文件，叠加 `DI_` 前缀的环境变量。

use infrastructure_common::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "DI";

/// 容器配置
///
/// 默认不限制解析深度：无环依赖图总能解析，循环由依赖环检测终止。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 最大解析深度，根节点深度为 0；`None` 表示不限制
    pub max_resolution_depth: Option<usize>,
    /// 是否为每个解析节点输出 trace 日志
    pub trace_resolution: bool,
}

impl ContainerConfig {
    /// 从配置文件和环境变量加载
    ///
    /// 文件不存在时只使用环境变量和默认值。
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::load_layered(Some(path.as_ref()), Self::environment())
    }

    /// 仅从环境变量加载
    pub fn from_env() -> ConfigResult<Self> {
        Self::load_layered(None, Self::environment())
    }

    fn load_layered(path: Option<&Path>, environment: config::Environment) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            if !path.exists() {
                warn!("容器配置文件不存在，使用默认配置: {}", path.display());
            }
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(environment)
            .build()
            .map_err(ConfigError::parse_error)?;

        Self::from_settings(&settings)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == Some(0) {
            return Err(ConfigError::validation_error("max_resolution_depth 必须大于 0"));
        }
        Ok(())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .try_parsing(true)
    }

    fn from_settings(settings: &config::Config) -> ConfigResult<Self> {
        let config: Self = settings
            .clone()
            .try_deserialize()
            .map_err(ConfigError::parse_error)?;

        config.validate()?;
        debug!(
            max_resolution_depth = ?config.max_resolution_depth,
            trace_resolution = config.trace_resolution,
            "容器配置已加载"
        );
        Ok(config)
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerStats {
    /// 已注册模板数量
    pub registered_templates: usize,
    /// 单例模板数量
    pub singleton_templates: usize,
    /// 已构建的单例数量
    pub built_singletons: usize,
    /// 尚未绑定的前向引用数量
    pub pending_forward_references: usize,
}
