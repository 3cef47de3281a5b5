use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};
use crate::errors::ConfigError;
use crate::logging::LogFormat;

use super::loader::ConfigLoader;

// Environment variable names
pub const ENV_DETECT_CYCLES: &str = "SVC_LOCATOR_DETECT_CYCLES";
pub const ENV_MAX_DEPTH: &str = "SVC_LOCATOR_MAX_DEPTH";
pub const ENV_LOG_LEVEL: &str = "SVC_LOCATOR_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "SVC_LOCATOR_LOG_FORMAT";

pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 64;

/// Container behaviour settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Fail with a circular dependency error instead of recursing forever
    pub detect_cycles: bool,
    /// Maximum nested factory resolutions per thread; 0 disables the limit
    pub max_resolution_depth: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            detect_cycles: true,
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
    pub show_target: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            show_target: true,
        }
    }
}

/// Main Application Configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub container: ContainerConfig,
    pub logging: LoggingSettings,
}

#[derive(Deserialize, Debug, Default)]
struct PartialContainerConfig {
    detect_cycles: Option<bool>,
    max_resolution_depth: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
struct PartialLoggingSettings {
    level: Option<String>,
    format: Option<LogFormat>,
    show_target: Option<bool>,
}

/// Partial Application Configuration for loading from files
#[derive(Deserialize, Debug, Default)]
pub struct PartialAppConfig {
    container: Option<PartialContainerConfig>,
    logging: Option<PartialLoggingSettings>,
}

impl AppConfig {
    /// Load configuration from the default location and environment
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load_config()
    }

    /// Load configuration from an explicit file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        ConfigLoader::with_path(path.to_path_buf()).load_config()
    }

    /// Create AppConfig from partial config and environment; environment wins
    pub fn from_partial_and_env(
        partial: Option<PartialAppConfig>,
        env_map: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let partial = partial.unwrap_or_default();
        let container_partial = partial.container.unwrap_or_default();
        let logging_partial = partial.logging.unwrap_or_default();
        let defaults = AppConfig::default();

        let detect_cycles = match env_map.get(ENV_DETECT_CYCLES) {
            Some(value) => parse_env(ENV_DETECT_CYCLES, value)?,
            None => container_partial
                .detect_cycles
                .unwrap_or(defaults.container.detect_cycles),
        };
        let max_resolution_depth = match env_map.get(ENV_MAX_DEPTH) {
            Some(value) => parse_env(ENV_MAX_DEPTH, value)?,
            None => container_partial
                .max_resolution_depth
                .unwrap_or(defaults.container.max_resolution_depth),
        };
        let level = env_map
            .get(ENV_LOG_LEVEL)
            .cloned()
            .or(logging_partial.level)
            .unwrap_or(defaults.logging.level);
        let format = match env_map.get(ENV_LOG_FORMAT) {
            Some(value) => parse_log_format(value)?,
            None => logging_partial.format.unwrap_or(defaults.logging.format),
        };

        Ok(AppConfig {
            container: ContainerConfig {
                detect_cycles,
                max_resolution_depth,
            },
            logging: LoggingSettings {
                level,
                format,
                show_target: logging_partial
                    .show_target
                    .unwrap_or(defaults.logging.show_target),
            },
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "pretty" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        "compact" => Ok(LogFormat::Compact),
        _ => Err(ConfigError::InvalidEnv {
            name: ENV_LOG_FORMAT.to_string(),
            value: value.to_string(),
        }),
    }
}
