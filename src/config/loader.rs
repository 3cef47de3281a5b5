use std::{collections::HashMap, env, fs, path::{Path, PathBuf}};
use crate::errors::ConfigError;

use super::app_config::{
    AppConfig, PartialAppConfig,
    ENV_DETECT_CYCLES, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_MAX_DEPTH,
};

pub const CONFIG_DIR_NAME: &str = "svc-locator";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration loader responsible for loading config from files and environment
pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader using the user config directory
    pub fn new() -> Self {
        Self { path: None }
    }

    /// Create a config loader reading an explicit file
    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Load complete application configuration
    ///
    /// A missing file is not an error: defaults and environment apply.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let partial_config = match self.config_path() {
            Some(path) => self.load_partial_config(&path)?,
            None => None,
        };

        let env_map = self.collect_env_vars();

        AppConfig::from_partial_and_env(partial_config, env_map)
    }

    /// Resolved config file path, if one can be determined
    pub fn config_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(path) => Some(path.clone()),
            None => dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)),
        }
    }

    fn load_partial_config(&self, config_path: &Path) -> Result<Option<PartialAppConfig>, ConfigError> {
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(None);
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            ConfigError::FileRead(config_path.to_string_lossy().to_string(), e)
        })?;

        let partial_config: PartialAppConfig = toml::from_str(&content).map_err(|e| {
            ConfigError::TomlParse(config_path.to_string_lossy().to_string(), e)
        })?;

        Ok(Some(partial_config))
    }

    /// Collect relevant environment variables
    fn collect_env_vars(&self) -> HashMap<String, String> {
        let env_keys = [ENV_DETECT_CYCLES, ENV_MAX_DEPTH, ENV_LOG_LEVEL, ENV_LOG_FORMAT];

        let mut env_map = HashMap::new();
        for key in &env_keys {
            if let Ok(value) = env::var(key) {
                env_map.insert(key.to_string(), value);
            }
        }
        env_map
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
