//! File-based configuration loading (YAML or JSON)

use std::fs;
use std::path::Path;

use super::types::LoggerConfig;

/// Errors that can occur while loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl LoggerConfig {
    /// Parse a config from YAML; missing keys take their defaults
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        // An empty document deserializes as null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a config from JSON; missing keys take their defaults
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Load a `LoggerConfig` from disk
///
/// `.json` files are read as JSON; every other extension as YAML.
///
/// # Example
///
/// ```no_run
/// use modlog_core::config::load_config;
///
/// let config = load_config("/etc/myapp/logging.yaml")?;
/// # Ok::<(), modlog_core::config::ConfigError>(())
/// ```
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<LoggerConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        LoggerConfig::from_json_str(&content)
    } else {
        LoggerConfig::from_yaml_str(&content)
    }
}
