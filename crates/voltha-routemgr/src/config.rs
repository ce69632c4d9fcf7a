//! Configuration file support for routemgrd
//!
//! Loads and validates routemgrd configuration from TOML files.
//! Default location: /etc/voltha/routemgrd.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use voltha_graph::{ConfigError, DeviceGraphConfig};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/voltha/routemgrd.toml";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Complete routemgrd configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMgrConfig {
    /// Device graph tuning
    #[serde(default)]
    pub graph: DeviceGraphConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RouteMgrConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` if it exists, defaults otherwise
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.graph.validate()?;
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "logging.level".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
