//! Tuning knobs for a device graph.
//!
//! Loaded from the `[graph]` table of a TOML file, every field optional.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Device graph configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGraphConfig {
    /// Upper bound for a single device lookup, in milliseconds.
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    /// Maximum number of devices one graph will hold.
    #[serde(default = "default_max_devices")]
    pub max_devices: usize,
}

fn default_lookup_timeout_ms() -> u64 {
    5000
}

fn default_max_devices() -> usize {
    4096
}

impl Default for DeviceGraphConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: default_lookup_timeout_ms(),
            max_devices: default_max_devices(),
        }
    }
}

impl DeviceGraphConfig {
    /// Parses and validates a TOML document holding the fields at top level.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Lookup timeout as a Duration.
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookup_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "lookup_timeout_ms".to_string(),
                message: "must be > 0".to_string(),
            });
        }
        if self.max_devices == 0 {
            return Err(ConfigError::Invalid {
                field: "max_devices".to_string(),
                message: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DeviceGraphConfig::default();
        assert_eq!(config.lookup_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_devices, 4096);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = DeviceGraphConfig::from_toml_str("lookup_timeout_ms = 250").unwrap();
        assert_eq!(config.lookup_timeout_ms, 250);
        assert_eq!(config.max_devices, 4096);
    }

    #[test]
    fn test_invalid_values() {
        let err = DeviceGraphConfig::from_toml_str("max_devices = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "max_devices"));

        let err = DeviceGraphConfig::from_toml_str("lookup_timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lookup_timeout_ms = 1000\nmax_devices = 600").unwrap();

        let config = DeviceGraphConfig::from_file(file.path()).unwrap();
        assert_eq!(config.lookup_timeout(), Duration::from_secs(1));
        assert_eq!(config.max_devices, 600);

        let err = DeviceGraphConfig::from_file("/nonexistent/graph.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
