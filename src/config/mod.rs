//! Configuration Management Module
//!
//! Settings are resolved in three layers:
//! - built-in defaults (`FinderConfig::default()`)
//! - an optional TOML file named by `SSHFINDER_CONFIG`
//! - environment overrides (`PORT`, `SSHFINDER_BIND`, `SSHFINDER_COMMAND_TIMEOUT`,
//!   `SSHFINDER_STAGING_DIR`)

pub mod types;

use std::path::Path;

use thiserror::Error;
use tracing::info;

pub use types::FinderConfig;

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "SSHFINDER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl FinderConfig {
    /// Load a config file, falling back to defaults for missing keys
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }

    /// Resolve the full configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => {
                info!("Loading config from {}", path);
                Self::from_file(Path::new(&path))?
            }
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment-style overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(bind) = lookup("SSHFINDER_BIND") {
            self.bind_host = bind;
        }
        if let Some(secs) = lookup("SSHFINDER_COMMAND_TIMEOUT") {
            self.command_timeout_secs = secs.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SSHFINDER_COMMAND_TIMEOUT",
                value: secs.clone(),
            })?;
        }
        if let Some(dir) = lookup("SSHFINDER_STAGING_DIR") {
            self.staging_dir = (!dir.is_empty()).then_some(dir);
        }
        Ok(())
    }
}
