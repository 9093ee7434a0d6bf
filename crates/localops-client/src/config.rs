//! Configuration management for the localops client

use localops_crypto::Algorithm;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error
    #[error("io error:: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml parsing error:: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("toml serialization error:: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Unknown key or unparsable value passed to [`ClientConfig::set`]
    #[error("invalid config value:: {0}")]
    InvalidValue(String),
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Algorithm used when key material does not name one
    pub default_key_type: Algorithm,
    /// Verify every fresh signature before returning it
    pub verify_signatures: bool,
    /// Tracing filter, e.g. `warn` or `localops=debug`
    pub log_level: String,
    /// Log output format (text, json)
    pub log_format: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_key_type: Algorithm::Secp256k1,
            verify_signatures: true,
            log_level: "warn".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get default configuration directory
    pub fn default_config_dir() -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            home.join(".localops")
        } else {
            PathBuf::from(".localops")
        }
    }

    /// Get default configuration file path
    pub fn default_config_file() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Load configuration from default location or fall back to defaults
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_file();

        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load an explicit file if given, otherwise the default location
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_or_default(),
        }
    }

    /// Set a configuration value
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "default_key_type" => {
                self.default_key_type = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(format!("key type {value}")))?;
            }
            "verify_signatures" => {
                self.verify_signatures = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(format!("boolean {value}")))?;
            }
            "log_level" => self.log_level = value.to_string(),
            "log_format" => self.log_format = value.to_string(),
            _ => {
                return Err(ConfigError::InvalidValue(format!(
                    "unknown configuration key {key}"
                )));
            }
        }
        Ok(())
    }
}
