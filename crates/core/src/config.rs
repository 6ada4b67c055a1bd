//! Configuration management
//!
//! This module loads the optional history-sync configuration file.
//! The file is stored in TOML format at ~/.config/history-sync/config.toml
//! unless another path is given on the command line.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Default number of transfers in flight per batch
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default bucket lookup style
const DEFAULT_BUCKET_LOOKUP: &str = "auto";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Storage endpoint settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Transfer settings
    #[serde(default)]
    pub transfer: TransferConfig,
}

/// Connection settings for the object-storage backend
///
/// Every field is optional; unset values fall back to the AWS SDK's default
/// provider chains (environment, profile, instance metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Custom endpoint URL for S3-compatible services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Bucket lookup style: "auto", "path", or "dns"
    #[serde(default = "default_bucket_lookup")]
    pub bucket_lookup: String,

    /// Access key ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    /// Secret access key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

/// Settings for batch transfers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Maximum number of transfers in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_bucket_lookup() -> String {
    DEFAULT_BUCKET_LOOKUP.to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: None,
            bucket_lookup: default_bucket_lookup(),
            access_key: None,
            secret_key: None,
        }
    }
}

impl StorageConfig {
    /// Check the settings before any client is built
    pub fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.endpoint {
            url::Url::parse(endpoint)?;
        }

        if !matches!(self.bucket_lookup.as_str(), "auto" | "path" | "dns") {
            return Err(Error::Config(format!(
                "Invalid bucket_lookup '{}': expected auto, path or dns",
                self.bucket_lookup
            )));
        }

        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(Error::Config(
                "access_key and secret_key must be set together".into(),
            ));
        }

        Ok(())
    }

    /// Whether requests should use path-style addressing
    pub fn force_path_style(&self) -> bool {
        match self.bucket_lookup.as_str() {
            "path" => true,
            "auto" => self.endpoint.is_some(),
            _ => false,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            storage: StorageConfig::default(),
            transfer: TransferConfig::default(),
        }
    }
}

impl Config {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.storage.validate()?;

        if self.transfer.concurrency == 0 {
            return Err(Error::Config("transfer.concurrency must be at least 1".into()));
        }

        Ok(())
    }
}

/// Configuration manager handles locating and loading the config file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        let config_path = config_dir.join("history-sync").join("config.toml");
        Ok(Self { config_path })
    }

    /// Create a ConfigManager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&content)?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade history-sync.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        config.validate()?;
        Ok(config)
    }
}
