//! Configuration file
//!
//! ```json
//! {
//!   "log_level": "INFO",
//!   "resource_prefix": "resource",
//!   "resource": {
//!     "use_dewey_ids": true,
//!     "use_text_compression": true,
//!     "build_path_summary": true
//!   }
//! }
//! ```
//!
//! Every field is optional.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event, Event, Logger, Severity};
use crate::storage::ResourceOptions;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings every collection opened by one registry shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSettings {
    /// Name prefix of resources created by `add`
    #[serde(default = "default_resource_prefix")]
    pub resource_prefix: String,

    /// Options for resources created by `add`
    #[serde(default)]
    pub resource: ResourceOptions,
}

fn default_resource_prefix() -> String {
    "resource".to_string()
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            resource_prefix: default_resource_prefix(),
            resource: ResourceOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChronoConfig {
    /// Minimum severity written to the log
    #[serde(default = "default_log_level")]
    pub log_level: Severity,

    #[serde(flatten)]
    pub collection: CollectionSettings,
}

fn default_log_level() -> Severity {
    Severity::Info
}

impl Default for ChronoConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            collection: CollectionSettings::default(),
        }
    }
}

impl ChronoConfig {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: ChronoConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.collection.resource_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "resource_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies process-wide settings.
    pub fn apply(&self) {
        Logger::set_min_severity(self.log_level);
        log_event(
            Event::ConfigLoaded,
            &[
                ("log_level", self.log_level.as_str()),
                ("resource_prefix", &self.collection.resource_prefix),
            ],
        );
    }
}
