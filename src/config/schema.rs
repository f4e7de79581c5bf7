//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Namespace to watch for discovery ConfigMaps (empty or "all" = every namespace)
    #[serde(default)]
    pub namespace: String,

    /// Backlink controller configuration
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// Backlink controller configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ControllerConfig {
    /// Maximum number of ConfigMaps reconciled concurrently
    #[serde(default = "default_workers")]
    pub workers: u16,

    /// Seconds to wait before looking for a Pod that is not visible yet
    #[serde(default = "default_retry_interval_seconds")]
    pub retry_interval_seconds: u64,

    /// Seconds to wait after an API error
    #[serde(default = "default_error_backoff_seconds")]
    pub error_backoff_seconds: u64,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoggerConfig {
    /// Default filter directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_workers() -> u16 {
    4
}

fn default_retry_interval_seconds() -> u64 {
    5
}

fn default_error_backoff_seconds() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            controller: ControllerConfig::default(),
            logger: LoggerConfig::default(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            retry_interval_seconds: default_retry_interval_seconds(),
            error_backoff_seconds: default_error_backoff_seconds(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
