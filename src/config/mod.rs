//! Configuration system for agent-discovery
//!
//! Layers built-in defaults, an optional YAML file and environment variable
//! overrides into one [`Config`].

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, ControllerConfig, LoggerConfig};

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "namespace" => Ok(config.namespace.clone()),
        "controller.workers" => Ok(config.controller.workers.to_string()),
        "controller.retryIntervalSeconds" => {
            Ok(config.controller.retry_interval_seconds.to_string())
        }
        "controller.errorBackoffSeconds" => Ok(config.controller.error_backoff_seconds.to_string()),
        "logger.level" => Ok(config.logger.level.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}
