//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding `namespace`
pub const ENV_NAMESPACE: &str = "AGENT_DISCOVERY_NAMESPACE";
/// Environment variable overriding `controller.workers`
pub const ENV_WORKERS: &str = "AGENT_DISCOVERY_WORKERS";
/// Environment variable overriding `logger.level`
pub const ENV_LOG_LEVEL: &str = "AGENT_DISCOVERY_LOG_LEVEL";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Config file (`path`, or the root config if it exists)
    /// 3. Built-in defaults
    ///
    /// An explicit `path` that does not exist is an error; a missing root
    /// config is not.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let config = match path {
            Some(path) => Self::load_file(path)?,
            None => {
                let root = paths::root_config_path();
                if root.exists() {
                    Self::load_file(&root)?
                } else {
                    Self::load_defaults()
                }
            }
        };

        let config = Self::apply_env_overrides(config)?;
        Self::check(&config)?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        // An empty file means "all defaults"
        if contents.trim().is_empty() {
            return Ok(Self::load_defaults());
        }

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration by loading and checking for errors
    ///
    /// Fails on invalid YAML, unknown keys, wrong value types, a zero worker
    /// count or an unparsable log filter.
    pub fn validate(path: Option<&Path>) -> Result<()> {
        Self::load(path).context("Failed to load configuration")?;
        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Check values that parse but cannot be used
    pub fn check(config: &Config) -> Result<()> {
        if config.controller.workers == 0 {
            return Err(anyhow::anyhow!("controller.workers must be at least 1"));
        }
        EnvFilter::try_new(&config.logger.level)
            .with_context(|| format!("Invalid logger.level: {}", config.logger.level))?;
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Result<Config> {
        if let Ok(namespace) = std::env::var(ENV_NAMESPACE) {
            config.namespace = namespace;
        }

        if let Ok(workers) = std::env::var(ENV_WORKERS) {
            config.controller.workers = workers
                .parse()
                .with_context(|| format!("{ENV_WORKERS} must be a number, got '{workers}'"))?;
        }

        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            config.logger.level = level;
        }

        Ok(config)
    }
}
