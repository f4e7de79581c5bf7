//! Configuration file location

use std::path::PathBuf;

use directories::{BaseDirs, ProjectDirs};

/// Environment variable overriding the configuration directory
pub const ENV_CONFIG_DIR: &str = "AGENT_DISCOVERY_CONFIG_DIR";

const APP_NAME: &str = "agent-discovery";

/// Get the configuration directory path
///
/// Resolution order:
/// 1. `AGENT_DISCOVERY_CONFIG_DIR`
/// 2. `$XDG_CONFIG_HOME/agent-discovery` on Unix, `~/.config/agent-discovery`
///    when only a home directory is known
/// 3. The platform project config directory (Windows AppData)
/// 4. `./.config/agent-discovery`
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(ENV_CONFIG_DIR) {
        return PathBuf::from(dir);
    }

    if cfg!(unix) {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().join(".config")));
        if let Some(base) = base {
            return base.join(APP_NAME);
        }
    }

    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}
