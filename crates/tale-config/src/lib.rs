mod config;
mod error;
mod install_config;
mod log_level;
mod logging_config;
mod runtime_config;
mod supervisor_config;
mod upgrade_config;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use install_config::InstallConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use runtime_config::{HeapSize, RuntimeConfig};
pub use supervisor_config::SupervisorConfig;
pub use upgrade_config::UpgradeConfig;

pub const CONFIG_DIR_ENV: &str = "TALE_CONFIG_DIR";
pub const DEFAULT_CONFIG_DIR: &str = ".tale-cli";
pub const CONFIG_FILENAME: &str = "config.toml";

// Install
const DEFAULT_HOME: &str = ".";
const DEFAULT_ARTIFACT_PREFIX: &str = "tale";
const DEFAULT_ARTIFACT_SUFFIX: &str = ".jar";

// Runtime
const DEFAULT_JAVA: &str = "java";
const DEFAULT_HEAP_MIN: &str = "128m";
const DEFAULT_HEAP_MAX: &str = "128m";
const DEFAULT_RUNTIME_LOG: &str = "tale.log";
const DEFAULT_PID_FILE: &str = "resources/tale.pid";

// Supervisor
const DEFAULT_RELOAD_GRACE_SECS: u64 = 0;
const MAX_RELOAD_GRACE_SECS: u64 = 300;

// Upgrade
const DEFAULT_ARCHIVE_NAME: &str = "tale-least.zip";
const DEFAULT_DOWNLOAD_URL: &str = "http://7xls9k.dl1.z0.glb.clouddn.com/tale-least.zip";
const DEFAULT_STAGING_DIR: &str = "tale-upgrade";
const DEFAULT_BACKUP_PREFIX: &str = "tale_backup_";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

// Logging
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_FILE: &str = "tale-cli.log";
const DEFAULT_LOG_COLORED: bool = true;

/// Reject empty names, absolute paths and anything climbing out with `..`.
pub(crate) fn validate_relative(key: &str, value: &str) -> ConfigErrorResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::config(format!("{key} must not be empty")));
    }

    let path = std::path::Path::new(value);
    if path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(ConfigError::config(format!(
            "{key} must be relative and cannot contain '..', got {value}"
        )));
    }

    Ok(())
}
