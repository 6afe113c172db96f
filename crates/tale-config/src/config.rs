use crate::{
    CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult, DEFAULT_CONFIG_DIR,
    InstallConfig, LoggingConfig, RuntimeConfig, SupervisorConfig, UpgradeConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub install: InstallConfig,
    pub runtime: RuntimeConfig,
    pub supervisor: SupervisorConfig,
    pub upgrade: UpgradeConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for TALE_CONFIG_DIR env var, else use ./.tale-cli/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply TALE_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(&config_dir)
    }

    /// Load from an explicit config directory.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory. It also holds the lock, the upgrade
    /// marker and the tool's own log.
    /// Priority: TALE_CONFIG_DIR env var > ./.tale-cli/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.install.validate()?;
        self.runtime.validate()?;
        self.supervisor.validate()?;
        self.upgrade.validate()?;

        if let Some(file) = self.logging.file_name() {
            crate::validate_relative("logging.file", file)?;
        }

        Ok(())
    }

    /// Absolute path of the tool's own log file, if file logging is enabled.
    pub fn log_file_path(&self) -> ConfigErrorResult<Option<PathBuf>> {
        match self.logging.file_name() {
            Some(name) => Ok(Some(Self::config_dir()?.join(name))),
            None => Ok(None),
        }
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  install: {} ({}*{})",
            self.install.home, self.install.artifact_prefix, self.install.artifact_suffix
        );
        info!(
            "  runtime: {} -Xms{} -Xmx{} > {}",
            self.runtime.java, self.runtime.heap_min, self.runtime.heap_max, self.runtime.log_file
        );
        info!(
            "  supervisor: reload_grace={}s",
            self.supervisor.reload_grace_secs
        );
        info!(
            "  upgrade: {} -> {} (staging {}, timeout {}s)",
            self.upgrade.download_url,
            self.upgrade.archive_name,
            self.upgrade.staging_dir,
            self.upgrade.request_timeout_secs
        );
        info!(
            "  logging: {} (file: {})",
            self.logging.level,
            self.logging.file_name().unwrap_or("stderr")
        );
    }

    fn apply_env_overrides(&mut self) {
        // Install
        Self::apply_env_string("TALE_HOME", &mut self.install.home);
        Self::apply_env_string("TALE_ARTIFACT_PREFIX", &mut self.install.artifact_prefix);
        Self::apply_env_string("TALE_ARTIFACT_SUFFIX", &mut self.install.artifact_suffix);

        // Runtime
        Self::apply_env_string("TALE_JAVA", &mut self.runtime.java);
        Self::apply_env_string("TALE_HEAP_MIN", &mut self.runtime.heap_min);
        Self::apply_env_string("TALE_HEAP_MAX", &mut self.runtime.heap_max);
        Self::apply_env_string("TALE_RUNTIME_LOG", &mut self.runtime.log_file);
        Self::apply_env_string("TALE_PID_FILE", &mut self.runtime.pid_file);

        // Supervisor
        Self::apply_env_parse(
            "TALE_RELOAD_GRACE_SECS",
            &mut self.supervisor.reload_grace_secs,
        );

        // Upgrade
        Self::apply_env_string("TALE_DOWNLOAD_URL", &mut self.upgrade.download_url);
        Self::apply_env_string("TALE_ARCHIVE_NAME", &mut self.upgrade.archive_name);
        Self::apply_env_string("TALE_STAGING_DIR", &mut self.upgrade.staging_dir);
        Self::apply_env_string("TALE_BACKUP_PREFIX", &mut self.upgrade.backup_prefix);
        Self::apply_env_parse(
            "TALE_REQUEST_TIMEOUT_SECS",
            &mut self.upgrade.request_timeout_secs,
        );

        // Logging
        Self::apply_env_parse("TALE_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_string("TALE_LOG_FILE", &mut self.logging.file);
        Self::apply_env_bool("TALE_LOG_COLORED", &mut self.logging.colored);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }
}
