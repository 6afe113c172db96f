use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_ARTIFACT_PREFIX, DEFAULT_ARTIFACT_SUFFIX,
    DEFAULT_HOME,
};

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Installation directory holding the artifact, `lib/` and `resources/`
    pub home: String,
    pub artifact_prefix: String,
    pub artifact_suffix: String,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            home: String::from(DEFAULT_HOME),
            artifact_prefix: String::from(DEFAULT_ARTIFACT_PREFIX),
            artifact_suffix: String::from(DEFAULT_ARTIFACT_SUFFIX),
        }
    }
}

impl InstallConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.home.trim().is_empty() {
            return Err(ConfigError::config("install.home must not be empty"));
        }

        if self.artifact_prefix.is_empty() || self.artifact_suffix.is_empty() {
            return Err(ConfigError::config(
                "install.artifact_prefix and install.artifact_suffix must not be empty",
            ));
        }

        if self.artifact_prefix.contains('/') || self.artifact_suffix.contains('/') {
            return Err(ConfigError::config(
                "artifact prefix/suffix must be plain file name fragments",
            ));
        }

        Ok(())
    }

    pub fn home_path(&self) -> PathBuf {
        PathBuf::from(&self.home)
    }
}
