use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_ARCHIVE_NAME, DEFAULT_BACKUP_PREFIX,
    DEFAULT_DOWNLOAD_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STAGING_DIR, validate_relative,
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpgradeConfig {
    /// Where the latest release archive is served from
    pub download_url: String,
    /// File name of the downloaded release archive in the installation root
    pub archive_name: String,
    /// Sibling directory the release is extracted into
    pub staging_dir: String,
    pub backup_prefix: String,
    pub request_timeout_secs: u64,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            download_url: String::from(DEFAULT_DOWNLOAD_URL),
            archive_name: String::from(DEFAULT_ARCHIVE_NAME),
            staging_dir: String::from(DEFAULT_STAGING_DIR),
            backup_prefix: String::from(DEFAULT_BACKUP_PREFIX),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl UpgradeConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let url = self.download_url.trim();
        let rest = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"))
            .ok_or_else(|| {
                ConfigError::upgrade(format!(
                    "upgrade.download_url must be an http(s) URL, got {url:?}"
                ))
            })?;
        if rest.is_empty() || rest.starts_with('/') {
            return Err(ConfigError::upgrade(format!(
                "upgrade.download_url has no host: {url:?}"
            )));
        }

        validate_relative("upgrade.archive_name", &self.archive_name)?;
        validate_relative("upgrade.staging_dir", &self.staging_dir)?;

        if self.archive_name.contains('/') || self.staging_dir.contains('/') {
            return Err(ConfigError::upgrade(
                "upgrade.archive_name and upgrade.staging_dir must be plain names",
            ));
        }

        if self.backup_prefix.contains('/') {
            return Err(ConfigError::upgrade(
                "upgrade.backup_prefix must be a plain file name fragment",
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::upgrade(
                "upgrade.request_timeout_secs must be greater than zero",
            ));
        }

        Ok(())
    }
}
