use crate::{ConfigError, ConfigErrorResult, DEFAULT_RELOAD_GRACE_SECS, MAX_RELOAD_GRACE_SECS};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Seconds `reload` waits for the old process to exit (0 = no wait)
    pub reload_grace_secs: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            reload_grace_secs: DEFAULT_RELOAD_GRACE_SECS,
        }
    }
}

impl SupervisorConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.reload_grace_secs > MAX_RELOAD_GRACE_SECS {
            return Err(ConfigError::config(format!(
                "supervisor.reload_grace_secs must be 0-{}, got {}",
                MAX_RELOAD_GRACE_SECS, self.reload_grace_secs
            )));
        }

        Ok(())
    }
}
