use crate::{DEFAULT_LOG_COLORED, DEFAULT_LOG_FILE, DEFAULT_LOG_LEVEL, LogLevel};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Log file name inside the config directory. Empty = stderr.
    pub file: String,
    /// Colored stderr output (ignored when logging to a file)
    pub colored: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel(DEFAULT_LOG_LEVEL),
            file: String::from(DEFAULT_LOG_FILE),
            colored: DEFAULT_LOG_COLORED,
        }
    }
}

impl LoggingConfig {
    pub fn file_name(&self) -> Option<&str> {
        let name = self.file.trim();
        (!name.is_empty()).then_some(name)
    }
}
