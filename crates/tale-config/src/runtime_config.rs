use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_HEAP_MAX, DEFAULT_HEAP_MIN, DEFAULT_JAVA,
    DEFAULT_PID_FILE, DEFAULT_RUNTIME_LOG, validate_relative,
};

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How the runnable artifact gets launched.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Runtime binary, looked up on PATH when not absolute
    pub java: String,
    /// Passed as `-Xms<heap_min>`
    pub heap_min: String,
    /// Passed as `-Xmx<heap_max>`
    pub heap_max: String,
    /// Output log, relative to the installation directory
    pub log_file: String,
    /// Legacy PID file removed on stop, relative to the installation directory
    pub pid_file: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            java: String::from(DEFAULT_JAVA),
            heap_min: String::from(DEFAULT_HEAP_MIN),
            heap_max: String::from(DEFAULT_HEAP_MAX),
            log_file: String::from(DEFAULT_RUNTIME_LOG),
            pid_file: String::from(DEFAULT_PID_FILE),
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.java.trim().is_empty() {
            return Err(ConfigError::runtime("runtime.java must not be empty"));
        }

        let min = self.heap_min()?;
        let max = self.heap_max()?;
        if min.bytes() > max.bytes() {
            return Err(ConfigError::runtime(format!(
                "runtime.heap_min ({min}) must not exceed runtime.heap_max ({max})"
            )));
        }

        validate_relative("runtime.log_file", &self.log_file)?;
        validate_relative("runtime.pid_file", &self.pid_file)?;

        Ok(())
    }

    pub fn heap_min(&self) -> ConfigErrorResult<HeapSize> {
        self.heap_min.parse()
    }

    pub fn heap_max(&self) -> ConfigErrorResult<HeapSize> {
        self.heap_max.parse()
    }
}

/// A JVM heap size such as `128m` or `2G`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapSize {
    amount: u64,
    unit: Option<char>,
}

impl HeapSize {
    pub fn bytes(&self) -> u64 {
        let multiplier: u64 = match self.unit {
            Some('k') => 1 << 10,
            Some('m') => 1 << 20,
            Some('g') => 1 << 30,
            _ => 1,
        };
        self.amount.saturating_mul(multiplier)
    }
}

impl FromStr for HeapSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (digits, unit) = match s.char_indices().last() {
            Some((idx, c)) if c.is_ascii_alphabetic() => {
                (&s[..idx], Some(c.to_ascii_lowercase()))
            }
            _ => (s, None),
        };

        if let Some(unit) = unit
            && !matches!(unit, 'k' | 'm' | 'g')
        {
            return Err(ConfigError::runtime(format!(
                "heap size unit must be k, m or g, got {s:?}"
            )));
        }

        let amount: u64 = digits
            .parse()
            .map_err(|_| ConfigError::runtime(format!("invalid heap size {s:?}")))?;

        if amount == 0 {
            return Err(ConfigError::runtime("heap size must be greater than zero"));
        }

        Ok(Self { amount, unit })
    }
}

impl fmt::Display for HeapSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Some(unit) => write!(f, "{}{}", self.amount, unit),
            None => write!(f, "{}", self.amount),
        }
    }
}
