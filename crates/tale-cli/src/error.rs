use tale_config::ConfigError;
use tale_core::TaleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tale(#[from] TaleError),

    #[error("Failed to initialize logger: {message}")]
    Logger { message: String },
}

impl CliError {
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Config(_) => {
                "Fix config.toml in the config directory (TALE_CONFIG_DIR, default ./.tale-cli) \
                   or the TALE_* environment variables."
            }
            Self::Tale(e) => e.recovery_hint(),
            Self::Logger { .. } => {
                "Check that logging.file is writable, or set it to an empty string to log to stderr."
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
