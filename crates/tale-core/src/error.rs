use std::panic::Location;
use std::path::{Path, PathBuf};

use error_location::ErrorLocation;
use tale_config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaleError {
    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to {action} {path}: {source} {location}")]
    FileSystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("No runnable artifact found in {dir} {location}")]
    ArtifactNotFound {
        dir: PathBuf,
        location: ErrorLocation,
    },

    #[error("Process table query failed: {message} {location}")]
    ProcessQuery {
        message: String,
        location: ErrorLocation,
    },

    #[error("Failed to spawn {program}: {source} {location}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to signal pid {pid}: {message} {location}")]
    Signal {
        pid: u32,
        message: String,
        location: ErrorLocation,
    },

    #[error("Archive error on {path}: {source} {location}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
        location: ErrorLocation,
    },

    #[error("HTTP error: {source} {location}")]
    Http {
        #[source]
        source: reqwest::Error,
        location: ErrorLocation,
    },

    #[error("Download of {url} failed with HTTP {status} {location}")]
    DownloadStatus {
        url: String,
        status: u16,
        location: ErrorLocation,
    },

    #[error("Release archive is invalid: {message} {location}")]
    InvalidRelease {
        message: String,
        location: ErrorLocation,
    },

    #[error("Another '{operation}' is in progress (pid {pid}, lock file: {path}) {location}")]
    OperationInProgress {
        operation: String,
        pid: u32,
        path: PathBuf,
        location: ErrorLocation,
    },

    #[error("Failed to acquire lock at {path}: {source} {location}")]
    LockAcquisition {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error(
        "A previous upgrade was interrupted during '{step}' (marker: {marker}, backup: {backup}) {location}"
    )]
    InterruptedUpgrade {
        marker: PathBuf,
        backup: String,
        step: String,
        location: ErrorLocation,
    },

    #[error("Configuration error: {source} {location}")]
    Config {
        #[source]
        source: ConfigError,
        location: ErrorLocation,
    },
}

impl TaleError {
    /// Filesystem failure with the action and path that failed
    #[track_caller]
    pub fn fs(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::FileSystem {
            action,
            path: path.to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn process_query<S: Into<String>>(message: S) -> Self {
        Self::ProcessQuery {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn archive(path: &Path, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_release<S: Into<String>>(message: S) -> Self {
        Self::InvalidRelease {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn signal<S: Into<String>>(pid: u32, message: S) -> Self {
        Self::Signal {
            pid,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::ArtifactNotFound { .. } => {
                "No tale*.jar was found in the installation directory. \
                   Check install.home or run `tale upgrade` to fetch a release."
            }
            Self::ProcessQuery { .. } => {
                "The process table could not be read. \
                   Check that this platform exposes process information to the current user."
            }
            Self::ProcessSpawn { .. } => {
                "The runtime could not be launched. \
                   Check that runtime.java points at an installed Java runtime."
            }
            Self::Signal { .. } => {
                "The running instance could not be signalled. \
                   Check that it is owned by the current user."
            }
            Self::Http { .. } | Self::DownloadStatus { .. } => {
                "The release could not be downloaded. \
                   Check network access and upgrade.download_url, then retry the upgrade."
            }
            Self::Archive { .. } | Self::InvalidRelease { .. } => {
                "The archive could not be processed. \
                   The installation was not modified; retry the upgrade."
            }
            Self::OperationInProgress { .. } => {
                "Another tale command is running against this installation. \
                   Wait for it to finish; delete the lock file only if that process is gone."
            }
            Self::LockAcquisition { .. } => {
                "Unable to create lock file. \
                   Check file permissions in the config directory."
            }
            Self::InterruptedUpgrade { .. } => {
                "The installation may mix old and new files. \
                   Restore `resources` from the named backup, reinstall lib and the jar, \
                   then delete the marker file."
            }
            Self::Config { .. } => {
                "Configuration file has invalid settings. \
                   Fix config.toml or the TALE_* environment variables."
            }
            Self::Io { .. } | Self::FileSystem { .. } => {
                "A filesystem operation failed. \
                   Check permissions and free disk space in the installation directory."
            }
        }
    }
}

impl From<std::io::Error> for TaleError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for TaleError {
    #[track_caller]
    fn from(source: reqwest::Error) -> Self {
        Self::Http {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for TaleError {
    #[track_caller]
    fn from(source: ConfigError) -> Self {
        Self::Config {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TaleError>;
