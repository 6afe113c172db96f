//! Durable record of an upgrade whose merge has started.

use crate::{TaleError, TaleResult};

use std::io::{ErrorKind, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};

use error_location::ErrorLocation;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

const MARKER_FILENAME: &str = "upgrade.marker";
const UNKNOWN: &str = "unknown";

/// Written before the first destructive rename and removed only after
/// cleanup. If it survives, the installation may be in a mixed state and
/// every mutating command refuses to run until an operator clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeMarker {
    pub started_at: String,
    /// Backup archive file name, for manual restore
    pub backup: String,
    pub from_artifact: Option<String>,
    pub to_artifact: String,
    /// Entry being replaced when the marker was last written
    pub step: String,
}

impl UpgradeMarker {
    pub fn new(backup: &str, from_artifact: Option<String>, to_artifact: &str) -> Self {
        Self {
            started_at: chrono::Utc::now().to_rfc3339(),
            backup: backup.to_string(),
            from_artifact,
            to_artifact: to_artifact.to_string(),
            step: String::from("prepare"),
        }
    }

    pub fn path(state_dir: &Path) -> PathBuf {
        state_dir.join(MARKER_FILENAME)
    }

    pub fn read(state_dir: &Path) -> TaleResult<Option<Self>> {
        let path = Self::path(state_dir);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TaleError::fs("read", &path, e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| TaleError::fs("parse", &path, e.into()))
    }

    /// Persist the marker, replacing any previous copy atomically.
    pub fn write(&self, state_dir: &Path) -> TaleResult<()> {
        let path = Self::path(state_dir);
        let tmp = path.with_extension("marker.tmp");

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| TaleError::fs("encode", &path, e.into()))?;

        let mut file = std::fs::File::create(&tmp).map_err(|e| TaleError::fs("create", &tmp, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| TaleError::fs("write", &tmp, e))?;
        file.sync_all().map_err(|e| TaleError::fs("sync", &tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| TaleError::fs("rename", &tmp, e))?;

        debug!("Upgrade marker at step '{}'", self.step);
        Ok(())
    }

    pub fn clear(state_dir: &Path) -> TaleResult<()> {
        let path = Self::path(state_dir);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TaleError::fs("remove", &path, e)),
        }
    }

    /// The marker, if present. A marker that exists but cannot be read
    /// still counts, with every detail reported as `unknown`.
    pub fn inspect(state_dir: &Path) -> Option<Self> {
        match Self::read(state_dir) {
            Ok(marker) => marker,
            Err(e) => {
                warn!("Upgrade marker present but unreadable: {e}");
                Some(Self {
                    started_at: String::from(UNKNOWN),
                    backup: String::from(UNKNOWN),
                    from_artifact: None,
                    to_artifact: String::from(UNKNOWN),
                    step: String::from(UNKNOWN),
                })
            }
        }
    }

    /// Fail with `InterruptedUpgrade` when a marker is present.
    #[track_caller]
    pub fn ensure_absent(state_dir: &Path) -> TaleResult<()> {
        let Some(existing) = Self::inspect(state_dir) else {
            return Ok(());
        };

        Err(TaleError::InterruptedUpgrade {
            marker: Self::path(state_dir),
            backup: existing.backup,
            step: existing.step,
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
