//! Lock file for exclusive mutating commands.

use crate::{TaleError, TaleResult};

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};

use error_location::ErrorLocation;
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[cfg(unix)]
use nix::{
    errno::Errno,
    fcntl::{Flock, FlockArg},
};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

const LOCK_FILENAME: &str = "tale-cli.lock";
#[cfg(unix)]
const LOCK_FILE_MODE: u32 = 0o600; // Owner read/write only

#[cfg(unix)]
type Handle = Flock<File>;
#[cfg(not(unix))]
type Handle = File;

/// Held for the whole duration of `start`, `stop`, `reload` and `upgrade`.
///
/// Exclusion comes from an advisory `flock` on the lock file, which the
/// kernel drops when the holder exits, so a crashed invocation never
/// leaves a stale lock. The file itself is never deleted; its JSON
/// content (PID, operation, start time) only describes the holder.
#[derive(Debug)]
pub struct OperationLock {
    path: PathBuf,
    handle: Option<Handle>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
    operation: String,
    started_at: String,
}

impl OperationLock {
    /// Try to acquire the lock in `state_dir`.
    ///
    /// Fails with `OperationInProgress` while another holder has it,
    /// including another lock of the current process.
    #[track_caller]
    pub fn acquire(state_dir: &Path, operation: &str) -> TaleResult<Self> {
        let path = state_dir.join(LOCK_FILENAME);

        std::fs::create_dir_all(state_dir)
            .map_err(|e| TaleError::fs("create config directory", state_dir, e))?;

        let file = Self::open(&path).map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                Self::in_progress(&path)
            } else {
                TaleError::LockAcquisition {
                    path: path.clone(),
                    source: e,
                    location: ErrorLocation::from(Location::caller()),
                }
            }
        })?;

        let mut handle = Self::lock(file, &path)?;

        if let Ok(previous) = Self::parse_info(&mut handle) {
            info!(
                "Taking over lock last held by PID {} for '{}'",
                previous.pid, previous.operation
            );
        }

        let mut lock = Self {
            path,
            handle: Some(handle),
        };

        lock.write_info(operation)?;
        debug!("Acquired lock {} for '{operation}'", lock.path.display());

        Ok(lock)
    }

    #[cfg(unix)]
    fn open(path: &Path) -> std::io::Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(LOCK_FILE_MODE)
            .open(path)
    }

    #[cfg(not(unix))]
    fn open(path: &Path) -> std::io::Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
    }

    #[cfg(unix)]
    #[track_caller]
    fn lock(file: File, path: &Path) -> TaleResult<Handle> {
        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(handle) => Ok(handle),
            Err((_, errno)) if errno == Errno::EWOULDBLOCK => Err(Self::in_progress(path)),
            Err((_, errno)) => Err(TaleError::LockAcquisition {
                path: path.to_path_buf(),
                source: errno.into(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Without `flock` the file's existence is the lock, so it cannot
    /// recover from a crash on its own.
    #[cfg(not(unix))]
    fn lock(file: File, _path: &Path) -> TaleResult<Handle> {
        Ok(file)
    }

    #[track_caller]
    fn in_progress(path: &Path) -> TaleError {
        // The holder may not have written its details yet
        let (operation, pid) = File::open(path)
            .ok()
            .and_then(|mut file| Self::parse_info(&mut file).ok())
            .map(|info| (info.operation, info.pid))
            .unwrap_or_else(|| (String::from("unknown"), 0));

        TaleError::OperationInProgress {
            operation,
            pid,
            path: path.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Replace the file content with the current process info.
    fn write_info(&mut self, operation: &str) -> TaleResult<()> {
        let info = LockInfo {
            pid: std::process::id(),
            operation: operation.to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
        };

        let content = serde_json::to_string_pretty(&info)
            .map_err(|e| TaleError::fs("encode", &self.path, e.into()))?;

        let replace = |file: &mut File| -> std::io::Result<()> {
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(content.as_bytes())?;
            file.sync_all()
        };

        if let Some(handle) = self.handle.as_mut() {
            let file: &mut File = handle;
            replace(file).map_err(|e| TaleError::fs("write", &self.path, e))?;
        }

        Ok(())
    }

    fn parse_info(file: &mut File) -> std::io::Result<LockInfo> {
        let mut content = String::new();
        file.seek(SeekFrom::Start(0))?;
        file.read_to_string(&mut content)?;
        serde_json::from_str(&content).map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock.
    ///
    /// Called automatically on drop, but can be called
    /// explicitly for graceful shutdown.
    pub fn release(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        // Clear the holder details while still holding the lock
        let file: &File = &handle;
        file.set_len(0).ok();
        drop(handle);

        #[cfg(not(unix))]
        std::fs::remove_file(&self.path).ok();
    }
}

impl Drop for OperationLock {
    fn drop(&mut self) {
        self.release();
    }
}
