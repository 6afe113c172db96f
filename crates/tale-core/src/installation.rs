//! Installation directory layout and runnable artifact discovery.

use crate::{TaleError, TaleResult};

use std::path::{Path, PathBuf};

use log::debug;
use tale_config::InstallConfig;

const RESOURCES_DIR: &str = "resources";
const LIB_DIR: &str = "lib";

/// File name convention of the runnable artifact (`tale*.jar`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPattern {
    prefix: String,
    suffix: String,
}

impl ArtifactPattern {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(&self.prefix) && name.ends_with(&self.suffix)
    }
}

impl Default for ArtifactPattern {
    fn default() -> Self {
        Self::new("tale", ".jar")
    }
}

/// Find the runnable artifact among the immediate entries of `dir`.
///
/// Only regular files are considered and names are compared in lexical
/// order, so a directory holding several matches always yields the same
/// one. `Ok(None)` is a valid state (fresh install, or torn down
/// mid-upgrade); only an unreadable directory is an error.
pub fn locate(dir: &Path, pattern: &ArtifactPattern) -> TaleResult<Option<String>> {
    let entries = std::fs::read_dir(dir).map_err(|e| TaleError::fs("list", dir, e))?;

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TaleError::fs("list", dir, e))?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !pattern.matches(&name) {
            continue;
        }
        let is_file = entry
            .file_type()
            .map_err(|e| TaleError::fs("inspect", &entry.path(), e))?
            .is_file();
        if is_file {
            matches.push(name);
        }
    }

    matches.sort();
    if matches.len() > 1 {
        debug!(
            "Found {} artifacts in {}, using {}",
            matches.len(),
            dir.display(),
            matches[0]
        );
    }

    Ok(matches.into_iter().next())
}

/// A tale installation rooted at an existing directory.
#[derive(Debug, Clone)]
pub struct Installation {
    home: PathBuf,
    pattern: ArtifactPattern,
}

impl Installation {
    /// Open an installation. The home directory is canonicalized so it can
    /// be compared against the working directory of running processes.
    pub fn open(home: &Path, pattern: ArtifactPattern) -> TaleResult<Self> {
        let home = home
            .canonicalize()
            .map_err(|e| TaleError::fs("open installation", home, e))?;
        Ok(Self { home, pattern })
    }

    pub fn from_config(config: &InstallConfig) -> TaleResult<Self> {
        Self::open(
            &config.home_path(),
            ArtifactPattern::new(&config.artifact_prefix, &config.artifact_suffix),
        )
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn pattern(&self) -> &ArtifactPattern {
        &self.pattern
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.home.join(RESOURCES_DIR)
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.home.join(LIB_DIR)
    }

    /// Name of the installed artifact, if any.
    pub fn locate_artifact(&self) -> TaleResult<Option<String>> {
        locate(&self.home, &self.pattern)
    }
}
