use std::path::PathBuf;

/// What a completed upgrade did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeReport {
    /// Snapshot of `resources` taken before anything was touched
    pub backup: PathBuf,
    pub downloaded_bytes: u64,
    pub previous_artifact: Option<String>,
    pub new_artifact: String,
    /// Installation-relative entries swapped for the release's copy
    pub replaced: Vec<String>,
    /// Preserved subpaths the release did not ship, left as they were
    pub kept: Vec<String>,
}
