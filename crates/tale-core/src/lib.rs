//! Supervision and in-place upgrade of a tale installation.

mod archive;
mod error;
mod fetcher;
mod installation;
mod lock;
mod log_tail;
mod process;
mod upgrade;

#[cfg(test)]
mod tests;

pub use archive::{compress, extract};
pub use error::{Result as TaleResult, TaleError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use installation::{ArtifactPattern, Installation, locate};
pub use lock::OperationLock;
pub use log_tail::follow;
pub use process::{
    LaunchCommand, ProcessEntry, ProcessState, ProcessTable, ReloadOutcome, StartOutcome,
    StopOutcome, Supervisor, SystemProcessTable,
};
pub use upgrade::{PRESERVED_SUBPATHS, UpgradeMarker, UpgradeReport, UpgradeStep, Upgrader};
