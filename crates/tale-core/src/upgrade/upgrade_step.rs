use std::fmt;

/// Phases of an upgrade, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeStep {
    Backup,
    Fetch,
    Extract,
    Merge,
    Cleanup,
}

impl fmt::Display for UpgradeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Backup => "backup",
            Self::Fetch => "fetch",
            Self::Extract => "extract",
            Self::Merge => "merge",
            Self::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}
