/// Observed state of the supervised instance.
///
/// A failed process table query is not a state: it surfaces as
/// `TaleError::ProcessQuery`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Stopped,
    Running { pid: u32 },
}

impl ProcessState {
    pub fn pid(&self) -> Option<u32> {
        match self {
            Self::Running { pid } => Some(*pid),
            Self::Stopped => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Nothing was launched
    AlreadyRunning { pid: u32 },
    /// Launch succeeded; says nothing about readiness
    Started { pid: u32, artifact: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    NotRunning,
    /// SIGTERM was sent; the process may still be exiting
    Signalled { pid: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadOutcome {
    pub stop: StopOutcome,
    pub start: StartOutcome,
}
