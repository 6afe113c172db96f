use std::fmt;

use clap::Subcommand;

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Commands {
    /// Start tale in the background
    Start,

    /// Stop the running tale instance
    Stop,

    /// Restart the running tale instance
    Reload,

    /// Follow the tale log
    Log,

    /// Show whether tale is running
    Status,

    /// Upgrade tale to the latest release
    Upgrade,
}

impl Commands {
    /// Commands that change the installation or its process hold the
    /// operation lock for their whole run.
    pub(crate) fn is_mutating(self) -> bool {
        !matches!(self, Self::Log | Self::Status)
    }
}

impl fmt::Display for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Reload => "reload",
            Self::Log => "log",
            Self::Status => "status",
            Self::Upgrade => "upgrade",
        };
        f.write_str(name)
    }
}
