mod launch_command;
mod process_state;
mod process_table;
mod supervisor;

pub use launch_command::LaunchCommand;
pub use process_state::{ProcessState, ReloadOutcome, StartOutcome, StopOutcome};
pub use process_table::{ProcessEntry, ProcessTable, SystemProcessTable};
pub use supervisor::Supervisor;

