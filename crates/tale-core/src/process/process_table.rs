use crate::{TaleError, TaleResult};

use std::path::{Path, PathBuf};

use sysinfo::{ProcessRefreshKind, System, UpdateKind};

/// One row of the OS process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    /// Full argument vector, `argv[0]` included
    pub cmd: Vec<String>,
    /// Working directory when the OS exposes it
    pub cwd: Option<PathBuf>,
}

/// Read access to the OS process table.
pub trait ProcessTable {
    fn snapshot(&self) -> TaleResult<Vec<ProcessEntry>>;
}

/// Process table backed by `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessTable;

impl ProcessTable for SystemProcessTable {
    fn snapshot(&self) -> TaleResult<Vec<ProcessEntry>> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(TaleError::process_query(format!(
                "process listing is not supported on {}",
                std::env::consts::OS
            )));
        }

        // A bare refresh leaves cmd and cwd empty
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessRefreshKind::new()
                .with_cmd(UpdateKind::Always)
                .with_cwd(UpdateKind::Always),
        );

        let entries = system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessEntry {
                pid: pid.as_u32(),
                cmd: process.cmd().to_vec(),
                cwd: process
                    .cwd()
                    .filter(|cwd| !cwd.as_os_str().is_empty())
                    .map(Path::to_path_buf),
            })
            .collect();

        Ok(entries)
    }
}

impl<T: ProcessTable + ?Sized> ProcessTable for &T {
    fn snapshot(&self) -> TaleResult<Vec<ProcessEntry>> {
        (**self).snapshot()
    }
}
