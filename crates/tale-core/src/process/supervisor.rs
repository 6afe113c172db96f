//! Start, stop and query the tale instance.

use crate::{
    Installation, LaunchCommand, ProcessState, ProcessTable, ReloadOutcome, StartOutcome,
    StopOutcome, SystemProcessTable, TaleError, TaleResult, UpgradeMarker,
};

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use error_location::ErrorLocation;
use log::{debug, info, warn};
use tale_config::{RuntimeConfig, SupervisorConfig};

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Supervises the single tale instance of an installation.
///
/// The instance is recomputed on every query: first from the child this
/// supervisor spawned itself (if any), then from the OS process table.
/// PID files are never trusted.
pub struct Supervisor<T: ProcessTable = SystemProcessTable> {
    installation: Installation,
    runtime: RuntimeConfig,
    reload_grace: Duration,
    state_dir: PathBuf,
    table: T,
    spawned: Option<Child>,
}

impl Supervisor<SystemProcessTable> {
    pub fn new(
        installation: Installation,
        runtime: RuntimeConfig,
        supervisor: &SupervisorConfig,
        state_dir: PathBuf,
    ) -> Self {
        Self::with_table(
            installation,
            runtime,
            supervisor,
            state_dir,
            SystemProcessTable,
        )
    }
}

impl<T: ProcessTable> Supervisor<T> {
    pub fn with_table(
        installation: Installation,
        runtime: RuntimeConfig,
        supervisor: &SupervisorConfig,
        state_dir: PathBuf,
        table: T,
    ) -> Self {
        Self {
            installation,
            runtime,
            reload_grace: Duration::from_secs(supervisor.reload_grace_secs),
            state_dir,
            table,
            spawned: None,
        }
    }

    pub fn installation(&self) -> &Installation {
        &self.installation
    }

    /// Output log of the instance.
    pub fn log_path(&self) -> PathBuf {
        self.installation.home().join(&self.runtime.log_file)
    }

    /// Query the current state of the instance.
    ///
    /// A process matches only when its argument vector equals the launch
    /// invocation of the installed artifact and, when the OS reports it,
    /// its working directory is the installation directory. The querying
    /// process never matches itself.
    pub fn status(&mut self) -> TaleResult<ProcessState> {
        if let Some(pid) = self.tracked_pid() {
            return Ok(ProcessState::Running { pid });
        }

        let Some(artifact) = self.installation.locate_artifact()? else {
            debug!("No artifact installed, nothing can be running");
            return Ok(ProcessState::Stopped);
        };

        let launch = LaunchCommand::new(&self.runtime, &artifact)?;
        let own_pid = std::process::id();
        let home = self.installation.home();

        // Threads can show up as separate rows sharing the command line;
        // the lowest pid is the process that owns them.
        let pid = self
            .table
            .snapshot()?
            .into_iter()
            .filter(|entry| entry.pid != own_pid)
            .filter(|entry| launch.matches(&entry.cmd))
            .filter(|entry| entry.cwd.as_deref().is_none_or(|cwd| cwd == home))
            .map(|entry| entry.pid)
            .min();

        Ok(match pid {
            Some(pid) => ProcessState::Running { pid },
            None => ProcessState::Stopped,
        })
    }

    /// Launch the instance unless it is already running.
    ///
    /// Returns as soon as the process is spawned; no readiness check.
    pub fn start(&mut self) -> TaleResult<StartOutcome> {
        UpgradeMarker::ensure_absent(&self.state_dir)?;

        if let ProcessState::Running { pid } = self.status()? {
            info!("Instance already running with pid {pid}");
            return Ok(StartOutcome::AlreadyRunning { pid });
        }

        let artifact =
            self.installation
                .locate_artifact()?
                .ok_or_else(|| TaleError::ArtifactNotFound {
                    dir: self.installation.home().to_path_buf(),
                    location: ErrorLocation::from(Location::caller()),
                })?;

        let launch = LaunchCommand::new(&self.runtime, &artifact)?;
        let child = self.spawn(&launch)?;
        let pid = child.id();

        info!("Spawned `{launch}` with pid {pid}");
        self.spawned = Some(child);

        Ok(StartOutcome::Started { pid, artifact })
    }

    /// Send SIGTERM to the running instance and drop the legacy PID file.
    ///
    /// Does not wait for the process to exit and never escalates.
    pub fn stop(&mut self) -> TaleResult<StopOutcome> {
        let ProcessState::Running { pid } = self.status()? else {
            info!("Instance not running, nothing to stop");
            return Ok(StopOutcome::NotRunning);
        };

        terminate(pid)?;
        info!("Sent termination signal to pid {pid}");

        self.remove_pid_file();

        Ok(StopOutcome::Signalled { pid })
    }

    /// `stop()` then `start()`.
    ///
    /// With a zero grace period the start may still observe the old
    /// process and report it as already running.
    pub fn reload(&mut self) -> TaleResult<ReloadOutcome> {
        let stop = self.stop()?;

        if let StopOutcome::Signalled { pid } = stop
            && !self.reload_grace.is_zero()
        {
            self.wait_for_exit(pid)?;
        }

        let start = self.start()?;

        Ok(ReloadOutcome { stop, start })
    }

    fn wait_for_exit(&mut self, pid: u32) -> TaleResult<()> {
        let deadline = Instant::now() + self.reload_grace;

        while Instant::now() < deadline {
            if self.status()?.pid() != Some(pid) {
                debug!("pid {pid} exited");
                return Ok(());
            }
            std::thread::sleep(EXIT_POLL_INTERVAL);
        }

        warn!(
            "pid {pid} still running after {}s grace period",
            self.reload_grace.as_secs()
        );
        Ok(())
    }

    /// Pid of the child spawned by this supervisor, if it is still alive.
    fn tracked_pid(&mut self) -> Option<u32> {
        let child = self.spawned.as_mut()?;

        match child.try_wait() {
            Ok(None) => Some(child.id()),
            Ok(Some(status)) => {
                debug!("Spawned pid {} exited with {status}", child.id());
                self.spawned = None;
                None
            }
            Err(e) => {
                warn!("Cannot poll spawned pid {}: {e}", child.id());
                self.spawned = None;
                None
            }
        }
    }

    fn spawn(&self, launch: &LaunchCommand) -> TaleResult<Child> {
        let log_path = self.log_path();

        if let Some(log_dir) = log_path.parent() {
            std::fs::create_dir_all(log_dir)
                .map_err(|e| TaleError::fs("create log directory", log_dir, e))?;
        }

        let stdout = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| TaleError::fs("open log file", &log_path, e))?;
        let stderr = stdout
            .try_clone()
            .map_err(|e| TaleError::fs("open log file", &log_path, e))?;

        let mut cmd = Command::new(launch.program());
        cmd.args(launch.args())
            .current_dir(self.installation.home())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr);

        // Detach into its own session so it outlives this command
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            unsafe {
                cmd.pre_exec(|| {
                    libc::setsid();
                    Ok(())
                });
            }
        }

        cmd.spawn().map_err(|e| TaleError::ProcessSpawn {
            program: launch.program().to_string(),
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    fn remove_pid_file(&self) {
        let pid_file = self.installation.home().join(&self.runtime.pid_file);
        remove_if_present(&pid_file);
    }
}

fn remove_if_present(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {e}", path.display()),
    }
}

#[cfg(unix)]
fn terminate(pid: u32) -> TaleResult<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| TaleError::signal(pid, "pid out of range"))?;

    match kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => Ok(()),
        // Exited between the query and the signal
        Err(Errno::ESRCH) => {
            debug!("pid {pid} already gone");
            Ok(())
        }
        Err(e) => Err(TaleError::signal(pid, e.desc())),
    }
}

#[cfg(not(unix))]
fn terminate(pid: u32) -> TaleResult<()> {
    let output = Command::new("taskkill")
        .args(["/PID", &pid.to_string()])
        .output()
        .map_err(|e| TaleError::signal(pid, e.to_string()))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(TaleError::signal(
            pid,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}
