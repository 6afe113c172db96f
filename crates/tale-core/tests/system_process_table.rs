//! Start in one supervisor, observe from fresh ones through the real OS
//! process table.
//!
//! When launched with `-jar` this binary idles like a server instead of
//! running the checks, so it can stand in for the runtime while keeping
//! the exact argument vector the supervisor expects.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use googletest::assert_that;
use googletest::prelude::eq;
use tale_config::{RuntimeConfig, SupervisorConfig};
use tale_core::{
    ArtifactPattern, Installation, ProcessState, StartOutcome, StopOutcome, Supervisor,
};
use tempfile::TempDir;

const IDLE: Duration = Duration::from_secs(30);
const EXIT_DEADLINE: Duration = Duration::from_secs(10);

fn main() -> ExitCode {
    if std::env::args().any(|arg| arg == "-jar") {
        std::thread::sleep(IDLE);
        return ExitCode::SUCCESS;
    }

    #[cfg(unix)]
    given_instance_started_by_earlier_invocation_when_fresh_supervisor_then_found();

    println!("system_process_table: ok");
    ExitCode::SUCCESS
}

fn supervisor(home: &TempDir, state: &TempDir) -> Supervisor {
    let runtime = RuntimeConfig {
        java: std::env::current_exe()
            .unwrap()
            .to_string_lossy()
            .into_owned(),
        ..RuntimeConfig::default()
    };
    let installation = Installation::open(home.path(), ArtifactPattern::default()).unwrap();

    Supervisor::new(
        installation,
        runtime,
        &SupervisorConfig::default(),
        state.path().to_path_buf(),
    )
}

#[cfg(unix)]
fn given_instance_started_by_earlier_invocation_when_fresh_supervisor_then_found() {
    // Given
    let home = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    std::fs::write(home.path().join("tale-1.0.jar"), "jar").unwrap();

    let mut first = supervisor(&home, &state);
    let StartOutcome::Started { pid, .. } = first.start().unwrap() else {
        panic!("nothing was running, start must launch");
    };

    // When
    let mut second = supervisor(&home, &state);
    let observed = second.status().unwrap();
    let again = second.start().unwrap();
    let stopped = second.stop().unwrap();

    // Then
    assert_that!(observed, eq(ProcessState::Running { pid }));
    assert_that!(again, eq(&StartOutcome::AlreadyRunning { pid }));
    assert_that!(stopped, eq(StopOutcome::Signalled { pid }));

    // `first` still owns the child and reaps it once it exits
    let deadline = Instant::now() + EXIT_DEADLINE;
    while first.status().unwrap() != ProcessState::Stopped {
        assert!(Instant::now() < deadline, "pid {pid} survived SIGTERM");
        std::thread::sleep(Duration::from_millis(100));
    }
    assert_that!(
        supervisor(&home, &state).status().unwrap(),
        eq(ProcessState::Stopped)
    );
}
