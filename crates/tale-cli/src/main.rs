//! tale - run and upgrade a tale blog installation
//!
//! # Examples
//!
//! ```bash
//! # Start the blog in the background, then follow its output
//! tale start
//! tale log
//!
//! # Replace the jar, lib/ and the stock templates with the latest release
//! tale stop
//! tale upgrade
//! tale start
//! ```

mod cli;
mod commands;
mod error;
mod logger;


use crate::{cli::Cli, commands::Commands, error::Result as CliResult};

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info};
use tale_config::Config;
use tale_core::{
    HttpFetcher, Installation, OperationLock, ProcessState, StartOutcome, StopOutcome,
    Supervisor, UpgradeMarker, UpgradeStep, Upgrader,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            eprintln!("Hint: {}", e.recovery_hint());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> CliResult<()> {
    // Load and validate configuration
    let config = Config::load()?;
    config.validate()?;
    let state_dir = Config::config_dir()?;

    // Initialize logger (before any other logging)
    logger::initialize(
        config.logging.level,
        config.log_file_path()?,
        config.logging.colored,
    )?;

    info!("tale-cli v{} `{command}`", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let installation = Installation::from_config(&config.install)?;

    // Held until this function returns
    let _lock = if command.is_mutating() {
        Some(OperationLock::acquire(&state_dir, &command.to_string())?)
    } else {
        None
    };

    let mut supervisor = Supervisor::new(
        installation,
        config.runtime.clone(),
        &config.supervisor,
        state_dir.clone(),
    );

    match command {
        Commands::Start => start(&mut supervisor),
        Commands::Stop => stop(&mut supervisor),
        Commands::Reload => {
            let outcome = supervisor.reload()?;
            report_stop(outcome.stop);
            report_start(&outcome.start);
            Ok(())
        }
        Commands::Log => Ok(tale_core::follow(&supervisor.log_path())?),
        Commands::Status => status(&mut supervisor, &state_dir),
        Commands::Upgrade => upgrade(supervisor.installation(), &config, &state_dir),
    }
}

fn start(supervisor: &mut Supervisor) -> CliResult<()> {
    let outcome = supervisor.start()?;
    report_start(&outcome);
    Ok(())
}

fn stop(supervisor: &mut Supervisor) -> CliResult<()> {
    let outcome = supervisor.stop()?;
    report_stop(outcome);
    Ok(())
}

fn status(supervisor: &mut Supervisor, state_dir: &Path) -> CliResult<()> {
    match supervisor.status()? {
        ProcessState::Running { pid } => println!("Tale is running with pid: {pid}"),
        ProcessState::Stopped => println!("Tale is not running."),
    }

    if let Some(warning) = interrupted_upgrade_warning(state_dir) {
        eprintln!("{warning}");
    }

    Ok(())
}

/// Reported by `status` whenever an upgrade marker is left behind.
fn interrupted_upgrade_warning(state_dir: &Path) -> Option<String> {
    UpgradeMarker::inspect(state_dir).map(|marker| {
        format!(
            "Warning: the upgrade to {} was interrupted during '{}'. Backup: {}",
            marker.to_artifact, marker.step, marker.backup
        )
    })
}

fn upgrade(installation: &Installation, config: &Config, state_dir: &Path) -> CliResult<()> {
    let fetcher = HttpFetcher::new(Duration::from_secs(config.upgrade.request_timeout_secs))?;
    let upgrader = Upgrader::new(installation, &config.upgrade, state_dir, fetcher);

    let report = upgrader.run_with(|step| match step {
        UpgradeStep::Fetch => {
            println!("Backup done.");
            println!("Downloading the latest tale release, please wait...");
        }
        UpgradeStep::Merge => println!("Upgrading..."),
        _ => {}
    })?;

    println!("Backup of resources: {}", report.backup.display());
    println!(
        "Tale upgraded to {}. Start it manually with `tale start`.",
        report.new_artifact
    );

    Ok(())
}

fn report_start(outcome: &StartOutcome) {
    match outcome {
        StartOutcome::AlreadyRunning { pid } => println!("Tale is already running (pid {pid})."),
        StartOutcome::Started { pid, artifact } => println!(
            "Tale started {artifact} with pid {pid}. Use `tale log` to follow its output."
        ),
    }
}

fn report_stop(outcome: StopOutcome) {
    match outcome {
        StopOutcome::NotRunning => println!("Tale is not running."),
        StopOutcome::Signalled { pid } => println!("kill pid: {pid}"),
    }
}
