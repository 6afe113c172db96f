use crate::error::{CliError, Result as CliErrorResult};

use std::fmt;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{Record, debug};

/// Initialize logger with fern
///
/// # Arguments
/// * `log_level` - Log level filter
/// * `log_file` - Optional path to log file. None = stderr, Some = file output
/// * `colored` - Colour the level when stderr is a terminal
///
/// stdout is reserved for the command's own messages.
pub fn initialize(
    log_level: tale_config::LogLevel,
    log_file: Option<PathBuf>,
    colored: bool,
) -> CliErrorResult<()> {
    let level_filter = log_level.0;

    let colors = use_color(colored, log_file.is_some(), std::io::stderr().is_terminal())
        .then(level_colors);

    let dispatch = Dispatch::new()
        .level(level_filter)
        .format(move |out, message, record| match colors {
            Some(colors) => write_line(out, message, record, colors.color(record.level())),
            None => write_line(out, message, record, record.level()),
        });

    let dispatch = match log_file {
        Some(ref log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
                .map_err(|e| CliError::Logger {
                    message: format!("Failed to open log file {}: {}", log_path.display(), e),
                })?;
            dispatch.chain(file)
        }
        None => dispatch.chain(std::io::stderr()),
    };

    dispatch.apply().map_err(|e| CliError::Logger {
        message: e.to_string(),
    })?;

    match log_file {
        Some(ref path) => debug!(
            "Logger initialized: level={}, file={}",
            log_level,
            path.display()
        ),
        None => debug!(
            "Logger initialized: level={}, stderr, colors={}",
            log_level,
            colors.is_some()
        ),
    }

    Ok(())
}

/// Escape codes only make sense on an interactive stderr.
pub(crate) fn use_color(colored: bool, to_file: bool, stderr_is_terminal: bool) -> bool {
    colored && !to_file && stderr_is_terminal
}

fn level_colors() -> ColoredLevelConfig {
    ColoredLevelConfig::new()
        .trace(Color::Magenta)
        .debug(Color::Blue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red)
}

/// `[<rfc3339> - LEVEL] message [file:line]`
fn write_line(
    out: FormatCallback,
    message: &fmt::Arguments,
    record: &Record,
    level: impl fmt::Display,
) {
    out.finish(format_args!(
        "[{date} - {level}] {message} [{file}:{line}]",
        date = humantime::format_rfc3339(SystemTime::now()),
        file = record.file().unwrap_or("unknown"),
        line = record.line().unwrap_or(0),
    ))
}
