//! Follow the runtime log in the caller's terminal.

use crate::{TaleError, TaleResult};

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use log::debug;

const TAIL_PROGRAM: &str = "tail";

/// Block on `tail -f <path>` with the terminal's stdio passed through.
///
/// Returns when the user interrupts or `tail` exits.
pub fn follow(path: &Path) -> TaleResult<()> {
    if !path.is_file() {
        return Err(TaleError::fs(
            "follow",
            path,
            std::io::Error::new(ErrorKind::NotFound, "log file does not exist yet"),
        ));
    }

    debug!("Following {}", path.display());

    let status = Command::new(TAIL_PROGRAM)
        .arg("-f")
        .arg(path)
        .status()
        .map_err(|e| TaleError::ProcessSpawn {
            program: TAIL_PROGRAM.to_string(),
            source: e,
            location: error_location::ErrorLocation::from(std::panic::Location::caller()),
        })?;

    debug!("{TAIL_PROGRAM} exited with {status}");
    Ok(())
}
