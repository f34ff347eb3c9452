#![forbid(unsafe_code)]

//! Log setup for the binary.
//!
//! The terminal belongs to the console, so logs only go to a file. Without
//! a log file no subscriber is installed and every `tracing` macro is a
//! no-op.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const FILTER_ENV: &str = "PHOSPHOR_LOG";
/// Filter used when `PHOSPHOR_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from `PHOSPHOR_LOG`, falling back to [`DEFAULT_FILTER`].
#[must_use]
pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Open `path` for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber writing to `path`.
///
/// Returns `Ok(false)` when there is no path or a subscriber is already
/// installed.
pub fn init(path: Option<&Path>, json: bool) -> io::Result<bool> {
    let Some(path) = path else {
        return Ok(false);
    };
    let writer = Mutex::new(open_log_file(path)?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_from_env())
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer);

    let installed = if json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };
    if installed {
        tracing::info!(path = %path.display(), json, "logging started");
    }
    Ok(installed)
}
