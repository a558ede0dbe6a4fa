//! Tracing setup for the binary: the run log goes to a file in the XDG state
//! directory; stderr is the fallback when that directory cannot be written.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "tkd.log";

/// `RUST_LOG` if set and valid, otherwise `default`.
fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn open_log() -> Result<(PathBuf, File)> {
    let dirs = xdg::BaseDirectories::with_prefix("tkd")?;
    let path = dirs
        .place_state_file(LOG_FILE)
        .context("create log directory")?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;
    Ok((path, file))
}

/// Appends the run log to `$XDG_STATE_HOME/tkd/tkd.log` and returns its path.
///
/// Fails if the file cannot be opened or a subscriber is already set; the
/// caller then uses [`init_logging_stderr`].
pub fn init_logging() -> Result<PathBuf> {
    let (path, file) = open_log()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter_or("info,tkd_core=debug"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;
    tracing::info!(path = %path.display(), "log opened");
    Ok(path)
}

/// Warnings and errors only, on stderr; status lines own stdout.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_or("warn"))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
