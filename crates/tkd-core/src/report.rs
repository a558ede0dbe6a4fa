//! Status events emitted per part, and the seam they are delivered through.

use std::path::PathBuf;
use std::time::Duration;

/// One thing that happened to a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemEvent {
    /// Local file already complete; no transfer.
    Skipped {
        index: usize,
        filename: String,
        len: u64,
    },
    /// Transfer about to start. `resume_from` is 0 for a fresh fetch.
    Starting {
        index: usize,
        filename: String,
        resume_from: u64,
    },
    /// Running byte count, including the resumed prefix.
    Progress {
        index: usize,
        downloaded: u64,
        total: Option<u64>,
    },
    Finished {
        index: usize,
        path: PathBuf,
        len: u64,
    },
    /// Attempt `attempt` failed; waiting `delay` before the next one.
    Retrying {
        index: usize,
        attempt: u32,
        error: String,
        delay: Duration,
    },
    /// Every attempt failed; moving on to the next part.
    Failed { index: usize, error: String },
    /// Destination is short on space before part `index`; waiting `wait` before checking again.
    WaitingForSpace {
        index: usize,
        available: u64,
        required: u64,
        wait: Duration,
    },
}

/// Receives status events. Implementations render them (console) or collect them (tests).
pub trait Reporter: Send + Sync {
    fn report(&self, event: &ItemEvent);
}

/// Writes `event` to the log; called for every event before it reaches the reporter.
pub(crate) fn log_event(event: &ItemEvent) {
    match event {
        ItemEvent::Skipped {
            index,
            filename,
            len,
        } => tracing::info!(index, %filename, len, "already complete, skipping"),
        ItemEvent::Starting {
            index,
            filename,
            resume_from,
        } => tracing::info!(index, %filename, resume_from, "starting transfer"),
        ItemEvent::Progress {
            index,
            downloaded,
            total,
        } => tracing::trace!(index, downloaded, ?total, "progress"),
        ItemEvent::Finished { index, path, len } => {
            tracing::info!(index, path = %path.display(), len, "part done")
        }
        ItemEvent::Retrying {
            index,
            attempt,
            error,
            delay,
        } => tracing::warn!(index, attempt, %error, delay_secs = delay.as_secs(), "attempt failed, retrying"),
        ItemEvent::Failed { index, error } => tracing::error!(index, %error, "part failed, skipping"),
        ItemEvent::WaitingForSpace {
            index,
            available,
            required,
            wait,
        } => tracing::warn!(index, available, required, wait_secs = wait.as_secs(), "low disk space, waiting"),
    }
}
