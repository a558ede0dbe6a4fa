//! Per-part fetch errors.
//!
//! Every variant is handled the same way by the retry wrapper; the split only
//! exists so the console and log can say what went wrong.

use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection reset, DNS, ...).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// Data transfer answered with a non-success status.
    #[error("HTTP {status}")]
    Http { status: u32 },
    /// Metadata probe answered 4xx: the session cookies were refused.
    #[error("HTTP {status} on probe (auth issue? re-run to refresh cookies)")]
    AuthRejected { status: u32 },
    /// Metadata probe answered with an HTML page, i.e. a sign-in redirect.
    #[error("probe returned text/html (sign-in redirect to {url})")]
    AuthRedirect { url: String },
    /// Disk write failed (permission denied, disk full, ...).
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
    /// Declared `Content-Length` and received bytes disagree.
    #[error("short transfer: expected {expected} bytes, got {received}")]
    ShortTransfer { expected: u64, received: u64 },
}

/// Error message recorded for a part that failed every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPart {
    pub index: usize,
    pub message: String,
}

impl fmt::Display for FailedPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:02}] {}", self.index, self.message)
    }
}
