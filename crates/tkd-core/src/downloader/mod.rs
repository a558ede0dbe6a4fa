//! Sequential part downloader.
//!
//! For each index: probe, decide skip / resume / fresh from the file on disk,
//! stream the body, and retry the whole part after a fixed delay on failure.
//! A part that fails every attempt is recorded and the run moves on.

mod range;
mod transfer;

pub use range::{PartRange, RangeError};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigError, TkdConfig};
use crate::error::{FailedPart, FetchError};
use crate::fetch_head;
use crate::report::{log_event, ItemEvent, Reporter};
use crate::resume::{self, FetchPlan};
use crate::retry::{run_with_retry, RetryPolicy};
use crate::session::Session;
use crate::storage;
use crate::url_model::{part_filename, PartUrl};

use transfer::{TransferOutcome, TransferRequest};

/// Poll interval while the destination is short on space.
pub const SPACE_POLL: Duration = Duration::from_secs(30);

const GIB: u64 = 1024 * 1024 * 1024;

/// Sleeps for the given duration; replaced in tests.
pub type PauseFn = Arc<dyn Fn(Duration) + Send + Sync>;

/// How a part ended up complete.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PartOutcome {
    Skipped(PathBuf),
    Downloaded(PathBuf),
}

/// Result of `fetch_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Parts transferred in this run.
    pub completed: Vec<usize>,
    /// Parts already complete on disk.
    pub skipped: Vec<usize>,
    pub failed: Vec<FailedPart>,
}

impl RunSummary {
    pub fn failed_indices(&self) -> Vec<usize> {
        self.failed.iter().map(|f| f.index).collect()
    }
}

pub struct Downloader {
    session: Session,
    urls: PartUrl,
    dest_dir: PathBuf,
    policy: RetryPolicy,
    probe_timeout: Duration,
    transfer_timeout: Duration,
    chunk_size: usize,
    min_free_bytes: Option<u64>,
    reporter: Arc<dyn Reporter>,
    pause: PauseFn,
}

impl Downloader {
    pub fn new(
        cfg: &TkdConfig,
        session: Session,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self, ConfigError> {
        let urls = PartUrl::new(cfg.base_url()?, cfg.job_id.clone(), cfg.user_id.clone());
        Ok(Self {
            session,
            urls,
            dest_dir: cfg.resolved_dest_dir()?,
            policy: cfg.retry_policy(),
            probe_timeout: cfg.probe_timeout(),
            transfer_timeout: cfg.transfer_timeout(),
            chunk_size: cfg.chunk_size,
            min_free_bytes: cfg.min_free_gb.map(|gb| gb.saturating_mul(GIB)),
            reporter,
            pause: Arc::new(std::thread::sleep),
        })
    }

    /// Replaces the sleep used between attempts and while waiting for space.
    pub fn with_pause(mut self, pause: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.pause = Arc::new(pause);
        self
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    fn emit(&self, event: ItemEvent) {
        log_event(&event);
        self.reporter.report(&event);
    }

    /// Fetches every part in `range`, one at a time. Never fails: parts that
    /// exhaust their attempts are listed in the summary.
    pub fn fetch_all(&self, range: PartRange) -> RunSummary {
        tracing::info!(
            start = range.start(),
            end = range.end(),
            parts = range.count(),
            dest = %self.dest_dir.display(),
            "starting run"
        );
        let mut summary = RunSummary::default();

        for index in range.indices() {
            self.wait_for_space(index);

            let result = run_with_retry(
                &self.policy,
                |attempt| {
                    tracing::debug!(index, attempt, "attempt");
                    self.fetch_part(index)
                },
                |attempt, err, delay| {
                    self.emit(ItemEvent::Retrying {
                        index,
                        attempt,
                        error: err.to_string(),
                        delay,
                    });
                    (self.pause)(delay);
                },
            );

            match result {
                Ok(PartOutcome::Downloaded(_)) => summary.completed.push(index),
                Ok(PartOutcome::Skipped(_)) => summary.skipped.push(index),
                Err(e) => {
                    let message = e.to_string();
                    self.emit(ItemEvent::Failed {
                        index,
                        error: message.clone(),
                    });
                    summary.failed.push(FailedPart { index, message });
                }
            }
        }

        tracing::info!(
            completed = summary.completed.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            "run finished"
        );
        summary
    }

    /// Single attempt at part `index`; returns the local file path.
    pub fn fetch_one(&self, index: usize) -> Result<PathBuf, FetchError> {
        match self.fetch_part(index)? {
            PartOutcome::Skipped(path) | PartOutcome::Downloaded(path) => Ok(path),
        }
    }

    fn fetch_part(&self, index: usize) -> Result<PartOutcome, FetchError> {
        let url = self.urls.url_for(index);
        let head = fetch_head::probe(&self.session, &url, self.probe_timeout)?;
        let filename = part_filename(head.content_disposition.as_deref(), index);
        let expected = head.expected_len();
        tracing::debug!(index, %filename, ?expected, "probed");

        std::fs::create_dir_all(&self.dest_dir)?;
        let path = self.dest_dir.join(&filename);
        let local = storage::local_len(&path)?;

        let offset = match resume::plan(local, expected) {
            FetchPlan::Skip { len } => {
                self.emit(ItemEvent::Skipped {
                    index,
                    filename,
                    len,
                });
                return Ok(PartOutcome::Skipped(path));
            }
            plan => plan.offset(),
        };

        self.emit(ItemEvent::Starting {
            index,
            filename: filename.clone(),
            resume_from: offset,
        });

        let req = TransferRequest {
            url: &url,
            path: &path,
            offset,
            expected,
            chunk_size: self.chunk_size,
            stall_timeout: self.transfer_timeout,
        };
        let outcome = transfer::download(&self.session, &req, |downloaded, total| {
            self.emit(ItemEvent::Progress {
                index,
                downloaded,
                total,
            })
        })?;

        match outcome {
            TransferOutcome::Written { len } => {
                self.emit(ItemEvent::Finished {
                    index,
                    path: path.clone(),
                    len,
                });
                Ok(PartOutcome::Downloaded(path))
            }
            TransferOutcome::AlreadyComplete { len } => {
                self.emit(ItemEvent::Skipped {
                    index,
                    filename,
                    len,
                });
                Ok(PartOutcome::Skipped(path))
            }
        }
    }

    /// Blocks while free space in the destination is below `min_free_gb`.
    fn wait_for_space(&self, index: usize) {
        let Some(required) = self.min_free_bytes else {
            return;
        };
        loop {
            let probe_dir = if self.dest_dir.exists() {
                self.dest_dir.as_path()
            } else {
                self.dest_dir.parent().unwrap_or(Path::new("/"))
            };
            match storage::available_bytes(probe_dir) {
                Ok(available) if available >= required => return,
                Ok(available) => {
                    self.emit(ItemEvent::WaitingForSpace {
                        index,
                        available,
                        required,
                        wait: SPACE_POLL,
                    });
                    (self.pause)(SPACE_POLL);
                }
                Err(e) => {
                    tracing::warn!(error = %e, dir = %probe_dir.display(), "cannot read free space, not waiting");
                    return;
                }
            }
        }
    }
}
