//! Status lines and a transient byte-progress bar on the terminal.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use tkd_core::report::{ItemEvent, Reporter};

const MB: u64 = 1024 * 1024;

pub struct ConsoleReporter {
    show_progress: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            bar: Mutex::new(None),
        }
    }

    fn new_bar(total: Option<u64>, position: u64) -> ProgressBar {
        let bar = match total {
            Some(total) => ProgressBar::new(total),
            None => ProgressBar::no_length(),
        };
        bar.set_style(
            ProgressStyle::with_template(
                "  [{bar:40}] {bytes}/{total_bytes} {bytes_per_sec} ETA {eta}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
        );
        bar.set_position(position);
        bar
    }
}

/// Text of the status line for `event`, if it has one.
pub(crate) fn status_line(event: &ItemEvent) -> Option<String> {
    let line = match event {
        ItemEvent::Skipped { index, filename, .. } => {
            format!("  [{:02}] {} already complete, skipping", index, filename)
        }
        ItemEvent::Starting {
            index,
            filename,
            resume_from,
        } if *resume_from > 0 => format!(
            "  [{:02}] Resuming {} from {}MB",
            index,
            filename,
            resume_from / MB
        ),
        ItemEvent::Starting {
            index, filename, ..
        } => format!("  [{:02}] Downloading {}", index, filename),
        ItemEvent::Progress { .. } => return None,
        ItemEvent::Finished { index, path, len } => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            format!("  [{:02}] Done \u{2192} {} ({}MB)", index, name, len / MB)
        }
        ItemEvent::Retrying {
            index,
            error,
            delay,
            ..
        } => format!(
            "  [{:02}] ERROR: {}, retrying in {}s",
            index,
            error,
            delay.as_secs()
        ),
        ItemEvent::Failed { index, error } => {
            format!("  [{:02}] FAILED: {}, skipping", index, error)
        }
        ItemEvent::WaitingForSpace {
            index,
            available,
            required,
            wait,
        } => format!(
            "  [{:02}] Low disk: {}GB free (need {}GB), waiting {}s",
            index,
            available / (MB * 1024),
            required / (MB * 1024),
            wait.as_secs()
        ),
    };
    Some(line)
}

impl Reporter for ConsoleReporter {
    fn report(&self, event: &ItemEvent) {
        let mut bar = match self.bar.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let ItemEvent::Progress {
            downloaded, total, ..
        } = event
        {
            if !self.show_progress {
                return;
            }
            let pb = bar.get_or_insert_with(|| Self::new_bar(*total, *downloaded));
            if let Some(total) = total {
                pb.set_length(*total);
            }
            pb.set_position(*downloaded);
            return;
        }

        // Any other event ends the current transfer's bar.
        if let Some(pb) = bar.take() {
            pb.finish_and_clear();
        }
        if let Some(line) = status_line(event) {
            println!("{}", line);
        }
    }
}
