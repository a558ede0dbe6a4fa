#![allow(dead_code)]

pub mod takeout_server;

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tkd_core::config::TkdConfig;
use tkd_core::credentials::CookieJar;
use tkd_core::downloader::Downloader;
use tkd_core::report::{ItemEvent, Reporter};
use tkd_core::session::Session;

/// Collects every event for later assertions.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ItemEvent>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<ItemEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: &ItemEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Config pointing at a test server, writing into `dest`.
pub fn config_for(base_url: &str, dest: &Path) -> TkdConfig {
    TkdConfig {
        base_url: base_url.to_string(),
        job_id: "job-1".to_string(),
        user_id: "42".to_string(),
        dest_dir: Some(dest.to_path_buf()),
        probe_timeout_secs: 5,
        transfer_timeout_secs: 5,
        chunk_size: 4096,
        ..TkdConfig::default()
    }
}

pub struct Harness {
    pub downloader: Downloader,
    pub reporter: Arc<RecordingReporter>,
    pub pauses: Arc<Mutex<Vec<Duration>>>,
}

/// Downloader with a recording reporter and a pause hook that only records.
pub fn harness(cfg: &TkdConfig) -> Harness {
    let jar: CookieJar = [("SID", "sid-value"), ("HSID", "hsid-value")]
        .into_iter()
        .collect();
    let reporter = Arc::new(RecordingReporter::default());
    let pauses = Arc::new(Mutex::new(Vec::new()));
    let pauses_cb = Arc::clone(&pauses);
    let downloader = Downloader::new(cfg, Session::new(&jar, "tkd-test"), reporter.clone())
        .expect("downloader")
        .with_pause(move |d| pauses_cb.lock().unwrap().push(d));
    Harness {
        downloader,
        reporter,
        pauses,
    }
}
