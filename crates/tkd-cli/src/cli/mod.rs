//! CLI for the TKD Takeout part downloader.

mod console;
mod run;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tkd_core::config::{CredentialSource, TkdConfig};

/// Top-level CLI: fetch parts START..=END of one Takeout export.
#[derive(Debug, Parser)]
#[command(name = "tkd")]
#[command(about = "TKD: sequential Google Takeout part downloader", long_about = None)]
pub struct Cli {
    /// First part index to fetch (default 0).
    pub start: Option<usize>,

    /// Last part index to fetch, inclusive (default: the last part).
    pub end: Option<usize>,

    /// Load configuration from this file instead of ~/.config/tkd/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Export job identifier (`j` parameter of the download links).
    #[arg(long, value_name = "ID")]
    pub job_id: Option<String>,

    /// Account identifier (`user` parameter of the download links).
    #[arg(long, value_name = "ID")]
    pub user_id: Option<String>,

    /// Directory the parts are written to (default ~/Downloads).
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Take cookies from a HAR export instead of the Chrome profile.
    #[arg(long, value_name = "PATH", conflicts_with = "cookies_db")]
    pub har: Option<PathBuf>,

    /// Chrome `Cookies` database to read instead of the default profile's.
    #[arg(long, value_name = "PATH")]
    pub cookies_db: Option<PathBuf>,

    /// Print status lines only, without the progress bar.
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// Command-line values win over the config file.
    pub fn apply_overrides(&self, cfg: &mut TkdConfig) {
        if let Some(job_id) = &self.job_id {
            cfg.job_id = job_id.clone();
        }
        if let Some(user_id) = &self.user_id {
            cfg.user_id = user_id.clone();
        }
        if let Some(dest) = &self.dest {
            cfg.dest_dir = Some(dest.clone());
        }
        if let Some(path) = &self.har {
            cfg.credentials = CredentialSource::Har { path: path.clone() };
        } else if let Some(db_path) = &self.cookies_db {
            cfg.credentials = CredentialSource::Chrome {
                db_path: Some(db_path.clone()),
            };
        }
    }
}

pub fn run_from_args() -> Result<()> {
    let cli = Cli::parse();
    run::run(&cli)
}
