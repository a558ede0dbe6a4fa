//! `tkd [START] [END]`: load config and cookies, then fetch the range.

use anyhow::{Context, Result};
use std::sync::Arc;
use tkd_core::config;
use tkd_core::credentials;
use tkd_core::downloader::{Downloader, PartRange};
use tkd_core::session::Session;

use super::console::ConsoleReporter;
use super::Cli;

pub fn run(cli: &Cli) -> Result<()> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_init()?,
    };
    cli.apply_overrides(&mut cfg);
    tracing::debug!("loaded config: {:?}", cfg);
    cfg.validate()?;

    let range = PartRange::from_bounds(cli.start, cli.end, cfg.total_parts)?;

    let origin = cfg.cookie_origin()?;
    let provider = credentials::provider_from_config(&cfg.credentials);
    let jar = provider
        .cookies_for(&origin)
        .with_context(|| format!("could not load {} cookies for {}", provider.name(), origin))?;
    tracing::info!(provider = provider.name(), cookies = jar.len(), "session cookies loaded");
    println!("Loaded {} cookies from {}.", jar.len(), provider.name());

    let session = Session::new(&jar, cfg.user_agent.clone());
    let reporter = Arc::new(ConsoleReporter::new(!cli.no_progress));
    let downloader = Downloader::new(&cfg, session, reporter)?;

    println!(
        "Fetching parts {}-{} ({} total) into {}",
        range.start(),
        range.end(),
        range.count(),
        downloader.dest_dir().display()
    );
    let summary = downloader.fetch_all(range);

    println!();
    println!("All done.");
    let failed = summary.failed_indices();
    if !failed.is_empty() {
        let list: Vec<String> = failed.iter().map(|i| i.to_string()).collect();
        println!("Failed parts: {}", list.join(", "));
    }
    Ok(())
}
