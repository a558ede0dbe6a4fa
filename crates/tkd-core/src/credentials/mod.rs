//! Credential providers: produce the browser session cookies for an origin.
//!
//! The downloader only sees a `CookieJar`; where it came from (Chrome profile,
//! HAR export) is decided once at startup. Any failure here is fatal to the run.

mod chrome;
mod har;
mod jar;

pub use chrome::{ChromeCookieStore, KeySource};
pub use har::HarCookies;
pub use jar::CookieJar;

use std::path::PathBuf;
use url::Url;

use crate::config::CredentialSource;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("browser cookie database not found; tried:\n{}", format_paths(.tried))]
    StoreNotFound { tried: Vec<PathBuf> },
    #[error("cookie decryption key unavailable: {0}")]
    KeyUnavailable(String),
    #[error("cookie database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse HAR {path}: {source}")]
    Har {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("origin {0} has no host")]
    NoHost(String),
    #[error("no session cookies for {origin} in {provider} (signed in?)")]
    NoSession { origin: String, provider: String },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("  {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Source of session cookies for a target origin.
pub trait CredentialProvider {
    /// Short human-readable name used in messages ("chrome", "har").
    fn name(&self) -> &str;

    /// Cookies currently stored for `origin`. An empty result is `NoSession`.
    fn cookies_for(&self, origin: &Url) -> Result<CookieJar, CredentialError>;
}

/// Builds the provider selected in configuration.
pub fn provider_from_config(source: &CredentialSource) -> Box<dyn CredentialProvider> {
    match source {
        CredentialSource::Chrome { db_path } => {
            Box::new(ChromeCookieStore::new(db_path.clone(), KeySource::Platform))
        }
        CredentialSource::Har { path } => Box::new(HarCookies::new(path.clone())),
    }
}

/// True if a cookie stored for `cookie_domain` (leading dot allowed) is sent to `host`.
pub(crate) fn domain_matches(cookie_domain: &str, host: &str) -> bool {
    let domain = cookie_domain.trim_start_matches('.').to_ascii_lowercase();
    let host = host.to_ascii_lowercase();
    if domain.is_empty() {
        return false;
    }
    host == domain
        || host
            .strip_suffix(&domain)
            .map(|prefix| prefix.ends_with('.'))
            .unwrap_or(false)
}

pub(crate) fn origin_host(origin: &Url) -> Result<String, CredentialError> {
    origin
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| CredentialError::NoHost(origin.to_string()))
}

pub(crate) fn non_empty(
    jar: CookieJar,
    origin: &Url,
    provider: &str,
) -> Result<CookieJar, CredentialError> {
    if jar.is_empty() {
        return Err(CredentialError::NoSession {
            origin: origin.to_string(),
            provider: provider.to_string(),
        });
    }
    Ok(jar)
}
