use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::retry::RetryPolicy;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("xdg base directories: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
    #[error("config io ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("serialize default config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("{field} is not set (edit the config file or pass --{flag})")]
    Missing { field: &'static str, flag: &'static str },
    #[error("{field} is not a valid URL: {source}")]
    BadUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("no home directory; set dest_dir explicitly")]
    NoHome,
}

/// Retry parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per part, including the first.
    pub max_attempts: u32,
    /// Flat pause between attempts, in seconds.
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay_secs: 10,
        }
    }
}

/// Where session cookies come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum CredentialSource {
    /// Local Chrome/Chromium profile. `db_path` overrides discovery of the Cookies database.
    Chrome {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        db_path: Option<PathBuf>,
    },
    /// HAR export taken from the browser network panel while signed in.
    Har { path: PathBuf },
}

impl Default for CredentialSource {
    fn default() -> Self {
        CredentialSource::Chrome { db_path: None }
    }
}

/// Global configuration loaded from `~/.config/tkd/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TkdConfig {
    /// Download endpoint; part parameters are appended as a query string.
    pub base_url: String,
    /// Export job identifier (`j` query parameter).
    pub job_id: String,
    /// Account identifier (`user` query parameter).
    pub user_id: String,
    /// Number of parts in the export; valid indices are `0..total_parts`.
    pub total_parts: usize,
    /// Destination directory. Defaults to `~/Downloads`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_dir: Option<PathBuf>,
    /// Origin whose browser cookies authenticate the requests.
    pub cookie_origin: String,
    pub user_agent: String,
    /// Total timeout of the HEAD probe.
    pub probe_timeout_secs: u64,
    /// Connect timeout and stall timeout of the GET transfer.
    pub transfer_timeout_secs: u64,
    /// Read/write chunk size for the body stream in bytes.
    pub chunk_size: usize,
    /// Wait before each part until this many GB are free in `dest_dir`. Off when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_free_gb: Option<u64>,
    pub retry: RetryConfig,
    pub credentials: CredentialSource,
}

pub const DEFAULT_BASE_URL: &str = "https://takeout.google.com/takeout/download";
pub const DEFAULT_COOKIE_ORIGIN: &str = "https://takeout.google.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

impl Default for TkdConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            job_id: String::new(),
            user_id: String::new(),
            total_parts: 99,
            dest_dir: None,
            cookie_origin: DEFAULT_COOKIE_ORIGIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            probe_timeout_secs: 30,
            transfer_timeout_secs: 60,
            chunk_size: 1024 * 1024,
            min_free_gb: None,
            retry: RetryConfig::default(),
            credentials: CredentialSource::default(),
        }
    }
}

impl TkdConfig {
    /// Checks required fields and value ranges. Called once before the run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.job_id.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "job_id",
                flag: "job-id",
            });
        }
        if self.user_id.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "user_id",
                flag: "user-id",
            });
        }
        self.base_url()?;
        self.cookie_origin()?;
        if self.total_parts == 0 {
            return Err(ConfigError::Invalid {
                field: "total_parts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "retry.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                field: "chunk_size",
                reason: "must be at least 1 byte".to_string(),
            });
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|source| ConfigError::BadUrl {
            field: "base_url",
            source,
        })
    }

    pub fn cookie_origin(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.cookie_origin).map_err(|source| ConfigError::BadUrl {
            field: "cookie_origin",
            source,
        })
    }

    /// Destination directory: `dest_dir` if set, else `~/Downloads`.
    pub fn resolved_dest_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.dest_dir {
            Some(dir) => Ok(dir.clone()),
            None => home::home_dir()
                .map(|h| h.join("Downloads"))
                .ok_or(ConfigError::NoHome),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            delay: Duration::from_secs(self.retry.delay_secs),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tkd")?;
    xdg_dirs
        .place_config_file("config.toml")
        .map_err(|source| ConfigError::Io {
            path: xdg_dirs.get_config_home(),
            source,
        })
}

/// Load configuration from the default location, creating a default file if none exists.
pub fn load_or_init() -> Result<TkdConfig, ConfigError> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TkdConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, toml).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file. Missing keys take their defaults.
pub fn load_from_path(path: &Path) -> Result<TkdConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
