//! Cookies from the local Chrome/Chromium profile.
//!
//! Chrome keeps a write lock on its `Cookies` SQLite database, so the file is
//! copied to a temp dir and read from there with sqlx on a private runtime.

mod decrypt;
mod locate;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::path::{Path, PathBuf};
use std::process::Command;
use url::Url;

use super::{domain_matches, non_empty, origin_host, CookieJar, CredentialError, CredentialProvider};
use decrypt::{decrypt_value, derive_key, KEY_LEN};

#[cfg(target_os = "macos")]
const PBKDF2_ITERATIONS: u32 = 1003;
#[cfg(not(target_os = "macos"))]
const PBKDF2_ITERATIONS: u32 = 1;

/// Chrome's hard-coded os_crypt password when no keyring is in use.
#[cfg(not(target_os = "macos"))]
const FALLBACK_PASSWORD: &str = "peanuts";

/// Where the cookie encryption password comes from.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// macOS Keychain ("Chrome Safe Storage") or the Linux secret service, with
    /// the built-in password for `v10` rows on Linux.
    Platform,
    /// A fixed password for every row.
    Password(String),
}

/// Derived keys per os_crypt version prefix.
struct CookieKeys {
    v10: [u8; KEY_LEN],
    v11: Option<[u8; KEY_LEN]>,
}

impl CookieKeys {
    fn for_blob(&self, blob: &[u8]) -> &[u8; KEY_LEN] {
        match blob.get(..3) {
            Some(b"v11") => self.v11.as_ref().unwrap_or(&self.v10),
            _ => &self.v10,
        }
    }
}

/// Reads session cookies from a Chrome/Chromium profile on this machine.
pub struct ChromeCookieStore {
    db_path: Option<PathBuf>,
    key_source: KeySource,
}

impl ChromeCookieStore {
    /// `db_path` overrides discovery of the `Cookies` database.
    pub fn new(db_path: Option<PathBuf>, key_source: KeySource) -> Self {
        Self { db_path, key_source }
    }

    fn keys(&self) -> Result<CookieKeys, CredentialError> {
        match &self.key_source {
            KeySource::Password(p) => {
                let key = derive_key(p, PBKDF2_ITERATIONS);
                Ok(CookieKeys {
                    v10: key,
                    v11: Some(key),
                })
            }
            KeySource::Platform => platform_keys(),
        }
    }
}

impl CredentialProvider for ChromeCookieStore {
    fn name(&self) -> &str {
        "chrome"
    }

    fn cookies_for(&self, origin: &Url) -> Result<CookieJar, CredentialError> {
        let host = origin_host(origin)?;
        let db_path = match &self.db_path {
            Some(p) => p.clone(),
            None => locate::find_cookies_db()?,
        };
        let keys = self.keys()?;

        let tmp = tempfile::tempdir().map_err(|source| CredentialError::Io {
            context: "create temp dir for cookie database".to_string(),
            source,
        })?;
        let copy = tmp.path().join("Cookies");
        std::fs::copy(&db_path, &copy).map_err(|source| CredentialError::Io {
            context: format!("copy {}", db_path.display()),
            source,
        })?;

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| CredentialError::Io {
                context: "start runtime for cookie database".to_string(),
                source,
            })?;
        let (db_version, rows) = rt.block_on(read_rows(&copy))?;

        let mut jar = CookieJar::new();
        let mut undecryptable = 0usize;
        for row in rows {
            if !domain_matches(&row.host_key, &host) {
                continue;
            }
            let value = if row.encrypted_value.is_empty() {
                row.value
            } else {
                let key = keys.for_blob(&row.encrypted_value);
                match decrypt_value(&row.encrypted_value, key, db_version, &row.host_key) {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::debug!(name = %row.name, error = %e, "skipping cookie");
                        undecryptable += 1;
                        continue;
                    }
                }
            };
            if !value.is_empty() {
                jar.insert(row.name, value);
            }
        }
        if undecryptable > 0 {
            tracing::warn!(undecryptable, "some cookies could not be decrypted");
        }
        tracing::debug!(
            count = jar.len(),
            db = %db_path.display(),
            db_version,
            "cookies read from chrome"
        );
        non_empty(jar, origin, self.name())
    }
}

struct CookieRow {
    host_key: String,
    name: String,
    value: String,
    encrypted_value: Vec<u8>,
}

async fn read_rows(path: &Path) -> Result<(i64, Vec<CookieRow>), CredentialError> {
    let opts = SqliteConnectOptions::new().filename(path).read_only(true);
    let mut conn = SqliteConnection::connect_with(&opts).await?;

    // Stored as TEXT by Chrome; a missing meta table means a very old profile.
    let db_version = sqlx::query_scalar::<_, String>(
        "SELECT CAST(value AS TEXT) FROM meta WHERE key = 'version'",
    )
    .fetch_optional(&mut conn)
    .await
    .ok()
    .flatten()
    .and_then(|v| v.trim().parse::<i64>().ok())
    .unwrap_or(0);

    let rows: Vec<(String, String, String, Vec<u8>)> = sqlx::query_as(
        "SELECT host_key, name, value, encrypted_value FROM cookies",
    )
    .fetch_all(&mut conn)
    .await?;
    conn.close().await?;

    let rows = rows
        .into_iter()
        .map(|(host_key, name, value, encrypted_value)| CookieRow {
            host_key,
            name,
            value,
            encrypted_value,
        })
        .collect();
    Ok((db_version, rows))
}

#[cfg(target_os = "macos")]
fn platform_keys() -> Result<CookieKeys, CredentialError> {
    let output = Command::new("security")
        .args(["find-generic-password", "-w", "-s", "Chrome Safe Storage"])
        .output()
        .map_err(|source| CredentialError::Io {
            context: "run `security`".to_string(),
            source,
        })?;
    if !output.status.success() {
        return Err(CredentialError::KeyUnavailable(format!(
            "Keychain item \"Chrome Safe Storage\" not readable: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    let password = String::from_utf8_lossy(&output.stdout);
    let key = derive_key(password.trim(), PBKDF2_ITERATIONS);
    Ok(CookieKeys {
        v10: key,
        v11: Some(key),
    })
}

#[cfg(not(target_os = "macos"))]
fn platform_keys() -> Result<CookieKeys, CredentialError> {
    let v10 = derive_key(FALLBACK_PASSWORD, PBKDF2_ITERATIONS);
    let keyring = Command::new("secret-tool")
        .args(["lookup", "application", "chrome"])
        .output();
    let v11 = match keyring {
        Ok(out) if out.status.success() && !out.stdout.is_empty() => {
            let password = String::from_utf8_lossy(&out.stdout);
            Some(derive_key(password.trim(), PBKDF2_ITERATIONS))
        }
        Ok(_) | Err(_) => {
            tracing::debug!("no keyring password for chrome; v11 cookies use the fallback key");
            None
        }
    };
    Ok(CookieKeys { v10, v11 })
}
