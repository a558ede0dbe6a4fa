//! Session cookies from a HAR (HTTP Archive) export.
//!
//! Useful when the browser store cannot be read directly: export the network
//! log of a signed-in Takeout page and point `[credentials] path` at it.

use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

use super::{domain_matches, non_empty, origin_host, CookieJar, CredentialError, CredentialProvider};

/// Minimal HAR 1.2 structures: only request URLs and headers are needed.
#[derive(Debug, Deserialize)]
struct HarLog {
    log: HarRoot,
}

#[derive(Debug, Deserialize)]
struct HarRoot {
    entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
struct HarEntry {
    request: HarRequest,
}

#[derive(Debug, Deserialize)]
struct HarRequest {
    url: String,
    #[serde(default)]
    headers: Vec<HarHeader>,
}

#[derive(Debug, Deserialize)]
struct HarHeader {
    name: String,
    value: String,
}

/// Reads `Cookie` request headers from a HAR file.
pub struct HarCookies {
    path: PathBuf,
}

impl HarCookies {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialProvider for HarCookies {
    fn name(&self) -> &str {
        "har"
    }

    /// Collects cookies from every entry whose request host matches the origin.
    /// Entries are applied in order, so the most recent value of a cookie wins.
    fn cookies_for(&self, origin: &Url) -> Result<CookieJar, CredentialError> {
        let host = origin_host(origin)?;
        let bytes = std::fs::read(&self.path).map_err(|source| CredentialError::Io {
            context: format!("read HAR file {}", self.path.display()),
            source,
        })?;
        let har: HarLog = serde_json::from_slice(&bytes).map_err(|source| CredentialError::Har {
            path: self.path.clone(),
            source,
        })?;

        let mut jar = CookieJar::new();
        for entry in &har.log.entries {
            let entry_host = match Url::parse(&entry.request.url) {
                Ok(u) => u.host_str().map(str::to_string),
                Err(_) => None,
            };
            let Some(entry_host) = entry_host else {
                continue;
            };
            // Same host or a parent domain; a subdomain's cookies are never sent to the origin.
            if !domain_matches(&entry_host, &host) {
                continue;
            }
            for header in &entry.request.headers {
                if header.name.eq_ignore_ascii_case("cookie") {
                    jar.extend_from_header(&header.value);
                }
            }
        }
        tracing::debug!(count = jar.len(), path = %self.path.display(), "cookies read from HAR");
        non_empty(jar, origin, self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn har_file(body: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    fn origin() -> Url {
        Url::parse("https://takeout.google.com").unwrap()
    }

    #[test]
    fn collects_cookies_for_matching_host() {
        let f = har_file(
            r#"{
            "log": {
                "version": "1.2",
                "entries": [
                    {
                        "request": {
                            "url": "https://takeout.google.com/manage",
                            "headers": [ { "name": "cookie", "value": "SID=old; HSID=h1" } ]
                        }
                    },
                    {
                        "request": {
                            "url": "https://fonts.gstatic.com/x.woff",
                            "headers": [ { "name": "Cookie", "value": "NID=other" } ]
                        }
                    },
                    {
                        "request": {
                            "url": "https://takeout.google.com/takeout/download?j=1&i=0",
                            "headers": [ { "name": "Cookie", "value": "SID=new" } ]
                        }
                    }
                ]
            }
        }"#,
        );
        let jar = HarCookies::new(f.path().to_path_buf())
            .cookies_for(&origin())
            .unwrap();
        assert_eq!(jar.get("SID"), Some("new"));
        assert_eq!(jar.get("HSID"), Some("h1"));
        assert_eq!(jar.get("NID"), None);
    }

    #[test]
    fn subdomain_entries_are_ignored() {
        let f = har_file(
            r#"{"log":{"version":"1.2","entries":[
                {"request":{"url":"https://accounts.takeout.google.com/x",
                    "headers":[{"name":"Cookie","value":"SID=sub; OSID=sub"}]}},
                {"request":{"url":"https://google.com/",
                    "headers":[{"name":"Cookie","value":"NID=parent"}]}},
                {"request":{"url":"https://takeout.google.com/",
                    "headers":[{"name":"Cookie","value":"SID=own"}]}}
            ]}}"#,
        );
        let jar = HarCookies::new(f.path().to_path_buf())
            .cookies_for(&origin())
            .unwrap();
        assert_eq!(jar.get("SID"), Some("own"));
        assert_eq!(jar.get("OSID"), None);
        assert_eq!(jar.get("NID"), Some("parent"));
    }

    #[test]
    fn no_cookie_headers_is_no_session() {
        let f = har_file(
            r#"{"log":{"version":"1.2","entries":[
                {"request":{"url":"https://takeout.google.com/","headers":[]}}
            ]}}"#,
        );
        let err = HarCookies::new(f.path().to_path_buf())
            .cookies_for(&origin())
            .unwrap_err();
        assert!(matches!(err, CredentialError::NoSession { .. }));
    }

    #[test]
    fn malformed_har_is_error() {
        let f = har_file("{not json");
        let err = HarCookies::new(f.path().to_path_buf())
            .cookies_for(&origin())
            .unwrap_err();
        assert!(matches!(err, CredentialError::Har { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = HarCookies::new(PathBuf::from("/nonexistent/takeout.har"))
            .cookies_for(&origin())
            .unwrap_err();
        assert!(matches!(err, CredentialError::Io { .. }));
    }
}
