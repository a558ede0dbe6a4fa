//! HTTP HEAD / metadata probing.
//!
//! Uses the curl crate (libcurl) to fetch the final response headers of a
//! part URL: size, content type and the filename hint. An HTML answer or a
//! 4xx means the session cookies were refused. Any other status is left for
//! the GET to judge.

mod parse;

use std::str;
use std::time::Duration;

use url::Url;

use crate::error::FetchError;
use crate::session::Session;

use parse::parse_headers;
pub(crate) use parse::status_code;

/// Headers of the last response in the redirect chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadResult {
    /// Final HTTP status.
    pub status: u32,
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    /// `Content-Disposition` value if present (filename hint).
    pub content_disposition: Option<String>,
    /// URL after following redirects.
    pub effective_url: Option<String>,
}

impl HeadResult {
    /// Expected size, with a missing or zero `Content-Length` treated as unknown.
    pub fn expected_len(&self) -> Option<u64> {
        self.content_length.filter(|&n| n > 0)
    }

    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|t| t.trim().to_ascii_lowercase().starts_with("text/html"))
            .unwrap_or(false)
    }
}

/// Performs a HEAD request with the session cookies and returns parsed metadata.
///
/// Follows redirects. Runs in the current thread.
pub fn probe(session: &Session, url: &Url, timeout: Duration) -> Result<HeadResult, FetchError> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = session.easy(url.as_str())?;
    easy.nobody(true)?; // HEAD request
    easy.connect_timeout(timeout)?;
    easy.timeout(timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let mut result = parse_headers(&headers);
    result.status = easy.response_code()?;
    result.effective_url = easy.effective_url()?.map(str::to_string);

    check(result)
}

/// Maps a probe response to an error when the session was refused.
///
/// A non-2xx answer outside 4xx (a flaky 5xx, an unfollowed 3xx) passes
/// through without its `Content-Length`, which describes the error body.
fn check(mut head: HeadResult) -> Result<HeadResult, FetchError> {
    if (400..=499).contains(&head.status) {
        return Err(FetchError::AuthRejected {
            status: head.status,
        });
    }
    if head.is_html() {
        return Err(FetchError::AuthRedirect {
            url: head.effective_url.unwrap_or_default(),
        });
    }
    if !(200..=299).contains(&head.status) {
        tracing::debug!(status = head.status, "probe not successful, leaving it to the GET");
        head.content_length = None;
    }
    Ok(head)
}
