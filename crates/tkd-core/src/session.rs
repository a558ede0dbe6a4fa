//! Authenticated request settings shared by every HEAD and GET of a run.

use crate::credentials::CookieJar;

/// Cookie header and User-Agent, fixed after startup.
#[derive(Debug, Clone)]
pub struct Session {
    cookie_header: String,
    user_agent: String,
}

impl Session {
    pub fn new(cookies: &CookieJar, user_agent: impl Into<String>) -> Self {
        Self {
            cookie_header: cookies.header_value(),
            user_agent: user_agent.into(),
        }
    }

    /// Returns a curl handle for `url` carrying the session cookies, following redirects.
    pub(crate) fn easy(&self, url: &str) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.useragent(&self.user_agent)?;
        if !self.cookie_header.is_empty() {
            easy.cookie(&self.cookie_header)?;
        }
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        Ok(easy)
    }
}
