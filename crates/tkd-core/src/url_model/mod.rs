//! Part addressing and filename derivation.
//!
//! A part URL is a pure function of its index; the local filename comes from
//! the probe's Content-Disposition, sanitized for the filesystem, or falls
//! back to a synthesized index-based name.

mod content_disposition;
mod sanitize;

pub use content_disposition::filename_from_content_disposition;
pub use sanitize::sanitize_filename;

use url::Url;

/// Builds `base?j=<job>&i=<index>&user=<user>` for every part of one export job.
#[derive(Debug, Clone)]
pub struct PartUrl {
    base: Url,
    job_id: String,
    user_id: String,
}

impl PartUrl {
    pub fn new(base: Url, job_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            base,
            job_id: job_id.into(),
            user_id: user_id.into(),
        }
    }

    pub fn url_for(&self, index: usize) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("j", &self.job_id)
            .append_pair("i", &index.to_string())
            .append_pair("user", &self.user_id);
        url
    }
}

/// Name used when the server does not supply one: `takeout-part-007.zip`.
pub fn fallback_filename(index: usize) -> String {
    format!("takeout-part-{:03}.zip", index)
}

/// Local filename for part `index`: server-supplied (sanitized) or the fallback.
pub fn part_filename(content_disposition: Option<&str>, index: usize) -> String {
    content_disposition
        .and_then(filename_from_content_disposition)
        .map(|raw| sanitize_filename(&raw))
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .unwrap_or_else(|| fallback_filename(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> PartUrl {
        PartUrl::new(
            Url::parse("https://takeout.google.com/takeout/download").unwrap(),
            "65a591a2-job",
            "1183297",
        )
    }

    #[test]
    fn url_carries_job_index_and_user() {
        let url = template().url_for(7);
        assert_eq!(
            url.as_str(),
            "https://takeout.google.com/takeout/download?j=65a591a2-job&i=7&user=1183297"
        );
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("i".to_string(), "7".to_string())));
        assert!(pairs.contains(&("j".to_string(), "65a591a2-job".to_string())));
        assert!(pairs.contains(&("user".to_string(), "1183297".to_string())));
    }

    #[test]
    fn url_is_pure_function_of_index() {
        let t = template();
        for i in 0..99 {
            assert_eq!(t.url_for(i), t.url_for(i));
            assert_eq!(t.url_for(i), template().url_for(i));
        }
        assert_ne!(t.url_for(1), t.url_for(2));
    }

    #[test]
    fn url_replaces_existing_query() {
        let t = PartUrl::new(
            Url::parse("http://127.0.0.1:8080/dl?stale=1").unwrap(),
            "j b",
            "u",
        );
        assert_eq!(t.url_for(0).as_str(), "http://127.0.0.1:8080/dl?j=j+b&i=0&user=u");
    }

    #[test]
    fn fallback_name_is_zero_padded() {
        assert_eq!(part_filename(None, 7), "takeout-part-007.zip");
        assert_eq!(part_filename(Some("attachment"), 42), "takeout-part-042.zip");
        assert_eq!(fallback_filename(98), "takeout-part-098.zip");
    }

    #[test]
    fn server_name_is_sanitized() {
        assert_eq!(
            part_filename(Some("attachment; filename=\"takeout-001.zip\""), 1),
            "takeout-001.zip"
        );
        assert_eq!(
            part_filename(Some("attachment; filename=\"../etc/passwd\""), 3),
            "etc_passwd"
        );
        assert_eq!(part_filename(Some("attachment; filename=\"..\""), 3), "takeout-part-003.zip");
    }
}
