//! Discovery of the Chrome `Cookies` database in the default profile.

use std::path::{Path, PathBuf};

use crate::credentials::CredentialError;

/// Candidate locations under `home`, newest layout (`Network/Cookies`) first.
pub(super) fn candidates(home: &Path) -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    let roots = [
        "Library/Application Support/Google/Chrome/Default",
        "Library/Application Support/Google/Chrome/Profile 1",
        "Library/Application Support/Chromium/Default",
    ];
    #[cfg(not(target_os = "macos"))]
    let roots = [
        ".config/google-chrome/Default",
        ".config/google-chrome/Profile 1",
        ".config/chromium/Default",
    ];

    roots
        .iter()
        .flat_map(|root| {
            let root = home.join(root);
            [root.join("Network").join("Cookies"), root.join("Cookies")]
        })
        .collect()
}

pub(super) fn find_cookies_db() -> Result<PathBuf, CredentialError> {
    let home = home::home_dir().ok_or_else(|| CredentialError::StoreNotFound { tried: Vec::new() })?;
    let tried = candidates(&home);
    match tried.iter().find(|p| p.is_file()) {
        Some(p) => Ok(p.clone()),
        None => Err(CredentialError::StoreNotFound { tried }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_prefer_network_dir() {
        let list = candidates(Path::new("/home/u"));
        assert_eq!(list.len(), 6);
        assert!(list[0].ends_with("Default/Network/Cookies"));
        assert!(list[1].ends_with("Default/Cookies"));
        assert!(list.iter().all(|p| p.starts_with("/home/u")));
    }
}
