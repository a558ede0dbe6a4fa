//! Cookie name/value set and `Cookie` header rendering.

use std::collections::BTreeMap;

/// Cookies for one origin, keyed by name. Later inserts replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: BTreeMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Adds every `name=value` pair of a raw `Cookie` header value (`a=b; c=d`).
    pub fn extend_from_header(&mut self, header_value: &str) {
        for pair in header_value.split(';') {
            if let Some((name, value)) = pair.split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    self.insert(name, value.trim());
                }
            }
        }
    }

    /// Renders the `Cookie` header value.
    ///
    /// Pairs with control or non-ASCII bytes are skipped; curl would reject the
    /// whole header otherwise.
    pub fn header_value(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .filter(|pair| pair.bytes().all(|b| (0x20..0x7f).contains(&b)))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CookieJar {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut jar = CookieJar::new();
        for (k, v) in iter {
            jar.insert(k, v);
        }
        jar
    }
}
