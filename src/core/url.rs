//! URL path type for type-safe permalink handling.
//!
//! - Internal representation: Always decoded (human-readable)
//! - Output boundary: Encode when writing links, map to files when writing output

use std::borrow::Borrow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::PipelineResult;
use crate::utils::path::resolve;

/// Decoded URL path (internal representation)
///
/// Invariants:
/// - Always decoded (no percent-encoding)
/// - Always starts with `/`
/// - Never contains an empty segment (`//`)
/// - Directory URLs end with `/`, file URLs (`simple` style) end with an extension
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrlPath(Arc<str>);

impl UrlPath {
    /// Create a directory URL (with trailing slash). Normalizes slashes.
    pub fn from_page(decoded: &str) -> Self {
        let normalized = Self::collapse(decoded);
        if normalized.ends_with('/') {
            Self(Arc::from(normalized))
        } else {
            Self(Arc::from(format!("{normalized}/")))
        }
    }

    /// Create a URL as written, only normalizing slashes.
    ///
    /// `/about.html` stays a file URL, `/about/` stays a directory URL.
    pub fn from_permalink(decoded: &str) -> Self {
        Self(Arc::from(Self::collapse(decoded)))
    }

    /// Ensure a leading slash, strip query/fragment and collapse repeated slashes.
    fn collapse(raw: &str) -> String {
        let path = raw.trim().split(['?', '#']).next().unwrap_or_default();

        let mut out = String::with_capacity(path.len() + 1);
        out.push('/');
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if !out.ends_with('/') {
                out.push('/');
            }
            out.push_str(segment);
        }
        if path.ends_with('/') && !out.ends_with('/') {
            out.push('/');
        }
        out
    }

    /// Get the decoded URL path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix this URL with another path (`/fr` + `/about/` -> `/fr/about/`).
    ///
    /// Empty prefixes and `/` leave the URL unchanged.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        let prefix = prefix.trim().trim_end_matches('/');
        if prefix.is_empty() {
            return self.clone();
        }
        Self::from_permalink(&format!("{prefix}{}", self.0))
    }

    /// Encode for output links (percent-encode non-ASCII and special characters).
    pub fn to_encoded(&self) -> String {
        use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
        const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');
        self.0
            .split('/')
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Check if this is a directory URL (ends with `/`).
    #[inline]
    pub fn is_page_url(&self) -> bool {
        self.0.ends_with('/')
    }

    /// Map this URL onto a file under `destination`.
    ///
    /// `/blog/hello/` -> `<destination>/blog/hello/index.html`,
    /// `/blog/hello.html` -> `<destination>/blog/hello.html`.
    /// URLs with `..` segments that would leave `destination` fail.
    pub fn output_file(&self, destination: &Path) -> PipelineResult<PathBuf> {
        let relative = self.0.trim_start_matches('/');
        if self.is_page_url() {
            resolve(destination, [relative, "index.html"])
        } else {
            resolve(destination, [relative])
        }
    }
}

impl std::fmt::Display for UrlPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for UrlPath {
    fn default() -> Self {
        Self::from_page("/")
    }
}

impl AsRef<str> for UrlPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for UrlPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for UrlPath {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for UrlPath {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl Serialize for UrlPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UrlPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_permalink(&s))
    }
}
