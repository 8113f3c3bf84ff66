//! URL processing utilities.
//!
//! - Link type detection (external vs internal)
//! - Fragment/query splitting

/// Check if a link is external (has a URL scheme like http:, mailto:, etc.)
///
/// A valid scheme must:
/// - Have at least 1 character before the colon
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
///
/// Protocol-relative links (`//cdn.example.com/x.js`) count as external too.
#[inline]
pub fn is_external_link(link: &str) -> bool {
    link.starts_with("//")
        || link.find(':').is_some_and(|pos| {
            pos > 0
                && link[..pos]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        })
}

/// Split a URL into path and suffix (`?query` and/or `#fragment`, delimiter included).
///
/// # Examples
/// ```ignore
/// assert_eq!(split_path_suffix("/about#team"), ("/about", "#team"));
/// assert_eq!(split_path_suffix("/about"), ("/about", ""));
/// ```
#[inline]
pub fn split_path_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    }
}
