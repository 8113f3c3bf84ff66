//! URL slugification.
//!
//! - [`slugify`]: ASCII slug (Unicode transliterated), used for `:title`
//! - [`slugify_segment`]: safe slug that keeps Unicode, used for path segments

use deunicode::deunicode;

/// Transliterate to ASCII, lowercase, and join words with `-`.
///
/// `"Héllo, Wörld!"` -> `"hello-world"`
pub fn slugify(text: &str) -> String {
    join_words(&deunicode(text), char::is_ascii_alphanumeric)
}

/// Lowercase and join words with `-`, keeping Unicode letters.
///
/// Only characters that are unsafe in a URL segment are dropped.
/// `"Hello World"` -> `"hello-world"`, `"中文 标题"` -> `"中文-标题"`
pub fn slugify_segment(text: &str) -> String {
    join_words(text, |c| c.is_alphanumeric() || matches!(*c, '_' | '.' | '~'))
}

fn join_words(text: &str, keep: impl Fn(&char) -> bool) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if keep(&c) {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Héllo, Wörld!"), "hello-world");
        assert_eq!(slugify("  --Already-slugged--  "), "already-slugged");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_segment_keeps_unicode() {
        assert_eq!(slugify_segment("中文 标题"), "中文-标题");
        assert_eq!(slugify_segment("Second Level Page"), "second-level-page");
        assert_eq!(slugify_segment("second-level-page"), "second-level-page");
    }
}
