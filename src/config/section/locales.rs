//! `[[locales]]` option.
//!
//! ```toml
//! [[locales]]
//! tag = "en"
//! default = true
//!
//! [[locales]]
//! tag = "fr"
//! ```

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Front matter keywords that select every locale; never valid as a tag.
const RESERVED_TAGS: &[&str] = &["multi", "all"];

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+(?:[-_][A-Za-z0-9]+)*$").expect("valid regex"));

/// One configured locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleEntry {
    pub tag: String,
    #[serde(default)]
    pub default: bool,
}

impl LocaleEntry {
    const FIELD: FieldPath = FieldPath::new("locales");

    pub fn new(tag: impl Into<String>, default: bool) -> Self {
        Self {
            tag: tag.into(),
            default,
        }
    }

    /// Check tags are well formed and unique, with exactly one default.
    pub fn validate_all(entries: &[Self], diag: &mut ConfigDiagnostics) {
        if entries.is_empty() {
            diag.error(Self::FIELD, "at least one locale is required");
            return;
        }

        let mut seen = FxHashSet::default();
        for entry in entries {
            if !TAG_PATTERN.is_match(&entry.tag) {
                diag.error_with_hint(
                    Self::FIELD,
                    format!("invalid locale tag `{}`", entry.tag),
                    "tags are letters and digits joined by `-` or `_`, e.g. `en` or `pt-BR`",
                );
            } else if RESERVED_TAGS.contains(&entry.tag.as_str()) {
                diag.error(
                    Self::FIELD,
                    format!("`{}` is reserved for selecting every locale", entry.tag),
                );
            }
            if !seen.insert(entry.tag.as_str()) {
                diag.error(Self::FIELD, format!("duplicate locale tag `{}`", entry.tag));
            }
        }

        let defaults: Vec<_> = entries.iter().filter(|e| e.default).collect();
        match defaults.len() {
            1 => {}
            0 => diag.error_with_hint(
                Self::FIELD,
                "no default locale",
                "mark exactly one locale with `default = true`",
            ),
            _ => diag.error(
                Self::FIELD,
                format!(
                    "exactly one locale must be the default, found: {}",
                    defaults.iter().map(|e| e.tag.as_str()).collect::<Vec<_>>().join(", ")
                ),
            ),
        }
    }
}

/// Locales used when the config declares none.
pub fn default_locales() -> Vec<LocaleEntry> {
    vec![LocaleEntry::new("en", true)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    fn check(entries: &[LocaleEntry]) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();
        LocaleEntry::validate_all(entries, &mut diag);
        diag
    }

    #[test]
    fn test_default_locales_when_missing() {
        let config = test_parse_config("");
        assert_eq!(config.locales, default_locales());
    }

    #[test]
    fn test_parse_locales() {
        let config = test_parse_config(
            "[[locales]]\ntag = \"en\"\ndefault = true\n[[locales]]\ntag = \"fr\"",
        );
        assert_eq!(
            config.locales,
            vec![LocaleEntry::new("en", true), LocaleEntry::new("fr", false)]
        );
        assert!(!check(&config.locales).has_errors());
    }

    #[test]
    fn test_exactly_one_default() {
        assert!(check(&[LocaleEntry::new("en", false), LocaleEntry::new("fr", false)]).has_errors());
        assert!(check(&[LocaleEntry::new("en", true), LocaleEntry::new("fr", true)]).has_errors());
        assert!(!check(&[LocaleEntry::new("en", false), LocaleEntry::new("fr", true)]).has_errors());
    }

    #[test]
    fn test_invalid_and_duplicate_tags() {
        let diag = check(&[
            LocaleEntry::new("en", true),
            LocaleEntry::new("en", false),
            LocaleEntry::new("fr/ca", false),
            LocaleEntry::new("multi", false),
        ]);
        assert_eq!(diag.errors().len(), 3);
    }

    #[test]
    fn test_region_tags_allowed() {
        assert!(!check(&[LocaleEntry::new("pt-BR", true), LocaleEntry::new("zh_Hant", false)]).has_errors());
    }
}
