//! Locales and locale-aware permalinks.
//!
//! A document becomes one [`Resource`](crate::resource::Resource) per locale it
//! is published in. [`LocaleResolver`] decides which locales those are and the
//! URL of each:
//!
//! ```text
//! second-level-page.en.md  ->  /second-level-page/
//! second-level-page.fr.md  ->  /fr/second-level-page/
//! ```

mod permalink;
mod resolve;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{LocaleEntry, SiteConfig};

pub use resolve::LocaleResolver;

/// A language/region tag; exactly one per site is the default.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    tag: Arc<str>,
    default: bool,
}

impl Locale {
    pub fn new(tag: impl Into<Arc<str>>, default: bool) -> Self {
        Self {
            tag: tag.into(),
            default,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub const fn is_default(&self) -> bool {
        self.default
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

impl Serialize for Locale {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.tag.serialize(serializer)
    }
}

/// The site's locales in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSet {
    locales: Vec<Locale>,
    default: usize,
}

impl LocaleSet {
    /// Build from validated config entries.
    ///
    /// Without entries the set is `en` alone; without a default the first wins.
    pub fn from_entries(entries: &[LocaleEntry]) -> Self {
        if entries.is_empty() {
            return Self {
                locales: vec![Locale::new("en", true)],
                default: 0,
            };
        }
        let default = entries.iter().position(|e| e.default).unwrap_or(0);
        let locales = entries
            .iter()
            .enumerate()
            .map(|(i, e)| Locale::new(e.tag.as_str(), i == default))
            .collect();
        Self { locales, default }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::from_entries(&config.locales)
    }

    pub fn default_locale(&self) -> &Locale {
        &self.locales[self.default]
    }

    pub fn get(&self, tag: &str) -> Option<&Locale> {
        self.locales.iter().find(|l| l.tag() == tag)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Locale> {
        self.locales.iter()
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}

impl Default for LocaleSet {
    fn default() -> Self {
        Self::from_entries(&[])
    }
}
