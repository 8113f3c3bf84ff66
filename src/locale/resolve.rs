//! Which locales a document is published in.

use std::sync::Arc;

use crate::config::{PermalinkStyle, SiteConfig};
use crate::core::PipelineResult;
use crate::log;
use crate::resource::{Resource, SourceDocument};

use super::{Locale, LocaleSet};

/// Front matter values selecting every configured locale.
const ALL_LOCALES: &[&str] = &["multi", "all"];

/// Turns documents into localized resources with their permalinks.
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    locales: LocaleSet,
    pub(super) style: PermalinkStyle,
}

impl LocaleResolver {
    pub fn new(locales: LocaleSet, style: PermalinkStyle) -> Self {
        Self { locales, style }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(LocaleSet::from_config(config), config.permalink.clone())
    }

    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    /// Locales `document` is published in, in order:
    ///
    /// 1. `locales: [..]` in front matter (unknown tags dropped, duplicates removed)
    /// 2. `locale: multi` / `locale: all` for every locale, or `locale: <tag>`
    /// 3. a `<name>.<tag>.<ext>` filename suffix naming a configured locale
    /// 4. the default locale
    ///
    /// Never empty: when every requested tag is unknown the default is used.
    pub fn locales_for(&self, document: &SourceDocument) -> Vec<Locale> {
        let meta = document.meta();
        let mut picked: Vec<Locale> = Vec::new();

        if !meta.locales.is_empty() {
            for tag in &meta.locales {
                self.pick(tag, document, &mut picked);
            }
        } else if let Some(tag) = meta.locale.as_deref() {
            self.pick(tag, document, &mut picked);
        } else if let Some(locale) = self.filename_locale(document) {
            picked.push(locale.clone());
        }

        if picked.is_empty() {
            picked.push(self.locales.default_locale().clone());
        }
        picked
    }

    fn pick(&self, tag: &str, document: &SourceDocument, picked: &mut Vec<Locale>) {
        let tag = tag.trim();
        if ALL_LOCALES.contains(&tag) {
            for locale in self.locales.iter() {
                if !picked.contains(locale) {
                    picked.push(locale.clone());
                }
            }
            return;
        }
        match self.locales.get(tag) {
            Some(locale) if !picked.contains(locale) => picked.push(locale.clone()),
            Some(_) => {}
            None => log!("warn"; "`{}`: unknown locale `{}` ignored", document.relative_path(), tag),
        }
    }

    /// Locale named by a `<name>.<tag>.<ext>` filename, if configured.
    pub fn filename_locale(&self, document: &SourceDocument) -> Option<&Locale> {
        let (_, tag) = split_suffix(document.collection_path())?;
        self.locales.get(tag)
    }

    /// Remove a configured locale suffix from the last path segment.
    ///
    /// `docs/intro.fr` -> `docs/intro`, `v1.0` stays as is.
    pub fn strip_locale_suffix<'a>(&self, path: &'a str) -> &'a str {
        match split_suffix(path) {
            Some((stem, tag)) if self.locales.get(tag).is_some() => stem,
            _ => path,
        }
    }

    /// One resource per locale of `document`, each with its permalink.
    pub fn localize(
        &self,
        document: Arc<SourceDocument>,
        base_path: &str,
    ) -> PipelineResult<Vec<Resource>> {
        self.locales_for(&document)
            .into_iter()
            .map(|locale| {
                let resource = Resource::new(Arc::clone(&document), locale)?;
                let url =
                    self.permalink_with(&document, resource.meta(), resource.locale(), base_path);
                Ok(resource.with_relative_url(url))
            })
            .collect()
    }
}

/// Split `dir/name.tag` into (`dir/name`, `tag`); the stem must not be empty.
fn split_suffix(path: &str) -> Option<(&str, &str)> {
    let (stem, tag) = path.rsplit_once('.')?;
    let name_start = stem.rfind('/').map_or(0, |i| i + 1);
    (stem.len() > name_start && !tag.contains('/')).then_some((stem, tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocaleEntry;
    use crate::resource::JsonMap;
    use serde_json::json;

    fn resolver() -> LocaleResolver {
        LocaleResolver::new(
            LocaleSet::from_entries(&[
                LocaleEntry::new("en", true),
                LocaleEntry::new("fr", false),
                LocaleEntry::new("de", false),
            ]),
            PermalinkStyle::Pretty,
        )
    }

    fn doc(path: &str, front: serde_json::Value) -> SourceDocument {
        let front: JsonMap = front.as_object().cloned().unwrap_or_default();
        SourceDocument::page(path, front, "").unwrap()
    }

    fn tags(locales: &[Locale]) -> Vec<&str> {
        locales.iter().map(Locale::tag).collect()
    }

    #[test]
    fn test_default_when_nothing_declared() {
        let locales = resolver().locales_for(&doc("about.md", json!({})));
        assert_eq!(tags(&locales), ["en"]);
    }

    #[test]
    fn test_filename_suffix() {
        let r = resolver();
        assert_eq!(tags(&r.locales_for(&doc("about.fr.md", json!({})))), ["fr"]);
        // `v1` is not a configured locale
        assert_eq!(tags(&r.locales_for(&doc("notes.v1.md", json!({})))), ["en"]);
    }

    #[test]
    fn test_locales_list_wins_over_filename() {
        let d = doc("about.fr.md", json!({"locales": ["de", "en", "de"]}));
        assert_eq!(tags(&resolver().locales_for(&d)), ["de", "en"]);
    }

    #[test]
    fn test_locale_multi_and_single() {
        let r = resolver();
        let all = r.locales_for(&doc("a.md", json!({"locale": "multi"})));
        assert_eq!(tags(&all), ["en", "fr", "de"]);
        let all = r.locales_for(&doc("a.md", json!({"locale": "all"})));
        assert_eq!(all.len(), 3);
        let single = r.locales_for(&doc("a.md", json!({"locale": "de"})));
        assert_eq!(tags(&single), ["de"]);
    }

    #[test]
    fn test_unknown_tags_dropped() {
        let r = resolver();
        let d = doc("a.md", json!({"locales": ["xx", "fr"]}));
        assert_eq!(tags(&r.locales_for(&d)), ["fr"]);

        let d = doc("a.md", json!({"locales": ["xx"]}));
        assert_eq!(tags(&r.locales_for(&d)), ["en"]);

        let d = doc("a.md", json!({"locale": "xx"}));
        assert_eq!(tags(&r.locales_for(&d)), ["en"]);
    }

    #[test]
    fn test_strip_locale_suffix() {
        let r = resolver();
        assert_eq!(r.strip_locale_suffix("docs/intro.fr"), "docs/intro");
        assert_eq!(r.strip_locale_suffix("docs/intro"), "docs/intro");
        assert_eq!(r.strip_locale_suffix("v1.0"), "v1.0");
        assert_eq!(r.strip_locale_suffix("docs/.fr"), "docs/.fr");
    }

    #[test]
    fn test_split_suffix() {
        assert_eq!(split_suffix("a/b.fr"), Some(("a/b", "fr")));
        assert_eq!(split_suffix("a.b/c"), None);
        assert_eq!(split_suffix(".fr"), None);
    }
}
