//! Locale-aware permalinks.
//!
//! A URL is built in three steps:
//!
//! 1. the explicit `permalink` front matter, else the style pattern of the
//!    document's collection, with `:placeholders` expanded
//! 2. `/<tag>` in front for every locale but the default
//! 3. `base_path` in front of everything
//!
//! Because both prefixes are plain concatenation, a URL built with
//! `base_path = "/docs"` equals `/docs` + the URL built with `base_path = "/"`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::{PAGES_COLLECTION, PermalinkStyle};
use crate::core::{PipelineResult, UrlPath};
use crate::resource::{DocumentMeta, SourceDocument};
use crate::utils::date::DateTimeUtc;
use crate::utils::path::slug::{slugify, slugify_segment};

use super::{Locale, LocaleResolver};

const POSTS_COLLECTION: &str = "posts";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-z_]+)").expect("valid regex"));

/// Default patterns per style, for pages, posts and other collections.
const PRETTY: [&str; 3] = [
    "/:path/",
    "/:categories/:year/:month/:day/:slug/",
    "/:collection/:path/",
];
const SIMPLE: [&str; 3] = [
    "/:path.html",
    "/:categories/:slug.html",
    "/:collection/:path.html",
];

impl LocaleResolver {
    /// URL of `document` in `locale` under `base_path`.
    pub fn permalink_for(
        &self,
        document: &SourceDocument,
        locale: &Locale,
        base_path: &str,
    ) -> PipelineResult<UrlPath> {
        let (_, meta) = document.localized(locale.tag())?;
        Ok(self.permalink_with(document, &meta, locale, base_path))
    }

    /// Like [`permalink_for`](Self::permalink_for) with already localized front matter.
    pub(super) fn permalink_with(
        &self,
        document: &SourceDocument,
        meta: &DocumentMeta,
        locale: &Locale,
        base_path: &str,
    ) -> UrlPath {
        let parts = PermalinkParts::new(self, document, meta, locale);

        let url = match meta.permalink.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => finish(&parts.expand(explicit)),
            _ => {
                let url = finish(&parts.expand(self.pattern_for(document.collection())));
                if self.collapses_index(document.collection()) {
                    collapse_index(url)
                } else {
                    url
                }
            }
        };

        let url = if locale.is_default() {
            url
        } else {
            url.with_prefix(&format!("/{}", locale.tag()))
        };
        url.with_prefix(base_path)
    }

    fn pattern_for(&self, collection: &str) -> &str {
        let slot = match collection {
            PAGES_COLLECTION => 0,
            POSTS_COLLECTION => 1,
            _ => 2,
        };
        match &self.style {
            PermalinkStyle::Pretty => PRETTY[slot],
            PermalinkStyle::Simple => SIMPLE[slot],
            // Pages follow the directory/file shape of the custom pattern
            PermalinkStyle::Custom(pattern) if slot == 0 => {
                if pattern.ends_with('/') {
                    PRETTY[0]
                } else {
                    SIMPLE[0]
                }
            }
            PermalinkStyle::Custom(pattern) => pattern,
        }
    }

    fn collapses_index(&self, collection: &str) -> bool {
        match &self.style {
            PermalinkStyle::Pretty => true,
            PermalinkStyle::Simple => false,
            PermalinkStyle::Custom(pattern) => {
                collection == PAGES_COLLECTION && pattern.ends_with('/')
            }
        }
    }
}

/// Placeholder values for one (document, locale).
struct PermalinkParts {
    collection: String,
    path: String,
    name: String,
    slug: String,
    title: String,
    date: Option<DateTimeUtc>,
    categories: String,
    locale: String,
}

impl PermalinkParts {
    fn new(
        resolver: &LocaleResolver,
        document: &SourceDocument,
        meta: &DocumentMeta,
        locale: &Locale,
    ) -> Self {
        let path = resolver.strip_locale_suffix(document.collection_path());
        let name = path.rsplit('/').next().unwrap_or(path);

        let prefixed = DateTimeUtc::split_filename_prefix(name);
        let date = meta
            .date
            .as_deref()
            .and_then(DateTimeUtc::parse)
            .or(prefixed.map(|(date, _)| date));
        let bare_name = prefixed.map_or(name, |(_, rest)| rest);

        let slug = meta
            .slug
            .as_deref()
            .map(slugify_segment)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify_segment(bare_name));
        let title = meta
            .title
            .as_deref()
            .map(slugify)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slug.clone());
        let categories = meta
            .categories
            .iter()
            .map(|c| slugify_segment(c))
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("/");

        Self {
            collection: document.collection().to_string(),
            path: path.to_string(),
            name: name.to_string(),
            slug,
            title,
            date,
            categories,
            locale: locale.tag().to_string(),
        }
    }

    /// Replace known `:placeholders`; unknown ones are kept literally.
    fn expand(&self, pattern: &str) -> String {
        PLACEHOLDER
            .replace_all(pattern, |caps: &Captures| {
                match &caps[1] {
                    "collection" => self.collection.clone(),
                    "path" => self.path.clone(),
                    "name" => self.name.clone(),
                    "slug" => self.slug.clone(),
                    "title" => self.title.clone(),
                    "categories" => self.categories.clone(),
                    "locale" => self.locale.clone(),
                    "year" => self.date.map(|d| format!("{:04}", d.year)).unwrap_or_default(),
                    "month" => self.date.map(|d| format!("{:02}", d.month)).unwrap_or_default(),
                    "day" => self.date.map(|d| format!("{:02}", d.day)).unwrap_or_default(),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

/// Normalize slashes; URLs whose last segment has no extension become directories.
fn finish(expanded: &str) -> UrlPath {
    let url = UrlPath::from_permalink(expanded);
    let last = url.as_str().rsplit('/').next().unwrap_or_default();
    if url.is_page_url() || last.contains('.') {
        url
    } else {
        UrlPath::from_page(url.as_str())
    }
}

/// `/about/index/` -> `/about/`, `/index/` -> `/`.
fn collapse_index(url: UrlPath) -> UrlPath {
    match url.as_str().strip_suffix("index/") {
        Some(parent) if parent.ends_with('/') => UrlPath::from_page(parent),
        _ => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocaleEntry;
    use crate::locale::LocaleSet;
    use crate::resource::JsonMap;
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    fn resolver(style: PermalinkStyle) -> LocaleResolver {
        LocaleResolver::new(
            LocaleSet::from_entries(&[
                LocaleEntry::new("en", true),
                LocaleEntry::new("fr", false),
                LocaleEntry::new("de", false),
            ]),
            style,
        )
    }

    fn doc(path: &str, collection: &str, front: serde_json::Value) -> Arc<SourceDocument> {
        let front: JsonMap = front.as_object().cloned().unwrap_or_default();
        Arc::new(SourceDocument::new(path, collection, front, "").unwrap())
    }

    fn urls(resolver: &LocaleResolver, doc: Arc<SourceDocument>, base: &str) -> Vec<String> {
        resolver
            .localize(doc, base)
            .unwrap()
            .iter()
            .map(|r| r.relative_url().to_string())
            .collect()
    }

    #[test]
    fn test_locale_suffixed_files() {
        let r = resolver(PermalinkStyle::Pretty);
        let en = doc("second-level-page.en.md", "pages", json!({}));
        let fr = doc("second-level-page.fr.md", "pages", json!({}));
        assert_eq!(urls(&r, en, "/"), ["/second-level-page/"]);
        assert_eq!(urls(&r, fr, "/"), ["/fr/second-level-page/"]);
    }

    #[test]
    fn test_multi_locale_under_base_path() {
        let r = resolver(PermalinkStyle::Pretty);
        let d = doc("multi-page.md", "pages", json!({"locales": ["en", "fr"]}));
        assert_eq!(
            urls(&r, d, "/basefolder"),
            ["/basefolder/multi-page/", "/basefolder/fr/multi-page/"]
        );
    }

    #[test]
    fn test_pretty_index_collapses() {
        let r = resolver(PermalinkStyle::Pretty);
        assert_eq!(urls(&r, doc("index.md", "pages", json!({})), "/"), ["/"]);
        assert_eq!(
            urls(&r, doc("about/index.html", "pages", json!({})), "/"),
            ["/about/"]
        );
        assert_eq!(
            urls(&r, doc("index.fr.md", "pages", json!({})), "/docs"),
            ["/docs/fr/"]
        );
    }

    #[test]
    fn test_simple_style() {
        let r = resolver(PermalinkStyle::Simple);
        assert_eq!(
            urls(&r, doc("docs/intro.md", "pages", json!({})), "/"),
            ["/docs/intro.html"]
        );
        assert_eq!(
            urls(&r, doc("index.md", "pages", json!({})), "/"),
            ["/index.html"]
        );
        assert_eq!(
            urls(&r, doc("_guides/setup.md", "guides", json!({})), "/"),
            ["/guides/setup.html"]
        );
    }

    #[test]
    fn test_posts_use_date_prefix_and_categories() {
        let r = resolver(PermalinkStyle::Pretty);
        let post = doc(
            "_posts/2024-06-15-hello-world.md",
            "posts",
            json!({"categories": "Release Notes"}),
        );
        assert_eq!(urls(&r, post, "/"), ["/release/notes/2024/06/15/hello-world/"]);

        let undated = doc("_posts/draft-idea.md", "posts", json!({}));
        assert_eq!(urls(&r, undated, "/"), ["/draft-idea/"]);
    }

    #[test]
    fn test_front_matter_date_wins() {
        let r = resolver(PermalinkStyle::Simple);
        let post = doc(
            "_posts/2024-06-15-hello.md",
            "posts",
            json!({"date": "2023-01-02 10:00:00", "slug": "Hi There"}),
        );
        assert_eq!(urls(&r, post, "/"), ["/hi-there.html"]);

        let r = resolver(PermalinkStyle::Custom("/:year/:month/:day/:slug/".into()));
        let post = doc(
            "_posts/2024-06-15-hello.md",
            "posts",
            json!({"date": "2023-01-02 10:00:00"}),
        );
        assert_eq!(urls(&r, post, "/"), ["/2023/01/02/hello/"]);
    }

    #[test]
    fn test_collection_pattern() {
        let r = resolver(PermalinkStyle::Pretty);
        let d = doc("_docs/api/intro.fr.md", "docs", json!({}));
        assert_eq!(urls(&r, d, "/"), ["/fr/docs/api/intro/"]);
    }

    #[test]
    fn test_custom_style_pages_follow_shape() {
        let r = resolver(PermalinkStyle::Custom("/:collection/:title".into()));
        assert_eq!(
            urls(&r, doc("about.md", "pages", json!({})), "/"),
            ["/about.html"]
        );
        assert_eq!(
            urls(&r, doc("_docs/a.md", "docs", json!({"title": "Getting Started"})), "/"),
            ["/docs/getting-started/"]
        );
    }

    #[test]
    fn test_explicit_permalink_gets_locale_prefix() {
        let r = resolver(PermalinkStyle::Pretty);
        let d = doc(
            "about.md",
            "pages",
            json!({"permalink": "/company/about-us/", "locale": "multi"}),
        );
        assert_eq!(
            urls(&r, d, "/base"),
            [
                "/base/company/about-us/",
                "/base/fr/company/about-us/",
                "/base/de/company/about-us/"
            ]
        );
    }

    #[test]
    fn test_explicit_permalink_per_locale_override() {
        let r = resolver(PermalinkStyle::Pretty);
        let d = doc(
            "about.md",
            "pages",
            json!({
                "locales": ["en", "fr"],
                "permalink": "/about-us/",
                "locale_overrides": {"fr": {"permalink": "/a-propos/"}}
            }),
        );
        assert_eq!(urls(&r, d, "/"), ["/about-us/", "/fr/a-propos/"]);
    }

    #[test]
    fn test_explicit_permalink_placeholders_and_files() {
        let r = resolver(PermalinkStyle::Pretty);
        let d = doc("feed.md", "pages", json!({"permalink": "/:locale/feed.xml"}));
        assert_eq!(urls(&r, d, "/"), ["/en/feed.xml"]);

        let d = doc("x.md", "pages", json!({"permalink": "/no/slash"}));
        assert_eq!(urls(&r, d, "/"), ["/no/slash/"]);
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        let r = resolver(PermalinkStyle::Pretty);
        let d = doc("x.md", "pages", json!({"permalink": "/:unknown/x/"}));
        assert_eq!(urls(&r, d, "/"), ["/:unknown/x/"]);
    }

    #[test]
    fn test_permalink_for_matches_localize() {
        let r = resolver(PermalinkStyle::Pretty);
        let d = doc("guide.md", "pages", json!({"locale": "multi"}));
        let fr = r.locales().get("fr").unwrap().clone();
        assert_eq!(r.permalink_for(&d, &fr, "/b").unwrap(), "/b/fr/guide/");
    }

    #[test]
    fn test_collapse_index() {
        assert_eq!(collapse_index(UrlPath::from_page("/a/index/")), "/a/");
        assert_eq!(collapse_index(UrlPath::from_page("/index/")), "/");
        assert_eq!(collapse_index(UrlPath::from_page("/reindex/")), "/reindex/");
    }

    fn doc_path() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z]{3,8}", 1..4).prop_map(|segs| format!("{}.md", segs.join("/")))
    }

    fn locale_subset() -> impl Strategy<Value = Vec<&'static str>> {
        prop::sample::subsequence(vec!["en", "fr", "de"], 1..=3)
    }

    proptest! {
        #[test]
        fn prop_base_path_is_a_plain_prefix(
            path in doc_path(),
            tags in locale_subset(),
            base in prop::collection::vec("[a-z]{1,6}", 1..3),
            simple in any::<bool>(),
        ) {
            let style = if simple { PermalinkStyle::Simple } else { PermalinkStyle::Pretty };
            let r = resolver(style);
            let d = doc(&path, "pages", json!({ "locales": tags }));
            let base = format!("/{}", base.join("/"));

            for locale in r.locales_for(&d) {
                let rooted = r.permalink_for(&d, &locale, "/").unwrap();
                let based = r.permalink_for(&d, &locale, &base).unwrap();
                prop_assert_eq!(based.as_str(), format!("{base}{rooted}"));
                prop_assert!(!based.as_str().contains("//"));
            }
        }

        #[test]
        fn prop_one_resource_per_locale_with_unique_urls(
            path in doc_path(),
            tags in locale_subset(),
        ) {
            let r = resolver(PermalinkStyle::Pretty);
            let d = doc(&path, "pages", json!({ "locales": tags.clone() }));
            let resources = r.localize(d, "/base").unwrap();

            prop_assert_eq!(resources.len(), tags.len());
            let mut seen_tags = std::collections::BTreeSet::new();
            let mut seen_urls = std::collections::BTreeSet::new();
            for resource in &resources {
                prop_assert!(seen_tags.insert(resource.locale().tag().to_string()));
                prop_assert!(seen_urls.insert(resource.relative_url().to_string()));

                let after_base = resource.relative_url().as_str().strip_prefix("/base/").unwrap();
                let first = after_base.split('/').next().unwrap_or_default();
                if resource.locale().is_default() {
                    prop_assert!(!["fr", "de"].contains(&first));
                } else {
                    prop_assert_eq!(first, resource.locale().tag());
                }
            }
        }
    }
}
