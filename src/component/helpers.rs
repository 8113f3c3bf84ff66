//! URL helpers available while rendering.

use std::sync::Arc;

use url::Url;

use crate::core::UrlPath;
use crate::locale::Locale;
use crate::site::SiteContext;
use crate::utils::path::route::{is_external_link, split_path_suffix};

/// Capabilities a render context offers to components and templates.
pub trait HelperProvider: Send + Sync {
    /// `path` under the site's base path. External links are returned unchanged.
    fn relative_url(&self, path: &str) -> String;

    /// [`relative_url`](Self::relative_url) prefixed with the site's origin.
    fn absolute_url(&self, path: &str) -> String;

    /// `path` as seen by the locale `tag`.
    fn localized_url(&self, path: &str, tag: &str) -> String;

    /// Locale of the page being rendered.
    fn locale(&self) -> &Locale;
}

/// Helpers backed by a site's configuration.
pub struct SiteHelpers {
    site: Arc<SiteContext>,
    locale: Locale,
}

impl SiteHelpers {
    pub fn new(site: Arc<SiteContext>, locale: Option<Locale>) -> Self {
        let locale = locale.unwrap_or_else(|| site.locales().default_locale().clone());
        Self { site, locale }
    }
}

impl HelperProvider for SiteHelpers {
    fn relative_url(&self, path: &str) -> String {
        if is_external_link(path) || path.starts_with('#') || path.starts_with('?') {
            return path.to_string();
        }
        let (path, suffix) = split_path_suffix(path);
        let url = UrlPath::from_permalink(path).with_prefix(&self.site.config.base_path);
        format!("{}{suffix}", url.to_encoded())
    }

    fn absolute_url(&self, path: &str) -> String {
        if is_external_link(path) {
            return path.to_string();
        }
        let relative = self.relative_url(path);
        // The path part of `url` already went into `base_path`
        match self.site.config.url.as_deref().map(Url::parse) {
            Some(Ok(url)) => format!("{}{relative}", url.origin().ascii_serialization()),
            _ => relative,
        }
    }

    fn localized_url(&self, path: &str, tag: &str) -> String {
        match self.site.locales().get(tag) {
            Some(locale) if !locale.is_default() => {
                let (path, suffix) = split_path_suffix(path);
                let localized = UrlPath::from_permalink(path).with_prefix(&format!("/{tag}"));
                self.relative_url(&format!("{localized}{suffix}"))
            }
            _ => self.relative_url(path),
        }
    }

    fn locale(&self) -> &Locale {
        &self.locale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LocaleEntry, SiteConfig};

    fn helpers(base_path: &str, url: Option<&str>) -> SiteHelpers {
        let mut config = SiteConfig::default();
        config.base_path = base_path.into();
        config.url = url.map(Into::into);
        config.locales = vec![LocaleEntry::new("en", true), LocaleEntry::new("fr", false)];
        SiteHelpers::new(Arc::new(SiteContext::new(Arc::new(config))), None)
    }

    #[test]
    fn test_relative_url() {
        let h = helpers("/basefolder", None);
        assert_eq!(h.relative_url("/about/"), "/basefolder/about/");
        assert_eq!(h.relative_url("about.html#team"), "/basefolder/about.html#team");
        assert_eq!(h.relative_url("/"), "/basefolder/");
        assert_eq!(h.relative_url("https://x.org/a"), "https://x.org/a");
        assert_eq!(h.relative_url("#top"), "#top");
        assert_eq!(helpers("/", None).relative_url("/about/"), "/about/");
    }

    #[test]
    fn test_relative_url_encodes() {
        let h = helpers("/", None);
        assert_eq!(h.relative_url("/posts/中文/"), "/posts/%E4%B8%AD%E6%96%87/");
    }

    #[test]
    fn test_absolute_url() {
        let h = helpers("/project", Some("https://user.github.io/project"));
        assert_eq!(h.absolute_url("/about/"), "https://user.github.io/project/about/");
        assert_eq!(helpers("/", None).absolute_url("/about/"), "/about/");
    }

    #[test]
    fn test_localized_url() {
        let h = helpers("/docs", None);
        assert_eq!(h.localized_url("/guide/", "fr"), "/docs/fr/guide/");
        assert_eq!(h.localized_url("/guide/", "en"), "/docs/guide/");
        assert_eq!(h.localized_url("/guide/", "xx"), "/docs/guide/");
        assert_eq!(h.locale().tag(), "en");
    }
}
