//! One renderable (document x locale) unit.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::core::{PipelineError, PipelineResult, UrlPath};
use crate::locale::Locale;

use super::document::SourceDocument;
use super::meta::{DocumentMeta, JsonMap};

/// Identity of a resource: source path plus locale tag.
///
/// The same document in two locales gives two distinct identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    pub relative_path: Arc<str>,
    pub locale: Arc<str>,
}

impl ResourceId {
    pub fn new(relative_path: impl Into<Arc<str>>, locale: impl Into<Arc<str>>) -> Self {
        Self {
            relative_path: relative_path.into(),
            locale: locale.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.relative_path, self.locale)
    }
}

/// A localized document with its URL and, once rendered, its output.
///
/// Output can be replaced until the resource is written; afterwards it is frozen.
#[derive(Debug, Clone)]
pub struct Resource {
    id: ResourceId,
    document: Arc<SourceDocument>,
    locale: Locale,
    data: JsonMap,
    meta: DocumentMeta,
    relative_url: UrlPath,
    output: Option<String>,
    written: bool,
}

impl Resource {
    /// Create the resource of `document` for `locale`, merging that locale's overrides.
    pub fn new(document: Arc<SourceDocument>, locale: Locale) -> PipelineResult<Self> {
        let (data, meta) = document.localized(locale.tag())?;
        Ok(Self {
            id: ResourceId::new(document.relative_path(), locale.tag()),
            document,
            locale,
            data,
            meta,
            relative_url: UrlPath::default(),
            output: None,
            written: false,
        })
    }

    pub fn with_relative_url(mut self, url: UrlPath) -> Self {
        self.relative_url = url;
        self
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn document(&self) -> &Arc<SourceDocument> {
        &self.document
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn collection(&self) -> &str {
        self.document.collection()
    }

    /// Merged front matter (base plus this locale's overrides).
    pub fn data(&self) -> &JsonMap {
        &self.data
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    /// Site-relative URL, always starting with `/`.
    pub fn relative_url(&self) -> &UrlPath {
        &self.relative_url
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Store rendered output. Fails once the resource has been written.
    pub fn set_output(&mut self, output: String) -> PipelineResult<()> {
        if self.written {
            return Err(PipelineError::FrozenResource(self.id.to_string()));
        }
        self.output = Some(output);
        Ok(())
    }

    pub fn mark_written(&mut self) {
        self.written = true;
    }

    pub fn is_written(&self) -> bool {
        self.written
    }

    /// Template-facing view: merged front matter plus computed fields.
    pub fn to_value(&self) -> Value {
        let mut page = self.data.clone();
        page.insert("url".into(), Value::String(self.relative_url.to_string()));
        page.insert("locale".into(), Value::String(self.locale.tag().to_string()));
        page.insert(
            "collection".into(),
            Value::String(self.collection().to_string()),
        );
        page.insert(
            "path".into(),
            Value::String(self.document.relative_path().to_string()),
        );
        Value::Object(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(front: Value) -> Arc<SourceDocument> {
        let front = front.as_object().cloned().unwrap_or_default();
        Arc::new(SourceDocument::page("about.md", front, "Hi").unwrap())
    }

    #[test]
    fn test_identity_includes_locale() {
        let document = doc(json!({}));
        let en = Resource::new(Arc::clone(&document), Locale::new("en", true)).unwrap();
        let fr = Resource::new(document, Locale::new("fr", false)).unwrap();
        assert_ne!(en.id(), fr.id());
        assert_eq!(en.id().relative_path, fr.id().relative_path);
        assert_eq!(fr.id().to_string(), "about.md [fr]");
    }

    #[test]
    fn test_locale_overrides_merged() {
        let document = doc(json!({
            "title": "About",
            "locale_overrides": {"fr": {"title": "À propos"}}
        }));
        let fr = Resource::new(document, Locale::new("fr", false)).unwrap();
        assert_eq!(fr.meta().title.as_deref(), Some("À propos"));
        assert_eq!(fr.data()["title"], "À propos");
    }

    #[test]
    fn test_output_frozen_after_write() {
        let mut resource = Resource::new(doc(json!({})), Locale::new("en", true)).unwrap();
        resource.set_output("<p>one</p>".into()).unwrap();
        resource.set_output("<p>two</p>".into()).unwrap();
        assert_eq!(resource.output(), Some("<p>two</p>"));

        resource.mark_written();
        let err = resource.set_output("<p>three</p>".into()).unwrap_err();
        assert!(matches!(err, PipelineError::FrozenResource(_)));
        assert_eq!(resource.output(), Some("<p>two</p>"));
    }

    #[test]
    fn test_to_value_exposes_url_and_locale() {
        let resource = Resource::new(doc(json!({"title": "About"})), Locale::new("fr", false))
            .unwrap()
            .with_relative_url(UrlPath::from_page("/fr/about/"));
        let value = resource.to_value();
        assert_eq!(value["url"], "/fr/about/");
        assert_eq!(value["locale"], "fr");
        assert_eq!(value["title"], "About");
        assert_eq!(value["collection"], "pages");
    }
}
