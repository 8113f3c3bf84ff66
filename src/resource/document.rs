//! Source documents as handed over by discovery.

use crate::config::PAGES_COLLECTION;
use crate::core::{PipelineError, PipelineResult};

use super::meta::{DocumentMeta, JsonMap, localized_front_matter};

/// One discovered file: `(relative path, front matter, body)`.
///
/// The relative path is taken from the source directory and uses `/`
/// separators, so `_posts/2024-06-15-hello.md` or `docs/intro.fr.md`.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    relative_path: String,
    collection: String,
    front_matter: JsonMap,
    body: String,
    meta: DocumentMeta,
}

impl SourceDocument {
    /// Build a document, checking the typed front matter fields.
    pub fn new(
        relative_path: impl Into<String>,
        collection: impl Into<String>,
        front_matter: JsonMap,
        body: impl Into<String>,
    ) -> PipelineResult<Self> {
        let relative_path = relative_path.into().replace('\\', "/");
        let meta = DocumentMeta::from_map(&front_matter).map_err(|source| {
            PipelineError::FrontMatter {
                path: relative_path.clone(),
                source: source.into(),
            }
        })?;
        Ok(Self {
            relative_path,
            collection: collection.into(),
            front_matter,
            body: body.into(),
            meta,
        })
    }

    /// A `pages` document.
    pub fn page(
        relative_path: impl Into<String>,
        front_matter: JsonMap,
        body: impl Into<String>,
    ) -> PipelineResult<Self> {
        Self::new(relative_path, PAGES_COLLECTION, front_matter, body)
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn front_matter(&self) -> &JsonMap {
        &self.front_matter
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Typed fields of the base (not localized) front matter.
    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    /// Lower-cased last extension, which selects the template engine.
    pub fn extension(&self) -> String {
        self.file_name()
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default()
    }

    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit_once('/')
            .map_or(self.relative_path.as_str(), |(_, name)| name)
    }

    /// Path inside the collection without the last extension.
    ///
    /// `_posts/2024-06-15-hello.md` -> `2024-06-15-hello`,
    /// `docs/intro.fr.md` -> `docs/intro.fr`.
    pub fn collection_path(&self) -> &str {
        let path = if self.collection == PAGES_COLLECTION {
            self.relative_path.as_str()
        } else {
            let dir = format!("_{}/", self.collection);
            self.relative_path
                .strip_prefix(dir.as_str())
                .unwrap_or(&self.relative_path)
        };
        match path.rsplit_once('.') {
            Some((stem, ext)) if !ext.contains('/') => stem,
            _ => path,
        }
    }

    /// Front matter and typed fields as seen by the locale `tag`.
    pub fn localized(&self, tag: &str) -> PipelineResult<(JsonMap, DocumentMeta)> {
        let data = localized_front_matter(&self.front_matter, tag);
        let meta = DocumentMeta::from_map(&data).map_err(|source| PipelineError::FrontMatter {
            path: self.relative_path.clone(),
            source: source.into(),
        })?;
        Ok((data, meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn front(value: serde_json::Value) -> JsonMap {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_collection_path_for_pages() {
        let doc = SourceDocument::page("docs/intro.fr.md", JsonMap::new(), "").unwrap();
        assert_eq!(doc.collection_path(), "docs/intro.fr");
        assert_eq!(doc.file_name(), "intro.fr.md");
        assert_eq!(doc.extension(), "md");
    }

    #[test]
    fn test_collection_path_strips_collection_dir() {
        let doc =
            SourceDocument::new("_posts/2024-06-15-hello.md", "posts", JsonMap::new(), "").unwrap();
        assert_eq!(doc.collection_path(), "2024-06-15-hello");
    }

    #[test]
    fn test_extensionless_file() {
        let doc = SourceDocument::page("v1.0/README", JsonMap::new(), "").unwrap();
        assert_eq!(doc.collection_path(), "v1.0/README");
        assert_eq!(doc.extension(), "");
    }

    #[test]
    fn test_windows_separators_normalized() {
        let doc = SourceDocument::page("guide\\setup.md", JsonMap::new(), "").unwrap();
        assert_eq!(doc.relative_path(), "guide/setup.md");
    }

    #[test]
    fn test_invalid_front_matter_names_the_file() {
        let err = SourceDocument::page("about.md", front(json!({"draft": 3})), "").unwrap_err();
        assert!(err.to_string().contains("about.md"));
    }

    #[test]
    fn test_numeric_title_page() {
        let source = "---\ntitle: 404\npermalink: /404.html\n---\nNot found";
        let (front_matter, body) =
            crate::resource::parse_front_matter("404.md", source).unwrap();
        let doc = SourceDocument::page("404.md", front_matter, body).unwrap();
        assert_eq!(doc.meta().title.as_deref(), Some("404"));
        assert_eq!(doc.meta().permalink.as_deref(), Some("/404.html"));
        assert_eq!(doc.body(), "Not found");
    }

    #[test]
    fn test_localized_applies_overrides() {
        let doc = SourceDocument::page(
            "about.md",
            front(json!({
                "permalink": "/about/",
                "locale_overrides": {"fr": {"permalink": "/a-propos/"}}
            })),
            "",
        )
        .unwrap();
        let (_, fr) = doc.localized("fr").unwrap();
        let (_, en) = doc.localized("en").unwrap();
        assert_eq!(fr.permalink.as_deref(), Some("/a-propos/"));
        assert_eq!(en.permalink.as_deref(), Some("/about/"));
    }
}
