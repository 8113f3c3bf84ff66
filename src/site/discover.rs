//! Source tree discovery.
//!
//! ```text
//! src/
//! ├── _posts/2024-06-15-hello.md   # document of the `posts` collection
//! ├── _layouts/default.tera        # skipped (layouts)
//! ├── _data/nav.yml                # site.data.nav
//! ├── about.md                     # page
//! ├── docs/intro.fr.md             # page (French)
//! └── logo.png                     # static file
//! ```
//!
//! Traversal is sorted, so discovery order (and with it collection order)
//! is the same on every run.

use std::fs;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use serde_json::Value;

use crate::config::{PAGES_COLLECTION, SiteConfig};
use crate::core::{BoxError, PipelineError, PipelineResult, UrlPath};
use crate::debug;
use crate::render::template_extensions;
use crate::resource::{JsonMap, SourceDocument, has_front_matter, parse_front_matter, toml_to_json};

use super::context::DATA_DIR;

/// Extensions that are documents even without front matter.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// A file copied to the destination as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    pub source: PathBuf,
    /// Path below the source directory, `/`-separated.
    pub relative_path: String,
}

impl StaticFile {
    /// Site-relative URL of the copy.
    pub fn url(&self, base_path: &str) -> UrlPath {
        UrlPath::from_permalink(&self.relative_path).with_prefix(base_path)
    }
}

/// Everything found below the source directory.
#[derive(Debug, Default)]
pub struct Discovered {
    pub documents: Vec<SourceDocument>,
    pub static_files: Vec<StaticFile>,
    /// Contents of `_data`, keyed by file path without extension.
    pub data: JsonMap,
}

/// Walk the source directory of `config`.
///
/// Files with a template extension become documents when they start with
/// front matter (Markdown always does). Every other file is static.
pub fn discover(config: &SiteConfig) -> PipelineResult<Discovered> {
    let source = &config.source;
    let collections = config.collection_names();
    let extensions = template_extensions();
    let excluded = excluded_dirs(config);

    let mut discovered = Discovered {
        data: load_data(config)?,
        ..Discovered::default()
    };

    for entry in WalkDir::new(source)
        .sort(true)
        .skip_hidden(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if excluded.iter().any(|dir| path.starts_with(dir)) {
            continue;
        }
        let Some(relative) = relative_path(source, &path) else {
            continue;
        };
        let Some(collection) = collection_of(&relative, &collections) else {
            continue;
        };

        let extension = relative
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !extensions.contains(&extension) {
            discovered.static_files.push(StaticFile {
                source: path,
                relative_path: relative,
            });
            continue;
        }

        let text = read_text(config, &path)?;
        if !has_front_matter(&text) && !MARKDOWN_EXTENSIONS.contains(&extension.as_str()) {
            discovered.static_files.push(StaticFile {
                source: path,
                relative_path: relative,
            });
            continue;
        }

        let (front_matter, body) = parse_front_matter(&relative, &text)?;
        discovered.documents.push(SourceDocument::new(
            relative,
            collection,
            front_matter,
            body,
        )?);
    }

    debug!(
        "discover";
        "{} documents, {} static files in {}",
        discovered.documents.len(),
        discovered.static_files.len(),
        source.display()
    );
    Ok(discovered)
}

/// Output, cache and component directories that may sit inside the source.
fn excluded_dirs(config: &SiteConfig) -> Vec<PathBuf> {
    let mut dirs = vec![config.destination.clone(), config.cache_dir.clone()];
    dirs.extend(config.components_load_paths());
    dirs.retain(|dir| dir.starts_with(&config.source) && *dir != config.source);
    dirs
}

fn relative_path(source: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(source).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.iter().any(|part| part.starts_with('.')) {
        return None;
    }
    Some(parts.join("/"))
}

/// Collection of a relative path, `None` for skipped `_` directories.
///
/// `_posts/x.md` is in `posts` when that collection is configured; any other
/// top-level `_` entry (layouts, partials, data, components) is not a document.
fn collection_of(relative: &str, collections: &[String]) -> Option<String> {
    let Some(dir) = relative.strip_prefix('_') else {
        return Some(PAGES_COLLECTION.to_string());
    };
    let (name, _) = dir.split_once('/')?;
    collections
        .iter()
        .find(|c| c.as_str() == name && c.as_str() != PAGES_COLLECTION)
        .cloned()
}

fn read_text(config: &SiteConfig, path: &Path) -> PipelineResult<String> {
    let bytes = fs::read(path).map_err(|e| PipelineError::io(path, e))?;
    config.source_encoding().decode(bytes).map_err(|e| {
        PipelineError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })
}

/// Load `_data/**/*.{yml,yaml,json,toml}` into one nested map.
///
/// `_data/team/members.yml` ends up at `data.team.members`.
fn load_data(config: &SiteConfig) -> PipelineResult<JsonMap> {
    let dir = config.source.join(DATA_DIR);
    let mut data = JsonMap::new();
    if !dir.is_dir() {
        return Ok(data);
    }

    for entry in WalkDir::new(&dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let Some(relative) = relative_path(&dir, &path) else {
            continue;
        };
        let Some((key_path, extension)) = relative.rsplit_once('.') else {
            continue;
        };
        let text = read_text(config, &path)?;
        let parsed: Result<Value, BoxError> = match extension.to_ascii_lowercase().as_str() {
            "yml" | "yaml" => serde_yaml::from_str::<Value>(&text).map_err(Into::into),
            "json" => serde_json::from_str::<Value>(&text).map_err(Into::into),
            "toml" => text
                .parse::<toml::Table>()
                .map(|table| toml_to_json(toml::Value::Table(table)))
                .map_err(Into::into),
            _ => continue,
        };
        let value = parsed.map_err(|source| PipelineError::FrontMatter {
            path: format!("{DATA_DIR}/{relative}"),
            source,
        })?;
        insert_nested(&mut data, key_path, value);
    }
    Ok(data)
}

fn insert_nested(data: &mut JsonMap, key_path: &str, value: Value) {
    let mut parts: Vec<&str> = key_path.split('/').collect();
    let Some(last) = parts.pop() else {
        return;
    };
    let mut map = data;
    for part in parts {
        let slot = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(JsonMap::new()));
        if !slot.is_object() {
            *slot = Value::Object(JsonMap::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        map = next;
    }
    map.insert(last.to_string(), value);
}
