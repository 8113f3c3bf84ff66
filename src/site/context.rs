//! Read-only view of a site shared with every render.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::component::ComponentRegistry;
use crate::config::SiteConfig;
use crate::core::{PipelineError, PipelineResult};
use crate::locale::LocaleSet;
use crate::resource::JsonMap;

/// Layouts directory inside the source directory.
pub const LAYOUTS_DIR: &str = "_layouts";
/// Partials directory inside the source directory.
pub const PARTIALS_DIR: &str = "_partials";
/// Data files directory inside the source directory.
pub const DATA_DIR: &str = "_data";

/// Configuration, components and template data of one build.
///
/// Built once per build and shared behind an `Arc` by the renderer threads
/// and the current build scope.
pub struct SiteContext {
    pub config: Arc<SiteConfig>,
    pub components: Arc<ComponentRegistry>,
    locales: LocaleSet,
    component_dirs: Vec<PathBuf>,
    partial_dirs: Vec<PathBuf>,
    layout_dirs: Vec<PathBuf>,
    template_data: JsonMap,
}

impl SiteContext {
    pub fn new(config: Arc<SiteConfig>) -> Self {
        let template_data = base_template_data(&config);
        Self {
            locales: LocaleSet::from_config(&config),
            component_dirs: config.components_load_paths(),
            partial_dirs: vec![config.source.join(PARTIALS_DIR)],
            layout_dirs: vec![config.source.join(LAYOUTS_DIR)],
            components: Arc::new(ComponentRegistry::new()),
            template_data,
            config,
        }
    }

    pub fn with_components(mut self, components: Arc<ComponentRegistry>) -> Self {
        self.components = components;
        self
    }

    /// Search `dirs` for component templates instead of the configured load paths.
    pub fn with_component_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.component_dirs = dirs;
        self
    }

    /// Expose `data` (the contents of `_data`) as `site.data`.
    pub fn with_data(mut self, data: JsonMap) -> Self {
        self.template_data.insert("data".into(), Value::Object(data));
        self
    }

    /// Expose the resources of each collection as `site.collections.<name>`.
    pub fn with_collections(mut self, collections: JsonMap) -> Self {
        self.template_data
            .insert("collections".into(), Value::Object(collections));
        self
    }

    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    pub fn component_dirs(&self) -> &[PathBuf] {
        &self.component_dirs
    }

    pub fn partial_dirs(&self) -> &[PathBuf] {
        &self.partial_dirs
    }

    pub fn layout_dirs(&self) -> &[PathBuf] {
        &self.layout_dirs
    }

    /// The `site` object templates see.
    pub fn template_data(&self) -> &JsonMap {
        &self.template_data
    }

    /// Read a source or template file with the configured encoding.
    pub fn read_source(&self, path: &Path) -> PipelineResult<String> {
        let bytes = fs::read(path).map_err(|e| PipelineError::io(path, e))?;
        self.config
            .source_encoding()
            .decode(bytes)
            .map_err(|e| PipelineError::io(path, io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

fn base_template_data(config: &SiteConfig) -> JsonMap {
    let locales = LocaleSet::from_config(config);
    let mut data = JsonMap::new();
    data.insert(
        "url".into(),
        config.url.clone().map_or(Value::Null, Value::String),
    );
    data.insert("base_path".into(), Value::String(config.base_path.clone()));
    data.insert(
        "locales".into(),
        Value::Array(
            locales
                .iter()
                .map(|l| Value::String(l.tag().to_string()))
                .collect(),
        ),
    );
    data.insert(
        "default_locale".into(),
        Value::String(locales.default_locale().tag().to_string()),
    );
    data.insert("data".into(), Value::Object(JsonMap::new()));
    data.insert("collections".into(), Value::Object(JsonMap::new()));
    data
}
