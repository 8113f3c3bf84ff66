//! The site: configuration snapshot, components and resource collections.
//!
//! | Module     | Purpose                                            |
//! |------------|----------------------------------------------------|
//! | `context`  | `SiteContext`, the read-only view renders share    |
//! | `discover` | Source tree walk: documents, static files, data    |
//! | `build`    | Build orchestration                                |
//! | `write`    | Output files                                       |
//!
//! ```ignore
//! let mut site = Site::new(&config);
//! site.components_mut()
//!     .register::<Card>(ComponentTemplate::named("card"));
//! let report = site.build()?;
//! ```

mod build;
mod context;
mod discover;
mod write;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::component::ComponentRegistry;
use crate::config::SiteConfig;
use crate::locale::LocaleResolver;
use crate::resource::{JsonMap, Resource, ResourceCollection};

pub use build::BuildReport;
pub use context::SiteContext;
pub use discover::{Discovered, StaticFile, discover};

/// A site being built.
///
/// Holds its own snapshot of the configuration: changing the value passed to
/// [`Site::new`] or [`Site::set_config`] afterwards has no effect.
pub struct Site {
    config: Arc<SiteConfig>,
    resolver: LocaleResolver,
    components: ComponentRegistry,
    components_load_paths: Vec<PathBuf>,
    cache_dir: PathBuf,
    collections: Vec<ResourceCollection>,
    static_files: Vec<StaticFile>,
    data: JsonMap,
}

impl Site {
    pub fn new(config: &SiteConfig) -> Self {
        let mut site = Self {
            config: Arc::new(SiteConfig::default()),
            resolver: LocaleResolver::from_config(config),
            components: ComponentRegistry::new(),
            components_load_paths: Vec::new(),
            cache_dir: PathBuf::new(),
            collections: Vec::new(),
            static_files: Vec::new(),
            data: JsonMap::new(),
        };
        site.set_config(config);
        site
    }

    /// Replace the configuration, re-deriving everything computed from it.
    ///
    /// Collections are recreated empty; the next build fills them again.
    pub fn set_config(&mut self, config: &SiteConfig) {
        self.config = Arc::new(config.clone());
        self.resolver = LocaleResolver::from_config(config);
        self.components_load_paths = config.components_load_paths();
        self.cache_dir = config.cache_dir.clone();
        self.collections = config
            .collection_names()
            .into_iter()
            .map(ResourceCollection::new)
            .collect();
        self.static_files.clear();
        self.data.clear();
    }

    pub fn config(&self) -> &Arc<SiteConfig> {
        &self.config
    }

    pub fn resolver(&self) -> &LocaleResolver {
        &self.resolver
    }

    pub fn components_load_paths(&self) -> &[PathBuf] {
        &self.components_load_paths
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Registry to add component templates and factories to before building.
    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    pub fn collection(&self, name: &str) -> Option<&ResourceCollection> {
        self.collections.iter().find(|c| c.name() == name)
    }

    /// Collections in configuration order, `pages` first.
    pub fn collections(&self) -> &[ResourceCollection] {
        &self.collections
    }

    /// Every resource, collection by collection.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.collections.iter().flat_map(ResourceCollection::iter)
    }

    pub fn static_files(&self) -> &[StaticFile] {
        &self.static_files
    }

    /// Contents of `_data` from the last build.
    pub fn data(&self) -> &JsonMap {
        &self.data
    }

    /// Shared view for rendering: config, components and template data.
    pub fn context(&self) -> SiteContext {
        let collections = self
            .collections
            .iter()
            .map(|collection| {
                let values = collection.iter().map(Resource::to_value).collect();
                (
                    collection.name().to_string(),
                    serde_json::Value::Array(values),
                )
            })
            .collect();

        SiteContext::new(Arc::clone(&self.config))
            .with_components(Arc::new(self.components.clone()))
            .with_component_dirs(self.components_load_paths.clone())
            .with_data(self.data.clone())
            .with_collections(collections)
    }

    fn collection_mut(&mut self, name: &str) -> Option<&mut ResourceCollection> {
        self.collections.iter_mut().find(|c| c.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_site_config;

    #[test]
    fn test_config_is_snapshotted() {
        let mut config = test_site_config(Path::new("/site"), "base_path = \"/docs\"");
        let site = Site::new(&config);

        config.base_path = "/changed".into();
        assert_eq!(site.config().base_path, "/docs");
    }

    #[test]
    fn test_set_config_rederives_paths() {
        let config = test_site_config(Path::new("/site"), "");
        let mut site = Site::new(&config);
        assert_eq!(site.cache_dir(), Path::new("/site/.portico-cache"));
        assert_eq!(
            site.components_load_paths(),
            [PathBuf::from("/site/src/_components")]
        );

        let config = test_site_config(
            Path::new("/other"),
            "source = \"content\"\ncache_dir = \"tmp/cache\"\ncomponents_dir = \"./widgets\"\ncollections = [\"docs\"]",
        );
        site.set_config(&config);
        assert_eq!(site.cache_dir(), Path::new("/other/tmp/cache"));
        assert_eq!(
            site.components_load_paths(),
            [PathBuf::from("/other/widgets")]
        );
        let names: Vec<_> = site.collections().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["pages", "docs"]);
        assert!(site.collection("posts").is_none());
    }
}
