//! Engine registry, per-owner engine cache and the render boundary.

use std::any::{TypeId, type_name};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::core::{PipelineError, PipelineResult};
use crate::{debug, log};
use crate::logger::error_chain;

use super::{MarkdownEngine, TemplateEngine, TemplateScope, TeraEngine};

/// Creates an engine instance for one (owner, extension) pair.
pub type EngineFactory = Arc<dyn Fn() -> Arc<dyn TemplateEngine> + Send + Sync>;

/// Result of an engine lookup.
pub enum EngineLookup {
    Found(Arc<dyn TemplateEngine>),
    NotFound(String),
}

/// Extension -> engine factory, in declaration order.
#[derive(Clone)]
pub struct EngineRegistry {
    factories: Vec<(String, EngineFactory)>,
}

impl EngineRegistry {
    /// Registry without any engines.
    pub fn empty() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Register `factory` under `extension`, replacing an earlier registration.
    pub fn register(&mut self, extension: &str, factory: EngineFactory) {
        let extension = normalize_extension(extension);
        match self.factories.iter_mut().find(|(ext, _)| *ext == extension) {
            Some(slot) => slot.1 = factory,
            None => self.factories.push((extension, factory)),
        }
    }

    pub fn lookup(&self, extension: &str) -> EngineLookup {
        let extension = normalize_extension(extension);
        self.factories
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map_or_else(
                || EngineLookup::NotFound(format!("no engine registered for `.{extension}`")),
                |(_, factory)| EngineLookup::Found(factory()),
            )
    }

    /// Registered extensions in declaration order.
    pub fn extensions(&self) -> Vec<String> {
        self.factories.iter().map(|(ext, _)| ext.clone()).collect()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        let tera: EngineFactory = Arc::new(|| Arc::new(TeraEngine));
        let markdown: EngineFactory = Arc::new(|| Arc::new(MarkdownEngine::default()));
        registry.register("tera", Arc::clone(&tera));
        registry.register("html", tera);
        registry.register("md", Arc::clone(&markdown));
        registry.register("markdown", markdown);
        registry
    }
}

static REGISTRY: LazyLock<RwLock<EngineRegistry>> =
    LazyLock::new(|| RwLock::new(EngineRegistry::default()));

/// (template owner type, extension) -> engine. Never invalidated.
static ENGINE_CACHE: LazyLock<DashMap<(TypeId, String), Arc<dyn TemplateEngine>>> =
    LazyLock::new(DashMap::new);

/// Add an engine to the process-wide registry.
///
/// Owners that already resolved `extension` keep their cached engine.
pub fn register_engine(extension: &str, factory: EngineFactory) {
    REGISTRY.write().register(extension, factory);
}

/// Extensions of the process-wide registry, in declaration order.
pub fn template_extensions() -> Vec<String> {
    REGISTRY.read().extensions()
}

/// Engine for templates of `Owner` with the given extension.
///
/// Repeated calls return the same `Arc`.
pub fn engine_for<Owner: 'static>(extension: &str) -> PipelineResult<Arc<dyn TemplateEngine>> {
    engine_for_owner(TypeId::of::<Owner>(), short_type_name::<Owner>(), extension)
}

/// Like [`engine_for`] for owners only known at runtime.
pub fn engine_for_owner(
    owner: TypeId,
    identity: &str,
    extension: &str,
) -> PipelineResult<Arc<dyn TemplateEngine>> {
    match cached_lookup(owner, extension) {
        EngineLookup::Found(engine) => Ok(engine),
        EngineLookup::NotFound(reason) => {
            debug!("render"; "{}: {}", identity, reason);
            Err(PipelineError::UnsupportedTemplate {
                identity: identity.to_string(),
                extension: normalize_extension(extension),
            })
        }
    }
}

fn cached_lookup(owner: TypeId, extension: &str) -> EngineLookup {
    let key = (owner, normalize_extension(extension));
    if let Some(engine) = ENGINE_CACHE.get(&key) {
        return EngineLookup::Found(Arc::clone(engine.value()));
    }

    let engine = match REGISTRY.read().lookup(&key.1) {
        EngineLookup::Found(engine) => engine,
        not_found => return not_found,
    };
    // Another thread may have won the race, keep its instance
    let engine = ENGINE_CACHE.entry(key).or_insert(engine);
    EngineLookup::Found(Arc::clone(engine.value()))
}

/// Render `source` with `engine`, wrapping failures as [`PipelineError::TemplateRender`].
pub fn render(
    engine: &dyn TemplateEngine,
    source: &str,
    scope: &TemplateScope<'_>,
) -> PipelineResult<String> {
    engine.render(source, scope).map_err(|error| {
        let message = error_chain(&*error);
        log!("error"; "{} ({}): {}", scope.identity, engine.name(), message);
        PipelineError::TemplateRender {
            identity: scope.identity.to_string(),
            message,
            source: error.into(),
        }
    })
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// `portico::component::Card` -> `Card`
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let name = type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}
