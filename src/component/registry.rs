//! Explicit component template registration.

use std::any::TypeId;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::resource::JsonMap;

use super::Component;

/// Where a component's template lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTemplate {
    name: String,
    dir: Option<PathBuf>,
}

impl ComponentTemplate {
    /// Template `name` searched in the site's components load paths.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir: None,
        }
    }

    /// Template `name` searched only in `dir`.
    pub fn at(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir: Some(dir.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

/// Builds a component from the arguments of a `component(name=...)` call.
pub type ComponentFactory = Arc<dyn Fn(JsonMap) -> Box<dyn Component> + Send + Sync>;

/// Component types with their templates, plus factories for template calls.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    templates: FxHashMap<TypeId, ComponentTemplate>,
    factories: FxHashMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the template of component type `C`.
    pub fn register<C: Component>(&mut self, template: ComponentTemplate) -> &mut Self {
        self.templates.insert(TypeId::of::<C>(), template);
        self
    }

    /// Register `C` and make it callable as `component(name="<name>", ...)`.
    pub fn register_named<C, F>(
        &mut self,
        name: &str,
        template: ComponentTemplate,
        factory: F,
    ) -> &mut Self
    where
        C: Component,
        F: Fn(JsonMap) -> C + Send + Sync + 'static,
    {
        self.register::<C>(template);
        self.factories.insert(
            name.to_string(),
            Arc::new(move |args| Box::new(factory(args)) as Box<dyn Component>),
        );
        self
    }

    /// Template of `component`: its own, else the one registered for its type.
    pub fn template_for(&self, component: &dyn Component) -> Option<ComponentTemplate> {
        component
            .template()
            .or_else(|| self.templates.get(&component.owner()).cloned())
    }

    /// Component for a template call; unregistered names render `<name>` from the
    /// components load paths.
    pub fn create(&self, name: &str, args: JsonMap) -> Box<dyn Component> {
        match self.factories.get(name) {
            Some(factory) => factory(args),
            None => Box::new(TemplateComponent::new(name, args)),
        }
    }

    pub fn is_registered<C: Component>(&self) -> bool {
        self.templates.contains_key(&TypeId::of::<C>())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// A component that is nothing but a template and its locals.
#[derive(Debug, Clone)]
pub struct TemplateComponent {
    template: ComponentTemplate,
    locals: JsonMap,
}

impl TemplateComponent {
    pub fn new(name: impl Into<String>, locals: JsonMap) -> Self {
        Self {
            template: ComponentTemplate::named(name),
            locals,
        }
    }
}

impl Component for TemplateComponent {
    fn name(&self) -> &str {
        self.template.name()
    }

    fn locals(&self) -> JsonMap {
        self.locals.clone()
    }

    fn template(&self) -> Option<ComponentTemplate> {
        Some(self.template.clone())
    }
}
