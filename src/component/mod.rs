//! Templated components and their render context.
//!
//! A [`Component`] is a reusable rendering unit. Its template file is registered
//! explicitly in the site's [`ComponentRegistry`] and rendered by [`render_in`]
//! into a [`ViewContext`]:
//!
//! ```ignore
//! let mut registry = ComponentRegistry::new();
//! registry.register::<Card>(ComponentTemplate::named("card"));
//!
//! let mut view = ViewContext::for_site(site);
//! let html = render_in(&mut Card::new("Hi"), &mut view, None)?;
//! ```
//!
//! Templates reach the same machinery through the `partial`, `component`,
//! `relative_url`, `absolute_url` and `localized_url` functions.

mod context;
mod helpers;
mod registry;
mod view;

use std::any::TypeId;

use crate::resource::JsonMap;

pub use context::{ContentBlock, RenderContext, RenderItem, render_in};
pub use helpers::{HelperProvider, SiteHelpers};
pub use registry::{ComponentFactory, ComponentRegistry, ComponentTemplate, TemplateComponent};
pub use view::ViewContext;

pub(crate) use context::{find_in_dirs, render_source, template_data};

/// Maximum nesting of partials, components and layouts.
pub const MAX_RENDER_DEPTH: usize = 32;

/// A reusable rendering unit.
pub trait Component: 'static {
    /// Identity used in logs and errors.
    fn name(&self) -> &str;

    /// Guard: nothing is rendered when this returns `false`.
    fn should_render(&self, _ctx: &RenderContext<'_>) -> bool {
        true
    }

    /// Runs after the guard passed and before the template.
    fn before_render(&mut self, _ctx: &mut RenderContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Variables visible to the template, next to `page`, `site` and `content`.
    fn locals(&self) -> JsonMap {
        JsonMap::new()
    }

    /// Template carried by the instance itself, used before the registry.
    fn template(&self) -> Option<ComponentTemplate> {
        None
    }

    #[doc(hidden)]
    fn owner(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}
