//! The output target of a render.

use std::sync::Arc;

use crate::core::{PipelineError, PipelineResult, current_site};
use crate::locale::Locale;
use crate::resource::JsonMap;
use crate::site::SiteContext;

use super::{HelperProvider, MAX_RENDER_DEPTH};

/// Output buffers and the page being rendered.
///
/// Writes always go to the innermost buffer. [`capture`](Self::capture) opens a
/// nested buffer and only hands its text back when the closure succeeds.
pub struct ViewContext {
    site: Option<Arc<SiteContext>>,
    helpers: Option<Arc<dyn HelperProvider>>,
    locale: Option<Locale>,
    page: JsonMap,
    buffers: Vec<String>,
    depth: usize,
}

impl ViewContext {
    /// A view without a site; helpers fall back to the current build.
    pub fn new() -> Self {
        Self {
            site: None,
            helpers: None,
            locale: None,
            page: JsonMap::new(),
            buffers: vec![String::new()],
            depth: 0,
        }
    }

    pub fn for_site(site: Arc<SiteContext>) -> Self {
        Self {
            site: Some(site),
            ..Self::new()
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Variables exposed to templates as `page`.
    pub fn with_page(mut self, page: JsonMap) -> Self {
        self.page = page;
        self
    }

    /// Use `helpers` instead of building them from the site.
    pub fn with_helpers(mut self, helpers: Arc<dyn HelperProvider>) -> Self {
        self.helpers = Some(helpers);
        self
    }

    /// Start at `depth`, for views created by nested template calls.
    pub(super) fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn site(&self) -> Option<&Arc<SiteContext>> {
        self.site.as_ref()
    }

    /// The bound site, else the site of the active build.
    pub fn resolve_site(&self) -> PipelineResult<Arc<SiteContext>> {
        self.site
            .clone()
            .or_else(current_site)
            .ok_or(PipelineError::MissingSiteContext)
    }

    pub fn helpers(&self) -> Option<&Arc<dyn HelperProvider>> {
        self.helpers.as_ref()
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    pub fn page(&self) -> &JsonMap {
        &self.page
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn write(&mut self, text: &str) {
        if let Some(buffer) = self.buffers.last_mut() {
            buffer.push_str(text);
        }
    }

    /// Text of the innermost buffer.
    pub fn output(&self) -> &str {
        self.buffers.last().map_or("", String::as_str)
    }

    /// Text of the outermost buffer.
    pub fn into_output(mut self) -> String {
        self.buffers.truncate(1);
        self.buffers.pop().unwrap_or_default()
    }

    /// Run `f` against a fresh buffer and return what it wrote.
    ///
    /// On error the buffer is discarded; the enclosing buffer never sees it.
    pub fn capture<F>(&mut self, f: F) -> PipelineResult<String>
    where
        F: FnOnce(&mut Self) -> PipelineResult<()>,
    {
        let level = self.buffers.len();
        self.buffers.push(String::new());
        let result = f(self);
        // Buffers a failing closure left open go as well
        self.buffers.truncate(level + 1);
        let captured = self.buffers.pop().unwrap_or_default();
        result.map(|()| captured)
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_RENDER_DEPTH`].
    pub(super) fn nested<T>(
        &mut self,
        identity: &str,
        f: impl FnOnce(&mut Self) -> PipelineResult<T>,
    ) -> PipelineResult<T> {
        if self.depth >= MAX_RENDER_DEPTH {
            return Err(PipelineError::RenderDepth {
                identity: identity.to_string(),
                limit: MAX_RENDER_DEPTH,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

impl Default for ViewContext {
    fn default() -> Self {
        Self::new()
    }
}
