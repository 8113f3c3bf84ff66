//! Per-render scope: content block, helpers and nested rendering.

use std::any::TypeId;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::core::{PipelineError, PipelineResult};
use crate::locale::Locale;
use crate::log;
use crate::logger::error_chain;
use crate::render::{
    SafeHtml, TemplateFunctions, TemplateScope, engine_for_owner, find_template_for, render,
    template_extensions,
};
use crate::resource::{JsonMap, parse_front_matter};
use crate::site::SiteContext;

use super::{Component, HelperProvider, SiteHelpers, ViewContext};

/// Deferred content handed to a component, evaluated on first use.
pub type ContentBlock<'a> = Box<dyn FnOnce(&mut ViewContext) -> PipelineResult<()> + 'a>;

/// What [`RenderContext::render`] renders.
pub enum RenderItem<'a> {
    Component(&'a mut dyn Component),
    /// A template from the partials directory.
    Partial(&'a str),
}

/// Template owner of partials.
enum Partial {}

/// Identity of the content block in errors.
const CONTENT_BLOCK: &str = "content block";

/// Memoized outcome of the content block.
enum Content {
    Ready(SafeHtml),
    /// The block failed; later reads report the same failure.
    Failed(String),
}

/// The scope of one component render.
///
/// Borrows the view context; nested contexts borrow the same view in turn.
pub struct RenderContext<'v> {
    view: &'v mut ViewContext,
    block: Option<ContentBlock<'v>>,
    content: Option<Content>,
    helpers: Option<Arc<dyn HelperProvider>>,
}

impl<'v> RenderContext<'v> {
    pub fn new(view: &'v mut ViewContext, block: Option<ContentBlock<'v>>) -> Self {
        Self {
            view,
            block,
            content: None,
            helpers: None,
        }
    }

    pub fn view(&self) -> &ViewContext {
        self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewContext {
        self.view
    }

    /// Whether a content block was supplied.
    pub fn has_content(&self) -> bool {
        self.content.is_some() || self.block.is_some()
    }

    /// Output of the content block, evaluated once inside a capture.
    ///
    /// Empty without a block. A failed block fails every call.
    pub fn content(&mut self) -> PipelineResult<SafeHtml> {
        match &self.content {
            Some(Content::Ready(html)) => return Ok(html.clone()),
            Some(Content::Failed(message)) => {
                return Err(PipelineError::TemplateRender {
                    identity: CONTENT_BLOCK.to_string(),
                    message: message.clone(),
                    source: message.clone().into(),
                });
            }
            None => {}
        }
        let Some(block) = self.block.take() else {
            return Ok(SafeHtml::empty());
        };
        match self.view.capture(block) {
            Ok(output) => {
                let html = SafeHtml::new(output);
                self.content = Some(Content::Ready(html.clone()));
                Ok(html)
            }
            Err(error) => {
                self.content = Some(Content::Failed(error_chain(&error)));
                Err(error)
            }
        }
    }

    /// Helpers of the view, else of its site, else of the current build.
    pub fn helpers(&mut self) -> PipelineResult<Arc<dyn HelperProvider>> {
        if let Some(helpers) = &self.helpers {
            return Ok(Arc::clone(helpers));
        }
        let helpers = build_helpers(self.view)?;
        self.helpers = Some(Arc::clone(&helpers));
        Ok(helpers)
    }

    pub fn relative_url(&mut self, path: &str) -> PipelineResult<String> {
        Ok(self.helpers()?.relative_url(path))
    }

    pub fn absolute_url(&mut self, path: &str) -> PipelineResult<String> {
        Ok(self.helpers()?.absolute_url(path))
    }

    /// Render a nested component or partial under its own capture.
    ///
    /// `options` become the locals of a partial. A failing nested render
    /// leaves nothing behind in the view.
    pub fn render(
        &mut self,
        item: RenderItem<'_>,
        options: JsonMap,
        block: Option<ContentBlock<'_>>,
    ) -> PipelineResult<SafeHtml> {
        let captured = self.view.capture(|view| {
            let html = match item {
                RenderItem::Component(component) => render_in(component, view, block)?,
                RenderItem::Partial(name) => render_partial(view, name, options, block)?,
            };
            view.write(html.as_str());
            Ok(())
        })?;
        Ok(SafeHtml::new(captured))
    }
}

/// Render `component` into `view`.
///
/// Runs the guard, then the hook, then the template. Errors are logged with the
/// component and its template path before being returned.
pub fn render_in(
    component: &mut dyn Component,
    view: &mut ViewContext,
    block: Option<ContentBlock<'_>>,
) -> PipelineResult<SafeHtml> {
    let name = component.name().to_string();
    let mut template_path: Option<PathBuf> = None;

    let result = view.nested(&name, |view| {
        let mut ctx = RenderContext::new(view, block);
        if !component.should_render(&ctx) {
            return Ok(SafeHtml::empty());
        }
        component
            .before_render(&mut ctx)
            .map_err(|error| PipelineError::TemplateRender {
                identity: name.clone(),
                message: error_chain(&*error),
                source: error.into(),
            })?;

        let site = ctx.view.resolve_site()?;
        let path = locate_component(&site, component)?;
        template_path = Some(path.clone());

        let mut data = template_data(ctx.view, &site);
        data.extend(component.locals());
        data.insert("content".into(), Value::String(ctx.content()?.into_string()));
        let identity = format!("{name} ({})", path.display());
        render_file(ctx.view, component.owner(), &identity, &path, data).map(SafeHtml::new)
    });

    if let Err(error) = &result {
        let path = template_path
            .as_deref()
            .map_or_else(|| "no template".to_string(), |p| p.display().to_string());
        log!("error"; "component `{}` ({}): {}", name, path, error_chain(error));
    }
    result
}

fn render_partial(
    view: &mut ViewContext,
    name: &str,
    locals: JsonMap,
    block: Option<ContentBlock<'_>>,
) -> PipelineResult<SafeHtml> {
    let identity = format!("partial {name}");
    view.nested(&identity, |view| {
        let site = view.resolve_site()?;
        let owner = TypeId::of::<Partial>();
        let path = find_in_dirs(owner, &identity, site.partial_dirs(), name)?;

        let mut ctx = RenderContext::new(view, block);
        let mut data = template_data(ctx.view, &site);
        data.extend(locals);
        data.insert("content".into(), Value::String(ctx.content()?.into_string()));
        render_file(ctx.view, owner, &identity, &path, data).map(SafeHtml::new)
    })
}

fn locate_component(site: &SiteContext, component: &dyn Component) -> PipelineResult<PathBuf> {
    let name = component.name();
    let Some(template) = site.components.template_for(component) else {
        return Err(PipelineError::TemplateNotFound {
            identity: name.to_string(),
            dir: site.component_dirs().first().cloned().unwrap_or_default(),
            tried: Vec::new(),
        });
    };
    match template.dir() {
        Some(dir) => find_in_dirs(component.owner(), name, &[dir.to_path_buf()], template.name()),
        None => find_in_dirs(component.owner(), name, site.component_dirs(), template.name()),
    }
}

/// First template `name` found in `dirs`, in order.
pub(crate) fn find_in_dirs(
    owner: TypeId,
    identity: &str,
    dirs: &[PathBuf],
    name: &str,
) -> PipelineResult<PathBuf> {
    let extensions = template_extensions();
    let mut tried = Vec::new();
    for dir in dirs {
        match find_template_for(owner, identity, dir, name, &extensions) {
            Ok(path) => return Ok(path),
            Err(PipelineError::TemplateNotFound { tried: names, .. }) if dirs.len() > 1 => {
                tried.extend(names.into_iter().map(|n| format!("{}/{n}", dir.display())));
            }
            Err(PipelineError::TemplateNotFound { tried: names, .. }) => tried.extend(names),
            Err(error) => return Err(error),
        }
    }
    Err(PipelineError::TemplateNotFound {
        identity: identity.to_string(),
        dir: dirs.first().cloned().unwrap_or_default(),
        tried,
    })
}

/// `site`, `page` and `locale` as seen by every template of `view`.
pub(crate) fn template_data(view: &ViewContext, site: &SiteContext) -> JsonMap {
    let locale = view
        .locale()
        .unwrap_or_else(|| site.locales().default_locale());
    let mut data = JsonMap::new();
    data.insert("site".into(), Value::Object(site.template_data().clone()));
    data.insert("page".into(), Value::Object(view.page().clone()));
    data.insert("locale".into(), Value::String(locale.tag().to_string()));
    data
}

/// Render the template file at `path`, skipping its front matter.
pub(crate) fn render_file(
    view: &ViewContext,
    owner: TypeId,
    identity: &str,
    path: &Path,
    data: JsonMap,
) -> PipelineResult<String> {
    let site = view.resolve_site()?;
    let text = site.read_source(path)?;
    let (_, body) = parse_front_matter(&path.display().to_string(), &text)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    render_source(view, owner, identity, extension, body, &data)
}

/// Render template text with the engine registered for `extension`.
pub(crate) fn render_source(
    view: &ViewContext,
    owner: TypeId,
    identity: &str,
    extension: &str,
    source: &str,
    data: &JsonMap,
) -> PipelineResult<String> {
    let engine = engine_for_owner(owner, identity, extension)?;
    let functions: Arc<dyn TemplateFunctions> = Arc::new(SiteFunctions::new(view)?);
    let scope = TemplateScope::new(identity, data).with_functions(functions);
    render(engine.as_ref(), source, &scope)
}

fn build_helpers(view: &ViewContext) -> PipelineResult<Arc<dyn HelperProvider>> {
    if let Some(helpers) = view.helpers() {
        return Ok(Arc::clone(helpers));
    }
    let site = view.resolve_site()?;
    Ok(Arc::new(SiteHelpers::new(site, view.locale().cloned())))
}

/// Template functions bound to the view that started a render.
///
/// Each call renders into a fresh view one level deeper, so its output comes
/// back as a value instead of being written around the caller's buffer.
pub(crate) struct SiteFunctions {
    site: Arc<SiteContext>,
    helpers: Arc<dyn HelperProvider>,
    locale: Option<Locale>,
    page: JsonMap,
    depth: usize,
}

impl SiteFunctions {
    pub(crate) fn new(view: &ViewContext) -> PipelineResult<Self> {
        Ok(Self {
            site: view.resolve_site()?,
            helpers: build_helpers(view)?,
            locale: view.locale().cloned(),
            page: view.page().clone(),
            depth: view.depth(),
        })
    }

    fn view(&self) -> ViewContext {
        let view = ViewContext::for_site(Arc::clone(&self.site))
            .with_page(self.page.clone())
            .with_helpers(Arc::clone(&self.helpers))
            .at_depth(self.depth);
        match &self.locale {
            Some(locale) => view.with_locale(locale.clone()),
            None => view,
        }
    }
}

impl TemplateFunctions for SiteFunctions {
    fn partial(&self, name: &str, locals: JsonMap) -> PipelineResult<SafeHtml> {
        let mut view = self.view();
        RenderContext::new(&mut view, None).render(RenderItem::Partial(name), locals, None)
    }

    fn component(&self, name: &str, locals: JsonMap) -> PipelineResult<SafeHtml> {
        let mut component = self.site.components.create(name, locals);
        let mut view = self.view();
        RenderContext::new(&mut view, None).render(
            RenderItem::Component(component.as_mut()),
            JsonMap::new(),
            None,
        )
    }

    fn relative_url(&self, path: &str) -> PipelineResult<String> {
        Ok(self.helpers.relative_url(path))
    }

    fn absolute_url(&self, path: &str) -> PipelineResult<String> {
        Ok(self.helpers.absolute_url(path))
    }

    fn localized_url(&self, path: &str, locale: &str) -> PipelineResult<String> {
        Ok(self.helpers.localized_url(path, locale))
    }
}
