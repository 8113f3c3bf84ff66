//! Template engine abstraction.
//!
//! The pipeline only needs `render(source, scope) -> String`. Concrete engines are
//! adapters registered under file extensions:
//!
//! | extension          | engine                      |
//! |--------------------|-----------------------------|
//! | `tera`, `html`     | [`TeraEngine`]              |
//! | `md`, `markdown`   | [`MarkdownEngine`]          |
//!
//! Engines are looked up per template owner type with [`engine_for`] and cached
//! for the rest of the process.

mod engine;
mod markdown;
mod template;
mod tera_engine;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::core::PipelineResult;
use crate::resource::JsonMap;

pub use engine::{
    EngineFactory, EngineLookup, EngineRegistry, engine_for, engine_for_owner, register_engine,
    render, template_extensions,
};
pub use markdown::{MarkdownEngine, MarkdownOptions};
pub use template::{find_template, find_template_for};
pub use tera_engine::TeraEngine;

/// A template language adapter.
pub trait TemplateEngine: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn render(&self, source: &str, scope: &TemplateScope<'_>) -> anyhow::Result<String>;
}

/// Everything a template sees while rendering.
pub struct TemplateScope<'a> {
    /// Template identity for error messages (`layout default`, `CardComponent`).
    pub identity: &'a str,
    /// Top-level variables.
    pub data: &'a JsonMap,
    /// Callbacks for `partial`, `component` and the URL helpers.
    pub functions: Option<Arc<dyn TemplateFunctions>>,
}

impl<'a> TemplateScope<'a> {
    pub fn new(identity: &'a str, data: &'a JsonMap) -> Self {
        Self {
            identity,
            data,
            functions: None,
        }
    }

    pub fn with_functions(mut self, functions: Arc<dyn TemplateFunctions>) -> Self {
        self.functions = Some(functions);
        self
    }
}

/// Capabilities exposed to templates as functions.
pub trait TemplateFunctions: Send + Sync {
    fn partial(&self, name: &str, locals: JsonMap) -> PipelineResult<SafeHtml>;

    fn component(&self, name: &str, locals: JsonMap) -> PipelineResult<SafeHtml>;

    fn relative_url(&self, path: &str) -> PipelineResult<String>;

    fn absolute_url(&self, path: &str) -> PipelineResult<String>;

    fn localized_url(&self, path: &str, locale: &str) -> PipelineResult<String>;
}

/// Rendered markup that must not be escaped again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SafeHtml {
    fn from(html: String) -> Self {
        Self(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_html_displays_verbatim() {
        assert_eq!(SafeHtml::new("<b>x</b>").to_string(), "<b>x</b>");
        assert_eq!(SafeHtml::empty().as_str(), "");
    }

    #[test]
    fn test_safe_html_serializes_as_string() {
        let json = serde_json::to_string(&SafeHtml::new("<p>")).unwrap();
        assert_eq!(json, r#""<p>""#);
    }
}
