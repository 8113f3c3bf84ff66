//! Markdown adapter using pulldown-cmark.

use pulldown_cmark::{Options, Parser, html};

use super::{TemplateEngine, TemplateScope};

/// Markdown extensions to enable.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    /// `# Heading {#custom-id}`
    pub heading_attributes: bool,
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
        }
    }

    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self::all()
    }
}

/// Converts Markdown bodies to HTML. Template variables are not interpolated.
#[derive(Debug, Clone, Default)]
pub struct MarkdownEngine {
    options: MarkdownOptions,
}

impl MarkdownEngine {
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }
}

impl TemplateEngine for MarkdownEngine {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn render(&self, source: &str, _scope: &TemplateScope<'_>) -> anyhow::Result<String> {
        let parser = Parser::new_ext(source, self.options.to_pulldown_options());
        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}
