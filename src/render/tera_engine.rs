//! Tera adapter for `.tera` and `.html` templates.
//!
//! Every `{{ }}` output is HTML-escaped. Partials and components come back as
//! [`SafeHtml`](super::SafeHtml) and are inserted as is, rendered content is
//! written with `{{ content | safe }}`.

use std::collections::HashMap;
use std::sync::Arc;

use tera::{Context, Tera, Value};

use crate::resource::JsonMap;

use super::{TemplateEngine, TemplateFunctions, TemplateScope};

/// Argument keys that are not passed on as locals.
const RESERVED_ARGS: &[&str] = &["name", "locals"];

#[derive(Debug, Clone, Copy, Default)]
pub struct TeraEngine;

impl TemplateEngine for TeraEngine {
    fn name(&self) -> &'static str {
        "tera"
    }

    fn render(&self, source: &str, scope: &TemplateScope<'_>) -> anyhow::Result<String> {
        let mut tera = Tera::default();
        // The empty suffix matches every template name
        tera.autoescape_on(vec![""]);
        tera.set_escape_fn(escape_text);
        tera.add_raw_template(scope.identity, source)?;
        if let Some(functions) = &scope.functions {
            register_functions(&mut tera, functions);
        }

        let context = Context::from_value(Value::Object(scope.data.clone()))?;
        Ok(tera.render(scope.identity, &context)?)
    }
}

/// Template function whose output is already markup.
struct Markup<F>(F);

impl<F> tera::Function for Markup<F>
where
    F: Fn(&HashMap<String, Value>) -> tera::Result<Value> + Send + Sync,
{
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        (self.0)(args)
    }

    fn is_safe(&self) -> bool {
        true
    }
}

fn register_functions(tera: &mut Tera, functions: &Arc<dyn TemplateFunctions>) {
    let f = Arc::clone(functions);
    tera.register_function(
        "partial",
        Markup(move |args: &HashMap<String, Value>| {
            let name = required_str(args, "partial", "name")?;
            f.partial(name, locals(args))
                .map(|html| Value::String(html.into_string()))
                .map_err(|e| tera::Error::chain(format!("partial `{name}` failed"), e))
        }),
    );

    let f = Arc::clone(functions);
    tera.register_function(
        "component",
        Markup(move |args: &HashMap<String, Value>| {
            let name = required_str(args, "component", "name")?;
            f.component(name, locals(args))
                .map(|html| Value::String(html.into_string()))
                .map_err(|e| tera::Error::chain(format!("component `{name}` failed"), e))
        }),
    );

    let f = Arc::clone(functions);
    tera.register_function("relative_url", move |args: &HashMap<String, Value>| {
        let path = required_str(args, "relative_url", "path")?;
        f.relative_url(path)
            .map(Value::String)
            .map_err(|e| tera::Error::chain("relative_url failed", e))
    });

    let f = Arc::clone(functions);
    tera.register_function("absolute_url", move |args: &HashMap<String, Value>| {
        let path = required_str(args, "absolute_url", "path")?;
        f.absolute_url(path)
            .map(Value::String)
            .map_err(|e| tera::Error::chain("absolute_url failed", e))
    });

    let f = Arc::clone(functions);
    tera.register_function("localized_url", move |args: &HashMap<String, Value>| {
        let path = required_str(args, "localized_url", "path")?;
        let locale = required_str(args, "localized_url", "locale")?;
        f.localized_url(path, locale)
            .map(Value::String)
            .map_err(|e| tera::Error::chain("localized_url failed", e))
    });
}

/// Escape text for HTML bodies and quoted attributes. Unlike Tera's default,
/// `/` is kept so URLs stay readable.
fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn required_str<'a>(
    args: &'a HashMap<String, Value>,
    function: &str,
    key: &str,
) -> tera::Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg(format!("`{function}` needs a string `{key}` argument")))
}

/// Locals for a nested render: an explicit `locals` object merged with the other arguments.
fn locals(args: &HashMap<String, Value>) -> JsonMap {
    let mut locals = match args.get("locals") {
        Some(Value::Object(map)) => map.clone(),
        _ => JsonMap::new(),
    };
    let mut rest: Vec<_> = args
        .iter()
        .filter(|(key, _)| !RESERVED_ARGS.contains(&key.as_str()))
        .collect();
    // HashMap order is random, keep locals deterministic
    rest.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in rest {
        locals.insert(key.clone(), value.clone());
    }
    locals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PipelineError, PipelineResult};
    use crate::render::SafeHtml;
    use serde_json::json;

    struct Echo;

    impl TemplateFunctions for Echo {
        fn partial(&self, name: &str, locals: JsonMap) -> PipelineResult<SafeHtml> {
            if name == "missing" {
                return Err(PipelineError::MissingSiteContext);
            }
            Ok(SafeHtml::new(format!(
                "<{name} {}>",
                serde_json::to_string(&locals).unwrap()
            )))
        }

        fn component(&self, name: &str, _locals: JsonMap) -> PipelineResult<SafeHtml> {
            Ok(SafeHtml::new(format!("<div class=\"{name}\"></div>")))
        }

        fn relative_url(&self, path: &str) -> PipelineResult<String> {
            Ok(format!("/base{path}"))
        }

        fn absolute_url(&self, path: &str) -> PipelineResult<String> {
            Ok(format!("https://example.com/base{path}"))
        }

        fn localized_url(&self, path: &str, locale: &str) -> PipelineResult<String> {
            Ok(format!("/base/{locale}{path}"))
        }
    }

    fn data(value: serde_json::Value) -> JsonMap {
        value.as_object().cloned().unwrap_or_default()
    }

    fn render(source: &str, data: &JsonMap) -> anyhow::Result<String> {
        let scope = TemplateScope::new("test", data).with_functions(Arc::new(Echo));
        TeraEngine.render(source, &scope)
    }

    #[test]
    fn test_variables_escaped() {
        let vars = data(json!({"content": "<p>hi</p>", "title": "a < b & 'c'", "url": "/a/b?x=1&y=2"}));
        assert_eq!(
            render("{{ content | safe }}|{{ title }}|{{ url }}", &vars).unwrap(),
            "<p>hi</p>|a &lt; b &amp; &#x27;c&#x27;|/a/b?x=1&amp;y=2"
        );
        assert_eq!(render("{{ content }}", &vars).unwrap(), "&lt;p&gt;hi&lt;/p&gt;");
    }

    #[test]
    fn test_markup_functions_not_escaped_again() {
        let vars = data(json!({"page": {"a": "<b>"}}));
        assert_eq!(
            render(r#"{{ component(name="card") }}"#, &vars).unwrap(),
            r#"<div class="card"></div>"#
        );
        assert_eq!(
            render(r#"{{ partial(name="nav", locals=page) }}"#, &vars).unwrap(),
            r#"<nav {"a":"<b>"}>"#
        );
    }

    #[test]
    fn test_functions() {
        let vars = JsonMap::new();
        assert_eq!(
            render(r#"{{ relative_url(path="/about/") }}"#, &vars).unwrap(),
            "/base/about/"
        );
        assert_eq!(
            render(r#"{{ absolute_url(path="/") }}"#, &vars).unwrap(),
            "https://example.com/base/"
        );
        assert_eq!(
            render(r#"{{ localized_url(path="/guide/", locale="fr") }}"#, &vars).unwrap(),
            "/base/fr/guide/"
        );
        assert_eq!(
            render(r#"{{ component(name="card") }}"#, &vars).unwrap(),
            r#"<div class="card"></div>"#
        );
    }

    #[test]
    fn test_partial_locals() {
        let vars = data(json!({"page": {"a": 1}}));
        let out = render(r#"{{ partial(name="nav", locals=page, b=2) }}"#, &vars).unwrap();
        assert_eq!(out, r#"<nav {"a":1,"b":2}>"#);
    }

    #[test]
    fn test_function_error_propagates() {
        let vars = JsonMap::new();
        let err = render(r#"{{ partial(name="missing") }}"#, &vars).unwrap_err();
        let chain = crate::logger::error_chain(&*err);
        assert!(chain.contains("partial `missing` failed"));
    }

    #[test]
    fn test_missing_name_argument() {
        let vars = JsonMap::new();
        assert!(render(r#"{{ partial(path="x") }}"#, &vars).is_err());
    }

    #[test]
    fn test_syntax_error() {
        assert!(render("{% if %}", &JsonMap::new()).is_err());
    }
}
