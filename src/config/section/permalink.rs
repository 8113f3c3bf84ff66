//! `permalink` option.
//!
//! ```toml
//! permalink = "pretty"                        # /about/, /posts/hello/
//! permalink = "simple"                        # /about.html
//! permalink = "/:collection/:year/:slug/"     # custom pattern
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// How resource URLs are derived when front matter sets no `permalink`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PermalinkStyle {
    /// Directory URLs with a trailing slash (default).
    #[default]
    Pretty,
    /// Flat `.html` URLs.
    Simple,
    /// A pattern with `:placeholder` segments, applied to every collection.
    Custom(String),
}

impl PermalinkStyle {
    const FIELD: FieldPath = FieldPath::new("permalink");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let Self::Custom(pattern) = self else {
            return;
        };
        if !pattern.starts_with('/') {
            diag.error_with_hint(
                Self::FIELD,
                format!("custom permalink `{pattern}` must start with `/`"),
                "use `pretty`, `simple`, or a pattern such as `/:collection/:slug/`",
            );
        }
        if pattern.split('/').any(|seg| seg == "..") {
            diag.error(Self::FIELD, format!("custom permalink `{pattern}` contains `..`"));
        }
    }
}

impl From<String> for PermalinkStyle {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pretty" => Self::Pretty,
            "simple" => Self::Simple,
            _ => Self::Custom(value),
        }
    }
}

impl From<PermalinkStyle> for String {
    fn from(style: PermalinkStyle) -> Self {
        match style {
            PermalinkStyle::Pretty => "pretty".into(),
            PermalinkStyle::Simple => "simple".into(),
            PermalinkStyle::Custom(pattern) => pattern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_permalink_named_styles() {
        assert_eq!(test_parse_config("").permalink, PermalinkStyle::Pretty);
        assert_eq!(
            test_parse_config("permalink = \"simple\"").permalink,
            PermalinkStyle::Simple
        );
    }

    #[test]
    fn test_permalink_custom_pattern() {
        let config = test_parse_config("permalink = \"/:collection/:slug/\"");
        assert_eq!(
            config.permalink,
            PermalinkStyle::Custom("/:collection/:slug/".into())
        );

        let mut diag = ConfigDiagnostics::new();
        config.permalink.validate(&mut diag);
        assert!(!diag.has_errors());
    }

    #[test]
    fn test_permalink_custom_must_be_rooted() {
        let mut diag = ConfigDiagnostics::new();
        PermalinkStyle::Custom(":slug/../x".into()).validate(&mut diag);
        assert_eq!(diag.errors().len(), 2);
    }
}
