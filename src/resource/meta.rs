//! Typed view over a document's front matter.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Front matter as parsed: arbitrary nesting, key order preserved.
pub type JsonMap = serde_json::Map<String, Value>;

/// Key holding per-locale front matter that is merged over the base values.
pub const LOCALE_OVERRIDES: &str = "locale_overrides";

/// Text form of a scalar. YAML reads `title: 404` as a number and
/// `slug: yes` as a bool, both are meant as text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Deserialize an optional scalar as a string. `null` is absent.
fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_text(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a string, found `{value}`"))),
    }
}

/// Deserialize a single scalar or a list of scalars, treating `null` as empty.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let not_text = |value: &Value| D::Error::custom(format!("expected a string, found `{value}`"));
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| scalar_text(item).ok_or_else(|| not_text(item)))
            .collect(),
        Some(value) => scalar_text(&value)
            .map(|text| vec![text])
            .ok_or_else(|| not_text(&value)),
    }
}

/// Like [`string_or_list`], but a single string is split on whitespace.
///
/// `categories: rust web` is the same as `categories: [rust, web]`.
fn words_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = string_or_list(deserializer)?;
    if let [single] = values.as_slice() {
        return Ok(single.split_whitespace().map(str::to_string).collect());
    }
    Ok(values)
}

/// Fields of the front matter that drive localization, URLs and layout.
///
/// | Field              | Type              | Description                           |
/// |--------------------|-------------------|---------------------------------------|
/// | `title`            | `String`          | Used by `:title`                      |
/// | `slug`             | `String`          | Overrides the filename for `:slug`    |
/// | `permalink`        | `String`          | Explicit URL, wins over the style     |
/// | `layout`           | `String`          | Template in `_layouts` wrapping output|
/// | `date`             | `String`          | `YYYY-MM-DD[ HH:MM:SS]`               |
/// | `categories`       | `Vec<String>`     | Used by `:categories`                 |
/// | `locale`           | `String`          | A tag, or `multi`/`all`               |
/// | `locales`          | `Vec<String>`     | Explicit tag list                     |
/// | `draft`            | `bool`            | Skipped unless `drafts = true`        |
/// | `published`        | `bool`            | `false` behaves like `draft: true`    |
/// | `locale_overrides` | `{tag: {...}}`    | Per-locale front matter               |
///
/// Any other key stays available to templates through the raw map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMeta {
    #[serde(deserialize_with = "scalar")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub permalink: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub layout: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub date: Option<String>,
    #[serde(deserialize_with = "words_or_list")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "scalar")]
    pub locale: Option<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub locales: Vec<String>,
    pub draft: bool,
    pub published: Option<bool>,
}

impl DocumentMeta {
    /// Read the typed fields out of a front matter map.
    pub fn from_map(map: &JsonMap) -> Result<Self, serde_json::Error> {
        Self::deserialize(&Value::Object(map.clone()))
    }

    pub fn is_draft(&self) -> bool {
        self.draft || self.published == Some(false)
    }
}

/// Front matter as seen by `locale`: the base map with that locale's
/// `locale_overrides` entry deep-merged on top. The overrides key itself is dropped.
pub fn localized_front_matter(front_matter: &JsonMap, tag: &str) -> JsonMap {
    let mut merged = front_matter.clone();
    let overrides = merged.remove(LOCALE_OVERRIDES);
    if let Some(Value::Object(overlay)) = overrides.as_ref().and_then(|o| o.get(tag)) {
        deep_merge(&mut merged, overlay);
    }
    merged
}

/// Merge `overlay` into `base`. Nested maps merge recursively, anything else replaces.
pub fn deep_merge(base: &mut JsonMap, overlay: &JsonMap) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}
