//! Front matter blocks: YAML between `---` lines, TOML between `+++` lines.

use serde_json::Value;

use crate::core::{PipelineError, PipelineResult};

use super::JsonMap;

/// Split `text` into front matter and body, parsing the front matter.
///
/// Text without a front matter block yields an empty map and the whole text.
pub fn parse_front_matter<'a>(path: &str, text: &'a str) -> PipelineResult<(JsonMap, &'a str)> {
    let Some((delimiter, raw, body)) = split(text) else {
        return Ok((JsonMap::new(), text));
    };

    let parsed = match delimiter {
        YAML => parse_yaml(raw),
        _ => parse_toml(raw),
    };
    parsed
        .map(|map| (map, body))
        .map_err(|source| PipelineError::FrontMatter {
            path: path.to_string(),
            source,
        })
}

/// Whether `text` opens with a complete front matter block.
pub fn has_front_matter(text: &str) -> bool {
    split(text).is_some()
}

const YAML: &str = "---";
const TOML: &str = "+++";

/// Returns (opening delimiter, raw block, body).
fn split(text: &str) -> Option<(&'static str, &str, &str)> {
    let (first, rest) = text.split_once('\n')?;
    let delimiter = match first.trim_end() {
        YAML => YAML,
        TOML => TOML,
        _ => return None,
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        let closes = trimmed == delimiter || (delimiter == YAML && trimmed == "...");
        if closes {
            return Some((delimiter, &rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn parse_yaml(raw: &str) -> Result<JsonMap, crate::core::BoxError> {
    if raw.trim().is_empty() {
        return Ok(JsonMap::new());
    }
    match serde_yaml::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(JsonMap::new()),
        other => Err(format!("expected a mapping, found `{other}`").into()),
    }
}

fn parse_toml(raw: &str) -> Result<JsonMap, crate::core::BoxError> {
    let table: toml::Table = raw.parse()?;
    Ok(table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json(value)))
        .collect())
}

/// TOML dates become their string form so `date = 2024-06-15` reads like YAML.
pub(crate) fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}
