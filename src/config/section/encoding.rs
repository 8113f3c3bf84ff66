//! `encoding` option: how source files are decoded.

use std::string::FromUtf8Error;

use crate::config::{ConfigDiagnostics, FieldPath};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Supported source encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Plain UTF-8 (default).
    #[default]
    Utf8,
    /// UTF-8 with an optional leading byte-order mark that is stripped.
    BomUtf8,
}

impl Encoding {
    const FIELD: FieldPath = FieldPath::new("encoding");

    /// Parse an `encoding` value. Names are case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "bom|utf-8" | "bom|utf8" => Some(Self::BomUtf8),
            _ => None,
        }
    }

    pub fn validate(name: &str, diag: &mut ConfigDiagnostics) {
        if Self::from_name(name).is_none() {
            diag.error_with_hint(
                Self::FIELD,
                format!("unsupported encoding `{name}`"),
                "supported encodings are `utf-8` and `bom|utf-8`",
            );
        }
    }

    /// Decode raw file content.
    pub fn decode(self, mut bytes: Vec<u8>) -> Result<String, FromUtf8Error> {
        if self == Self::BomUtf8 && bytes.starts_with(UTF8_BOM) {
            bytes.drain(..UTF8_BOM.len());
        }
        String::from_utf8(bytes)
    }
}
