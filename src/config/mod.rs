//! Site configuration management for `portico.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Options with their own parsing/validation
//! │   ├── components # components_dir
//! │   ├── encoding   # encoding
//! │   ├── locales    # [[locales]]
//! │   └── permalink  # permalink
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   ├── field      # FieldPath
//! │   └── handle     # Global config handle
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Example
//!
//! ```toml
//! source = "src"
//! destination = "output"
//! permalink = "pretty"
//! base_path = "/docs"
//! collections = ["posts", "docs"]
//!
//! [[locales]]
//! tag = "en"
//! default = true
//!
//! [[locales]]
//! tag = "fr"
//! ```

pub mod section;
pub mod types;
mod util;

use util::{extract_url_path, find_config_file};

pub use section::{ComponentsDir, Encoding, LocaleEntry, PermalinkStyle};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config};

use crate::{
    cli::BuildArgs,
    log,
    utils::path::{anchor_path, normalize_path},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Collection every site has, holding documents outside `_<collection>` dirs.
pub const PAGES_COLLECTION: &str = "pages";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing `portico.toml`.
///
/// Directory options are relative in the file and absolute after [`SiteConfig::load`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root; defaults to the directory holding the config file.
    pub root_dir: PathBuf,

    /// Directory holding the documents, relative to `root_dir`.
    pub source: PathBuf,

    /// Output directory, relative to `root_dir`.
    pub destination: PathBuf,

    /// Render cache directory, relative to `root_dir`.
    pub cache_dir: PathBuf,

    pub permalink: PermalinkStyle,

    /// URL prefix for every resource (`/` for none).
    pub base_path: String,

    /// Deprecated spelling of `base_path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseurl: Option<String>,

    /// Public site URL, used for absolute URLs.
    pub url: Option<String>,

    pub components_dir: ComponentsDir,

    /// Collections besides `pages`, read from `_<name>` directories.
    pub collections: Vec<String>,

    pub disable_disk_cache: bool,

    /// Source file encoding: `utf-8` or `bom|utf-8`.
    pub encoding: String,

    pub locales: Vec<LocaleEntry>,

    /// Render documents marked as drafts.
    pub drafts: bool,

    /// Remove output and cache before building (CLI only)
    #[serde(skip)]
    pub clean: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root_dir: PathBuf::new(),
            source: PathBuf::from("src"),
            destination: PathBuf::from("output"),
            cache_dir: PathBuf::from(".portico-cache"),
            permalink: PermalinkStyle::default(),
            base_path: "/".into(),
            baseurl: None,
            url: None,
            components_dir: ComponentsDir::default(),
            collections: vec!["posts".into()],
            disable_disk_cache: false,
            encoding: "utf-8".into(),
            locales: section::default_locales(),
            drafts: false,
            clean: false,
        }
    }
}

impl SiteConfig {
    /// Load, apply CLI overrides, resolve paths and validate.
    ///
    /// `config_name` is searched upward from the current directory. The
    /// project root defaults to the config file's parent directory.
    pub fn load(config_name: &Path, args: &BuildArgs) -> Result<Self> {
        let config_path = find_config_file(config_name)
            .ok_or_else(|| ConfigError::NotFound(config_name.to_path_buf()))?;

        let mut config = Self::from_path(&config_path)?;
        config.config_path = normalize_path(&config_path);
        config.apply_build_args(args);

        let root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .context("config file has no parent directory")?;

        let mut diag = ConfigDiagnostics::new();
        config.finalize(&root, &mut diag);
        config.validate_into(&mut diag);
        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    pub fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warn"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply build arguments from CLI.
    pub fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.source, args.source.as_ref());
        Self::update_option(&mut self.destination, args.destination.as_ref());
        Self::update_option(&mut self.base_path, args.base_path.as_ref());
        self.drafts |= args.drafts;
        self.clean = args.clean;
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // normalization
    // ========================================================================

    /// Resolve deprecated aliases, the base path and every directory option.
    ///
    /// `root` is used when `root_dir` is unset; a relative `root_dir` is
    /// taken relative to it.
    pub fn finalize(&mut self, root: &Path, diag: &mut ConfigDiagnostics) {
        self.apply_deprecated_aliases(diag);
        self.sync_base_path_from_url();
        self.base_path = normalize_base_path(&self.base_path);
        self.normalize_paths(root);
    }

    fn apply_deprecated_aliases(&mut self, diag: &mut ConfigDiagnostics) {
        let Some(baseurl) = self.baseurl.take() else {
            return;
        };
        if is_root_base(&self.base_path) {
            self.base_path = baseurl;
            diag.warn(FieldPath::new("baseurl"), "renamed to `base_path`");
        } else {
            diag.warn(
                FieldPath::new("baseurl"),
                "ignored because `base_path` is also set",
            );
        }
    }

    /// Derive `base_path` from the path part of `url` when none was given.
    ///
    /// `url = "https://example.github.io/project"` gives `base_path = "/project"`.
    fn sync_base_path_from_url(&mut self) {
        if is_root_base(&self.base_path)
            && let Some(ref url) = self.url
            && let Some(path) = extract_url_path(url)
            && !path.is_empty()
        {
            self.base_path = format!("/{path}");
        }
    }

    fn normalize_paths(&mut self, root: &Path) {
        self.root_dir = if self.root_dir.as_os_str().is_empty() {
            root.to_path_buf()
        } else {
            anchor_path(&self.root_dir, root)
        };
        self.source = anchor_path(&self.source, &self.root_dir);
        self.destination = anchor_path(&self.destination, &self.root_dir);
        self.cache_dir = anchor_path(&self.cache_dir, &self.root_dir);
    }

    // ========================================================================
    // derived settings
    // ========================================================================

    /// `pages` followed by the configured collections, without duplicates.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names = vec![PAGES_COLLECTION.to_string()];
        for name in &self.collections {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Directories searched for component templates, in priority order.
    pub fn components_load_paths(&self) -> Vec<PathBuf> {
        self.components_dir
            .load_paths(&self.root_dir, &self.source)
    }

    /// Decoder for source files; invalid names were rejected by validation.
    pub fn source_encoding(&self) -> Encoding {
        Encoding::from_name(&self.encoding).unwrap_or_default()
    }

    /// Whether `base_path` adds nothing to URLs.
    pub fn has_root_base_path(&self) -> bool {
        is_root_base(&self.base_path)
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate all options, collecting every error.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.validate_into(&mut diag);
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    fn validate_into(&self, diag: &mut ConfigDiagnostics) {
        LocaleEntry::validate_all(&self.locales, diag);
        self.permalink.validate(diag);
        Encoding::validate(&self.encoding, diag);
        self.validate_base_path(diag);
        self.validate_collections(diag);

        if !self.source.as_os_str().is_empty() && self.source == self.destination {
            diag.error(
                FieldPath::new("destination"),
                "destination must differ from source",
            );
        }
    }

    fn validate_base_path(&self, diag: &mut ConfigDiagnostics) {
        const FIELD: FieldPath = FieldPath::new("base_path");
        if !self.base_path.starts_with('/') {
            diag.error_with_hint(
                FIELD,
                format!("`{}` must start with `/`", self.base_path),
                "e.g. `base_path = \"/docs\"`",
            );
        }
        if self.base_path.contains("//") || self.base_path.split('/').any(|s| s == "..") {
            diag.error(FIELD, format!("`{}` is not a clean URL path", self.base_path));
        }
    }

    fn validate_collections(&self, diag: &mut ConfigDiagnostics) {
        const FIELD: FieldPath = FieldPath::new("collections");
        for name in &self.collections {
            let valid = !name.is_empty()
                && !name.starts_with(['_', '.'])
                && name
                    .chars()
                    .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_'));
            if !valid {
                diag.error_with_hint(
                    FIELD,
                    format!("invalid collection name `{name}`"),
                    "names are read from `_<name>` directories, e.g. `posts` for `_posts/`",
                );
            }
        }
    }
}

fn is_root_base(base_path: &str) -> bool {
    base_path.is_empty() || base_path == "/"
}

/// `docs/` -> `/docs`, `` -> `/`. Invalid values are left for validation.
fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".into()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from TOML.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Parsed and finalized config rooted at `root`.
#[cfg(test)]
pub fn test_site_config(root: &Path, content: &str) -> SiteConfig {
    let mut config = test_parse_config(content);
    let mut diag = ConfigDiagnostics::new();
    config.finalize(root, &mut diag);
    config.validate().unwrap();
    config
}

// ============================================================================
// tests
// ============================================================================
