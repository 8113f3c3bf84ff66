//! `components_dir` option.
//!
//! Accepts a single directory or a list:
//!
//! ```toml
//! components_dir = "_components"
//! components_dir = ["_components", "./shared/components", "../theme/components"]
//! ```
//!
//! Entries starting with `./` or `../` resolve from the root directory, absolute
//! entries are used as-is, everything else is relative to the source directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::path::anchor_path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentsDir {
    One(String),
    Many(Vec<String>),
}

impl Default for ComponentsDir {
    fn default() -> Self {
        Self::One("_components".into())
    }
}

impl ComponentsDir {
    pub fn entries(&self) -> &[String] {
        match self {
            Self::One(dir) => std::slice::from_ref(dir),
            Self::Many(dirs) => dirs,
        }
    }

    /// Resolve every entry to an absolute load path, in declaration order.
    pub fn load_paths(&self, root: &Path, source: &Path) -> Vec<PathBuf> {
        self.entries()
            .iter()
            .map(|entry| {
                let base = if entry.starts_with("./") || entry.starts_with("../") {
                    root
                } else {
                    source
                };
                anchor_path(Path::new(entry), base)
            })
            .collect()
    }
}
