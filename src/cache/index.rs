//! Cache index data structures.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Index file name
pub const INDEX_FILE: &str = "index.json";

/// One cached resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Content key (blake3 hex), also the output file stem
    pub key: String,
    /// URL the output was rendered for
    pub url: String,
}

/// Resource identity (`path [locale]`) -> cache entry
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RenderIndex {
    pub entries: FxHashMap<String, CacheEntry>,
    /// Index creation time (Unix timestamp in seconds)
    #[serde(default)]
    pub created_at: u64,
}

impl RenderIndex {
    /// Create a new index with current timestamp.
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            created_at: current_timestamp(),
        }
    }

    /// Cached key of `id` if it equals `key`.
    pub fn matches(&self, id: &str, key: &str) -> bool {
        self.entries.get(id).is_some_and(|entry| entry.key == key)
    }
}

/// Get current Unix timestamp in seconds
fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
