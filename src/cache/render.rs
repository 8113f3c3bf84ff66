//! Render cache persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::debug;
use crate::resource::Resource;

use super::index::{CacheEntry, INDEX_FILE, RenderIndex};
use super::{ContentHash, ContentHasher};

/// Subdirectory of `cache_dir` holding rendered output.
pub const RENDER_DIR: &str = "render";

/// Content-addressed store of rendered resources for one build.
///
/// Lookups and stores take `&self` so rendering threads can share it.
pub struct RenderCache {
    dir: PathBuf,
    enabled: bool,
    fingerprint: ContentHash,
    previous: RenderIndex,
    current: Mutex<RenderIndex>,
    hits: AtomicUsize,
}

impl RenderCache {
    /// A cache that never hits and never writes.
    pub fn disabled() -> Self {
        Self {
            dir: PathBuf::new(),
            enabled: false,
            fingerprint: ContentHash::empty(),
            previous: RenderIndex::default(),
            current: Mutex::new(RenderIndex::new()),
            hits: AtomicUsize::new(0),
        }
    }

    /// Open the cache under `cache_dir`.
    ///
    /// `fingerprint` covers everything outside the resource itself that shapes
    /// its output (config, templates, data files).
    pub fn open(cache_dir: &Path, fingerprint: ContentHash) -> Self {
        let dir = cache_dir.join(RENDER_DIR);
        let previous = load_index(&dir).unwrap_or_else(|e| {
            debug!("cache"; "ignoring unreadable index in {}: {}", dir.display(), e);
            RenderIndex::default()
        });
        Self {
            dir,
            enabled: true,
            fingerprint,
            previous,
            current: Mutex::new(RenderIndex::new()),
            hits: AtomicUsize::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Key of `resource` under the current fingerprint.
    pub fn key(&self, resource: &Resource) -> ContentHash {
        let data = serde_json::to_string(resource.data()).unwrap_or_default();
        ContentHasher::new()
            .update_hash(self.fingerprint)
            .update(resource.id().to_string())
            .update(resource.relative_url().as_str())
            .update(data)
            .update(resource.document().body())
            .finish()
    }

    /// Cached output of `resource`, if its key did not change.
    pub fn get(&self, resource: &Resource, key: ContentHash) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let id = resource.id().to_string();
        let hex = key.to_hex();
        if !self.previous.matches(&id, &hex) {
            return None;
        }
        let output = fs::read_to_string(self.entry_path(&hex)).ok()?;

        self.record(id, hex, resource);
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(output)
    }

    /// Store freshly rendered output.
    pub fn put(&self, resource: &Resource, key: ContentHash, output: &str) {
        if !self.enabled {
            return;
        }
        let hex = key.to_hex();
        let path = self.entry_path(&hex);
        let written = fs::create_dir_all(&self.dir).and_then(|()| fs::write(&path, output));
        match written {
            Ok(()) => self.record(resource.id().to_string(), hex, resource),
            Err(e) => debug!("cache"; "failed to write {}: {}", path.display(), e),
        }
    }

    /// Number of lookups answered from disk.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Write the index of this build and delete entries it no longer uses.
    ///
    /// Returns the number of entries kept.
    pub fn persist(self) -> io::Result<usize> {
        if !self.enabled {
            return Ok(0);
        }
        let current = self.current.into_inner();
        fs::create_dir_all(&self.dir)?;

        let live: Vec<&str> = current.entries.values().map(|e| e.key.as_str()).collect();
        for stale in self.previous.entries.values() {
            if !live.contains(&stale.key.as_str()) {
                fs::remove_file(self.dir.join(format!("{}.html", stale.key))).ok();
            }
        }

        let json = serde_json::to_string_pretty(&current)?;
        fs::write(self.dir.join(INDEX_FILE), json)?;

        let kept = current.entries.len();
        debug!("cache"; "saved {} entries to {}", kept, self.dir.display());
        Ok(kept)
    }

    fn record(&self, id: String, key: String, resource: &Resource) {
        self.current.lock().entries.insert(
            id,
            CacheEntry {
                key,
                url: resource.relative_url().to_string(),
            },
        );
    }

    fn entry_path(&self, hex: &str) -> PathBuf {
        self.dir.join(format!("{hex}.html"))
    }
}

/// Remove the render cache below `cache_dir`.
pub fn clear_cache_dir(cache_dir: &Path) -> io::Result<()> {
    let dir = cache_dir.join(RENDER_DIR);
    if dir.exists() {
        fs::remove_dir_all(&dir)?;
    }
    Ok(())
}

fn load_index(dir: &Path) -> io::Result<RenderIndex> {
    let path = dir.join(INDEX_FILE);
    if !path.exists() {
        return Ok(RenderIndex::default());
    }
    let json = fs::read_to_string(&path)?;
    serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
