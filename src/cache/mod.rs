//! Disk cache of rendered resources.
//!
//! ```text
//! <cache_dir>/render/
//! ├── index.json        # resource -> content key
//! └── <key>.html        # rendered output, named by its blake3 key
//! ```
//!
//! A key covers the resource's identity, URL, merged front matter and body, plus a
//! fingerprint of the config and every template and data file. Any change to those
//! misses the cache.

mod hash;
mod index;
mod render;

pub use hash::{ContentHash, ContentHasher, hash_dir, hash_file};
pub use render::{RENDER_DIR, RenderCache, clear_cache_dir};
