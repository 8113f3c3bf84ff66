//! Content hashing using blake3.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use jwalk::WalkDir;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create a hash representing "no content" (all zeros).
    #[inline]
    pub const fn empty() -> Self {
        Self([0; 32])
    }

    /// Check if this is the empty/zero hash.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == [0; 32]
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(arr))
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 16 hex chars are enough for logs
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Incremental hash over several labelled parts.
///
/// Every part is length-prefixed, so `("ab", "c")` and `("a", "bc")` differ.
pub struct ContentHasher(blake3::Hasher);

impl ContentHasher {
    pub fn new() -> Self {
        Self(blake3::Hasher::new())
    }

    pub fn update(&mut self, part: impl AsRef<[u8]>) -> &mut Self {
        let part = part.as_ref();
        self.0.update(&(part.len() as u64).to_le_bytes());
        self.0.update(part);
        self
    }

    pub fn update_hash(&mut self, hash: ContentHash) -> &mut Self {
        self.update(hash.as_bytes())
    }

    pub fn finish(&self) -> ContentHash {
        ContentHash::new(*self.0.finalize().as_bytes())
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash of file contents; a missing or unreadable file gives [`ContentHash::empty`].
pub fn hash_file(path: &Path) -> ContentHash {
    hash_file_inner(path).unwrap_or_else(|_| ContentHash::empty())
}

fn hash_file_inner(path: &Path) -> io::Result<ContentHash> {
    let mut reader = BufReader::with_capacity(64 * 1024, File::open(path)?);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(ContentHash::new(*hasher.finalize().as_bytes()))
}

/// Hash of a directory tree: relative paths and contents, sorted.
///
/// A missing directory gives [`ContentHash::empty`].
pub fn hash_dir(path: &Path) -> ContentHash {
    if !path.is_dir() {
        return ContentHash::empty();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .collect();
    files.sort();

    let mut hasher = ContentHasher::new();
    for file in files {
        let relative = file.strip_prefix(path).unwrap_or(&file);
        hasher
            .update(relative.to_string_lossy().as_bytes())
            .update_hash(hash_file(&file));
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_hex_round_trip() {
        let hash = ContentHasher::new().update("x").finish();
        assert_eq!(ContentHash::from_hex(&hash.to_hex()), Some(hash));
        assert_eq!(ContentHash::from_hex("abcd"), None);
        assert_eq!(hash.to_string().len(), 16);
    }

    #[test]
    fn test_parts_are_delimited() {
        let a = ContentHasher::new().update("ab").update("c").finish();
        let b = ContentHasher::new().update("a").update("bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "hello").unwrap();
        let first = hash_file(&file);
        assert!(!first.is_empty());
        assert_eq!(first, hash_file(&file));

        fs::write(&file, "hello!").unwrap();
        assert_ne!(first, hash_file(&file));
        assert!(hash_file(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn test_hash_dir_tracks_names_and_contents() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/a.tera"), "a").unwrap();
        let first = hash_dir(dir.path());

        fs::rename(dir.path().join("sub/a.tera"), dir.path().join("sub/b.tera")).unwrap();
        let renamed = hash_dir(dir.path());
        assert_ne!(first, renamed);

        fs::write(dir.path().join("sub/b.tera"), "b").unwrap();
        assert_ne!(renamed, hash_dir(dir.path()));
        assert!(hash_dir(&dir.path().join("missing")).is_empty());
    }
}
