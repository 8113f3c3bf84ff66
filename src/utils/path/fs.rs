//! File system path helpers for configured directories.
//!
//! - `normalize_path` - absolute form of an existing path (canonicalize + fallback)
//! - `anchor_path` - `~` expansion and anchoring of option paths at a directory

use std::path::{Path, PathBuf};

use super::sanitize::normalize_lexically;

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Expand a leading `~` and join relative paths onto `base`.
///
/// The result is normalized lexically, so the directory does not need to exist.
///
/// ```ignore
/// assert_eq!(anchor_path(Path::new("out"), Path::new("/site")), PathBuf::from("/site/out"));
/// ```
pub fn anchor_path(path: &Path, base: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = PathBuf::from(expanded);
    if path.is_absolute() {
        normalize_lexically(&path)
    } else {
        normalize_lexically(&base.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let normalized = normalize_path(Path::new("/absolute/path/file.txt"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.txt"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_anchor_path_relative() {
        assert_eq!(
            anchor_path(Path::new("./output/../_site"), Path::new("/site")),
            PathBuf::from("/site/_site")
        );
    }

    #[test]
    fn test_anchor_path_absolute_kept() {
        assert_eq!(
            anchor_path(Path::new("/var/www"), Path::new("/site")),
            PathBuf::from("/var/www")
        );
    }

    #[test]
    fn test_anchor_path_tilde() {
        let anchored = anchor_path(Path::new("~/portico-cache"), Path::new("/site"));
        assert!(anchored.is_absolute());
        assert!(anchored.ends_with("portico-cache"));
    }
}
