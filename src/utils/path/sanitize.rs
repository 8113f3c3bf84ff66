//! Traversal-safe path joining.
//!
//! [`resolve`] joins relative segments onto a base directory and normalizes the
//! result lexically. It never touches the filesystem, so it works for paths
//! that do not exist yet (output files, cache entries).

use std::path::{Component, Path, PathBuf};

use crate::core::{PipelineError, PipelineResult};

/// Join `segments` onto `base` and normalize, refusing to leave `base`.
///
/// - `.` segments are dropped, `..` pops the previous segment
/// - empty segments are ignored
/// - absolute segments and `..` past `base` fail with [`PipelineError::InvalidPath`]
///
/// # Example
///
/// ```ignore
/// let out = resolve(Path::new("/site"), ["posts", "./hello.md"])?;
/// assert_eq!(out, Path::new("/site/posts/hello.md"));
/// assert!(resolve(Path::new("/site"), ["../../etc/passwd"]).is_err());
/// ```
pub fn resolve<I, S>(base: &Path, segments: I) -> PipelineResult<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let base = normalize_lexically(base);
    let mut stack: Vec<String> = Vec::new();
    let mut joined = String::new();

    for segment in segments {
        let segment = segment.as_ref();
        if !joined.is_empty() {
            joined.push('/');
        }
        joined.push_str(segment);

        let escape = || PipelineError::InvalidPath {
            base: base.clone(),
            path: joined.clone(),
        };

        for component in Path::new(segment).components() {
            match component {
                Component::Normal(part) => stack.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir => {
                    if stack.pop().is_none() {
                        return Err(escape());
                    }
                }
                Component::RootDir | Component::Prefix(_) => return Err(escape()),
            }
        }
    }

    let mut resolved = base;
    resolved.extend(stack);
    Ok(resolved)
}

/// Normalize `.` and `..` without consulting the filesystem.
///
/// Leading `..` on a relative path are kept, since there is nothing to pop.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
