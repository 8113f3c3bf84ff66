//! Template file discovery.

use std::any::TypeId;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use dashmap::DashMap;

use crate::core::{PipelineError, PipelineResult};
use crate::utils::path::resolve;

use super::engine::short_type_name;

type CacheKey = (TypeId, PathBuf, String, Vec<String>);

/// (owner type, directory, template name, extensions) -> rank and path of the
/// candidate that matched.
static TEMPLATE_CACHE: LazyLock<DashMap<CacheKey, (usize, PathBuf)>> =
    LazyLock::new(DashMap::new);

/// Locate the template `name` of `Owner` inside `dir`.
///
/// Probes `<name>.<ext>` for every extension in order, then `<name>.html.<ext>`.
/// A `name` that already carries one of the extensions is tried as is first.
pub fn find_template<Owner: 'static>(
    dir: &Path,
    name: &str,
    extensions: &[String],
) -> PipelineResult<PathBuf> {
    find_template_for(
        TypeId::of::<Owner>(),
        short_type_name::<Owner>(),
        dir,
        name,
        extensions,
    )
}

/// Like [`find_template`] for owners only known at runtime.
pub fn find_template_for(
    owner: TypeId,
    identity: &str,
    dir: &Path,
    name: &str,
    extensions: &[String],
) -> PipelineResult<PathBuf> {
    let tried = candidates(name, extensions);
    let key = (owner, dir.to_path_buf(), name.to_string(), extensions.to_vec());

    // A hit stands while its file exists and no higher-ranked candidate appeared
    if let Some(hit) = TEMPLATE_CACHE.get(&key) {
        let (rank, path) = hit.value();
        if path.is_file() && !outranked(dir, &tried[..*rank]) {
            return Ok(path.clone());
        }
    }

    for (rank, candidate) in tried.iter().enumerate() {
        let path = resolve(dir, [candidate.as_str()])?;
        if path.is_file() {
            TEMPLATE_CACHE.insert(key, (rank, path.clone()));
            return Ok(path);
        }
    }
    TEMPLATE_CACHE.remove(&key);

    Err(PipelineError::TemplateNotFound {
        identity: identity.to_string(),
        dir: dir.to_path_buf(),
        tried,
    })
}

fn outranked(dir: &Path, candidates: &[String]) -> bool {
    candidates
        .iter()
        .any(|candidate| resolve(dir, [candidate.as_str()]).is_ok_and(|path| path.is_file()))
}

fn candidates(name: &str, extensions: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(extensions.len() * 2 + 1);
    let mut push = |candidate: String| {
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    };

    if extensions
        .iter()
        .any(|ext| name.ends_with(&format!(".{ext}")))
    {
        push(name.to_string());
    }
    for ext in extensions {
        push(format!("{name}.{ext}"));
    }
    for ext in extensions {
        push(format!("{name}.html.{ext}"));
    }
    out
}
