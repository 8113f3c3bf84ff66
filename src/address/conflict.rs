//! URL conflict detection for resources and static files.

use rustc_hash::FxHashMap;

use crate::core::{PipelineError, PipelineResult, UrlPath};
use crate::log;
use crate::utils::plural::plural_s;

/// URL sources map: URL -> list of sources claiming that URL.
pub type UrlSourceMap = FxHashMap<UrlPath, Vec<String>>;

/// A URL conflict: multiple sources claim the same URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlConflict {
    /// The conflicting URL
    pub url: UrlPath,
    /// All sources claiming this URL, in claim order
    pub sources: Vec<String>,
}

/// Collect `(url, source)` claims into a URL -> sources map.
///
/// Directory URLs and their `index.html` file (`/a/` and `/a/index.html`)
/// land on the same output file and count as one URL.
pub fn collect_url_sources<I>(claims: I) -> UrlSourceMap
where
    I: IntoIterator<Item = (UrlPath, String)>,
{
    let mut url_sources = UrlSourceMap::default();
    for (url, source) in claims {
        url_sources.entry(output_key(url)).or_default().push(source);
    }
    url_sources
}

fn output_key(url: UrlPath) -> UrlPath {
    match url.as_str().strip_suffix("index.html") {
        Some(dir) if dir.ends_with('/') => UrlPath::from_page(dir),
        _ => url,
    }
}

/// Detect URLs claimed more than once, sorted by URL.
pub fn detect_conflicts(url_sources: &UrlSourceMap) -> Vec<UrlConflict> {
    let mut conflicts: Vec<_> = url_sources
        .iter()
        .filter(|(_, sources)| sources.len() > 1)
        .map(|(url, sources)| UrlConflict {
            url: url.clone(),
            sources: sources.clone(),
        })
        .collect();
    conflicts.sort_by(|a, b| a.url.cmp(&b.url));
    conflicts
}

/// Fail with [`PipelineError::PermalinkConflict`] when any URL is claimed twice.
pub fn check_conflicts<I>(claims: I) -> PipelineResult<()>
where
    I: IntoIterator<Item = (UrlPath, String)>,
{
    let conflicts = detect_conflicts(&collect_url_sources(claims));
    if conflicts.is_empty() {
        return Ok(());
    }
    print_conflicts(&conflicts);
    Err(PipelineError::PermalinkConflict(format_conflicts(&conflicts)))
}

/// Print conflicts using the standard log format.
///
/// Output format:
/// ```text
/// [conflict] permalink conflicts (1 url, 2 sources)
/// [url] /about/ (2 sources)
///   - about.md [en]
///   - about/index.html [en]
/// ```
pub fn print_conflicts(conflicts: &[UrlConflict]) {
    if conflicts.is_empty() {
        return;
    }

    let total_sources: usize = conflicts.iter().map(|c| c.sources.len()).sum();
    log!("conflict"; "permalink conflicts ({} url{}, {} source{})",
        conflicts.len(), plural_s(conflicts.len()),
        total_sources, plural_s(total_sources));

    for conflict in conflicts {
        log!("url"; "{} ({} source{})", conflict.url, conflict.sources.len(), plural_s(conflict.sources.len()));
        for source in &conflict.sources {
            eprintln!("  - {source}");
        }
    }
}

/// Format conflicts as a string (for error messages).
pub fn format_conflicts(conflicts: &[UrlConflict]) -> String {
    conflicts
        .iter()
        .map(format_single_conflict)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_single_conflict(conflict: &UrlConflict) -> String {
    let mut lines = vec![format!("{} ({})", conflict.url, conflict.sources.len())];
    for source in &conflict.sources {
        lines.push(format!("  - {source}"));
    }
    lines.join("\n")
}
