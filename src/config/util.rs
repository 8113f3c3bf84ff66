//! Config file lookup and URL helpers.

use std::path::{Path, PathBuf};

/// Path part of a site URL without surrounding slashes.
///
/// `https://example.github.io/project/` gives `project`, a bare origin gives
/// an empty string and an unparsable URL gives `None`.
pub fn extract_url_path(url_str: &str) -> Option<String> {
    let parsed = url::Url::parse(url_str).ok()?;
    Some(parsed.path().trim_matches('/').to_string())
}

/// Locate `config_name`: an existing absolute path is used as is, otherwise the
/// current directory and its ancestors are searched, nearest first.
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }
    let cwd = std::env::current_dir().ok()?;
    find_upward(&cwd, config_name)
}

fn find_upward(start: &Path, config_name: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}
