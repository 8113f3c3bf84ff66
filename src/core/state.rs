//! Process-wide build state.
//!
//! A build run pushes its [`SiteContext`] with [`BuildScope::enter`] and the scope
//! clears it again when dropped. Components only read it when no site was bound
//! to their view context, so sequential builds never observe each other.

use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::site::SiteContext;

/// The site of the build currently running, if any.
static CURRENT_SITE: LazyLock<RwLock<Option<Arc<SiteContext>>>> =
    LazyLock::new(|| RwLock::new(None));

/// Get the site of the active build.
pub fn current_site() -> Option<Arc<SiteContext>> {
    CURRENT_SITE.read().clone()
}

/// Check if a build is active.
pub fn is_build_active() -> bool {
    CURRENT_SITE.read().is_some()
}

/// Guard marking a build as active for its lifetime.
///
/// Restores whatever was current before it on drop (normally nothing).
#[must_use = "the build context is cleared as soon as the scope is dropped"]
pub struct BuildScope {
    previous: Option<Arc<SiteContext>>,
}

impl BuildScope {
    pub fn enter(site: Arc<SiteContext>) -> Self {
        let previous = CURRENT_SITE.write().replace(site);
        Self { previous }
    }
}

impl Drop for BuildScope {
    fn drop(&mut self) {
        *CURRENT_SITE.write() = self.previous.take();
    }
}
