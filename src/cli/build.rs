//! `portico build`.

use std::time::Instant;

use anyhow::Result;

use crate::config::SiteConfig;
use crate::log;
use crate::site::{BuildReport, Site};

/// Build the site described by `config`.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    let started = Instant::now();
    log!(
        "build";
        "{} -> {}",
        config.source.display(),
        config.destination.display()
    );

    let mut site = Site::new(config);
    let report = site.build()?;

    crate::debug!("build"; "finished in {:.2?}", started.elapsed());
    Ok(report)
}
