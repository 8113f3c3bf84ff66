//! Core types - pure abstractions shared across the codebase.

mod error;
mod state;
mod url;

pub use error::{BoxError, PipelineError, PipelineResult};
pub use state::{BuildScope, current_site, is_build_active};
pub use url::UrlPath;
