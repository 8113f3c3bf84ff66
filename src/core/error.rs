//! Pipeline error kinds.
//!
//! Every component-level failure propagates to the caller as a [`PipelineError`].
//! The build orchestrator decides whether one resource's failure aborts the whole
//! build or is collected and reported with the others.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed cause kept as the `source()` of engine and front matter errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Path normalization would escape the permitted base.
    #[error("path `{path}` escapes base directory `{}`", .base.display())]
    InvalidPath { base: PathBuf, path: String },

    /// No candidate template file exists.
    #[error("template not found for `{identity}` in `{}` (tried: {})", .dir.display(), .tried.join(", "))]
    TemplateNotFound {
        identity: String,
        dir: PathBuf,
        tried: Vec<String>,
    },

    /// No engine is registered for the requested extension.
    #[error("no template engine registered for `.{extension}` (needed by `{identity}`)")]
    UnsupportedTemplate { identity: String, extension: String },

    /// The underlying engine failed while rendering.
    #[error("failed to render `{identity}`: {message}")]
    TemplateRender {
        identity: String,
        message: String,
        #[source]
        source: BoxError,
    },

    /// A resource was registered without a usable identity.
    #[error("invalid resource identity in collection `{collection}`: {reason}")]
    ResourceIdentity { collection: String, reason: String },

    /// Two or more resources resolve to the same output URL.
    #[error("permalink conflicts:\n{0}")]
    PermalinkConflict(String),

    /// Helpers were requested without a bound or current site.
    #[error("no site bound to the view context and no build is active")]
    MissingSiteContext,

    /// Nested partial/component rendering went too deep.
    #[error("render depth limit ({limit}) exceeded at `{identity}`")]
    RenderDepth { identity: String, limit: usize },

    /// Front matter is malformed or does not have the expected shape.
    #[error("invalid front matter in `{path}`")]
    FrontMatter {
        path: String,
        #[source]
        source: BoxError,
    },

    /// Output was set on a resource that has already been written.
    #[error("resource `{0}` was already written and is immutable")]
    FrozenResource(String),

    #[error("IO error at `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts the whole build rather than one resource.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ResourceIdentity { .. } | Self::PermalinkConflict(_)
        )
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
