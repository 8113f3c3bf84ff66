//! Portico - a static site build pipeline with locales, permalinks and components.
//!
//! The `portico` binary builds a site from `portico.toml`. Embedders use the same
//! pipeline to register typed components or extra template engines first:
//!
//! ```ignore
//! use std::sync::Arc;
//! use portico::component::ComponentTemplate;
//! use portico::render::{MarkdownEngine, register_engine};
//!
//! register_engine("mdx", Arc::new(|| Arc::new(MarkdownEngine::default())));
//!
//! let mut site = portico::site::Site::new(&config);
//! site.components_mut().register::<Card>(ComponentTemplate::named("card"));
//! let report = site.build()?;
//! ```

// Pipeline
pub mod address;
pub mod cache;
pub mod component;
pub mod core;
pub mod locale;
pub mod render;
pub mod resource;
pub mod site;

// Surface and support
pub mod cli;
pub mod config;
pub mod logger;
pub mod utils;
