//! Site address space: which source claims which URL.
//!
//! Every resource and every copied static file occupies one URL. A finished
//! build must not have two claims on the same URL.
//!
//! ```text
//! Sources                         URL Space
//! =======                         =========
//! about.md [en]             ->    /about/
//! about.md [fr]             ->    /fr/about/
//! assets/logo.png           ->    /assets/logo.png
//! ```

pub mod conflict;

pub use conflict::{UrlConflict, check_conflicts};
