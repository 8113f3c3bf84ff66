//! Utility modules shared across the pipeline.

pub mod date;
pub mod path;
pub mod plural;
