//! Path utilities.
//!
//! | Module     | Purpose                                         |
//! |------------|-------------------------------------------------|
//! | `fs`       | Absolute paths for configured directories       |
//! | `route`    | URL classification and suffix splitting         |
//! | `sanitize` | Traversal-safe joining under a base directory   |
//! | `slug`     | Slugs for permalink placeholders                |

pub mod fs;
pub mod route;
pub mod sanitize;
pub mod slug;

pub use fs::{anchor_path, normalize_path};
pub use sanitize::resolve;
