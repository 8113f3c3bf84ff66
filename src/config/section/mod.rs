//! Option groups of `portico.toml` that carry their own parsing and validation.
//!
//! | Module       | Option(s)          | Purpose                                |
//! |--------------|--------------------|----------------------------------------|
//! | `components` | `components_dir`   | Component search directories           |
//! | `encoding`   | `encoding`         | Source file decoding                   |
//! | `locales`    | `[[locales]]`      | Site locales and the default locale    |
//! | `permalink`  | `permalink`        | Permalink style or custom pattern      |

mod components;
mod encoding;
mod locales;
mod permalink;

pub use components::ComponentsDir;
pub use encoding::Encoding;
pub use locales::{LocaleEntry, default_locales};
pub use permalink::PermalinkStyle;
