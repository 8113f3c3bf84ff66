//! Resources: localized documents and the collections holding them.
//!
//! | Module       | Purpose                                        |
//! |--------------|------------------------------------------------|
//! | `document`   | `SourceDocument`, what discovery produces       |
//! | `front_matter` | YAML/TOML front matter blocks               |
//! | `meta`       | Typed front matter and locale override merging |
//! | `resource`   | `Resource` and its `ResourceId`                |
//! | `collection` | `ResourceCollection`                           |

mod collection;
mod document;
mod front_matter;
mod meta;
#[allow(clippy::module_inception)]
mod resource;

pub use collection::ResourceCollection;
pub use document::SourceDocument;
pub use front_matter::{has_front_matter, parse_front_matter};
pub(crate) use front_matter::toml_to_json;
pub use meta::{DocumentMeta, JsonMap};
pub use resource::{Resource, ResourceId};
