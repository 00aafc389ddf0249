//! Core types - pure functions shared by every other module.

mod path;
mod slug;

pub use path::{CanonicalPath, normalize};
pub use slug::{FALLBACK_SLUG, IdRegistry, slugify};
