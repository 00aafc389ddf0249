//! Configuration section definitions.
//!
//! | Module   | TOML Section | Purpose                                  |
//! |----------|--------------|------------------------------------------|
//! | `site`   | `[site]`     | Site name, default header, reserved ids  |
//! | `routes` | `[routes]`   | Exact routes and the content rule        |
//! | `layout` | `[layout]`   | Fade, debounce and spacing constants     |

mod layout;
mod routes;
mod site;

pub use layout::LayoutSection;
pub use routes::{ContentRoute, PageRoute, RoutesSection};
pub use site::SiteSection;
