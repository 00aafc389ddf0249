//! Quire - navigation and content composition for fragment-based sites.
//!
//! A site shell loads pre-rendered HTML fragments into a single content
//! container. Each navigation resolves a route, fetches the fragment, enhances
//! its headings, builds a table of contents, lays out margin notes and picks
//! header text that fits the viewport.
//!
//! # Module Structure
//!
//! ```text
//! quire/
//! ├── core/       # Canonical paths, slugs, id registry
//! ├── router/     # Route table and parametric content rule
//! ├── fragment/   # Fragment snapshot, heading enhancer, TOC, metadata
//! ├── layout/     # Sidenote and responsive label resolvers, debouncer
//! ├── nav/        # Session, loader, history, selection lock, host seam
//! ├── shell/      # Native in-memory host (CLI + tests)
//! ├── web/        # Browser host (wasm32 only)
//! ├── config/     # quire.toml
//! └── logger      # log!/debug! macros
//! ```

#![forbid(unsafe_code)]

pub mod logger;

pub mod config;
pub mod core;
pub mod fragment;
pub mod layout;
pub mod nav;
pub mod router;
pub mod utils;

#[cfg(not(target_arch = "wasm32"))]
pub mod shell;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::QuireApp;

pub use config::SiteConfig;
pub use core::{CanonicalPath, IdRegistry, normalize, slugify};
pub use nav::{HistoryMode, Host, NavOutcome, NavigationState, Session, load_route};
pub use router::{RouteDescriptor, RouteTable};
