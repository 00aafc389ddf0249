//! `[site]` section: names and the default header.
//!
//! # Example
//!
//! ```toml
//! [site]
//! name = "Ada Lovelace"
//! title = "Ada Lovelace"
//! subtitles = ["notes on engines and mathematics", "notes on engines", "notes"]
//! reserved_ids = ["top", "site-nav"]
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;
use crate::core::IdRegistry;

/// Site identity and the header shown when a page supplies none.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Suffix of every document title.
    pub name: String,

    /// Default header title.
    pub title: String,

    /// Default header subtitle variants, most to least detailed.
    pub subtitles: Vec<String>,

    /// Ids owned by the static shell (header, nav, footer).
    pub reserved_ids: Vec<String>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            name: "Personal Site".into(),
            title: "Personal Site".into(),
            subtitles: Vec::new(),
            reserved_ids: Vec::new(),
        }
    }
}

impl SiteSection {
    /// Fresh id registry seeded with the shell's ids.
    pub fn id_registry(&self) -> IdRegistry {
        IdRegistry::with_reserved(self.reserved_ids.iter().cloned())
    }

    /// Document title for a page, always ending in the site name.
    pub fn document_title(&self, page_title: Option<&str>) -> String {
        match page_title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) if title != self.name => format!("{title} · {}", self.name),
            _ => self.name.clone(),
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.name.trim().is_empty() {
            diag.error("site.name", "site name must not be empty");
        }
        if self.subtitles.iter().any(|s| s.trim().is_empty()) {
            diag.error_with_hint(
                "site.subtitles",
                "subtitle variants must not be empty",
                "remove the empty entry",
            );
        }
    }
}
