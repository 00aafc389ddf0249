//! `[routes]` section: the exact-match table and the parametric content rule.
//!
//! # Example
//!
//! ```toml
//! [[routes.page]]
//! path = "/projects"
//! fragment = "_content/projects.html"
//! title = "Projects"
//!
//! [routes.content]
//! prefix = "/writing"
//! dir = "_content/writing"
//! suffix = ".html"
//! ```

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;
use crate::core::normalize;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesSection {
    /// Exact-match routes. Declaring any replaces the built-in table.
    pub page: Vec<PageRoute>,

    /// Parametric rule for `<prefix>/<slug>` content pages.
    pub content: ContentRoute,
}

/// One exact-match route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRoute {
    pub path: String,
    pub fragment: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl PageRoute {
    fn new(path: &str, fragment: &str, title: Option<&str>) -> Self {
        Self {
            path: path.into(),
            fragment: fragment.into(),
            title: title.map(Into::into),
        }
    }
}

/// Content namespace served from one directory of fragments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContentRoute {
    pub enable: bool,
    /// Namespace prefix, e.g. `/writing`.
    pub prefix: String,
    /// Fragment directory relative to the site root.
    pub dir: String,
    /// Extension appended to the slug, stripped from incoming paths.
    pub suffix: String,
}

impl Default for ContentRoute {
    fn default() -> Self {
        Self {
            enable: true,
            prefix: "/writing".into(),
            dir: "_content/writing".into(),
            suffix: ".html".into(),
        }
    }
}

impl Default for RoutesSection {
    fn default() -> Self {
        Self {
            page: vec![
                PageRoute::new("/", "_content/home.html", None),
                PageRoute::new("/projects", "_content/projects.html", Some("Projects")),
                PageRoute::new("/writing", "_content/writing.html", Some("Writing")),
            ],
            content: ContentRoute::default(),
        }
    }
}

impl RoutesSection {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let mut seen = FxHashSet::default();

        for (i, route) in self.page.iter().enumerate() {
            let field = format!("routes.page[{i}].path");
            let canonical = normalize(&route.path);
            if canonical != route.path.as_str() {
                diag.error_with_hint(
                    field.clone(),
                    format!("route path `{}` is not canonical", route.path),
                    format!("use `{canonical}`"),
                );
            }
            if !seen.insert(canonical) {
                diag.error(field, format!("duplicate route `{}`", route.path));
            }
            if route.fragment.trim().is_empty() {
                diag.error(format!("routes.page[{i}].fragment"), "fragment location is empty");
            }
        }

        if !self.content.enable {
            return;
        }

        let prefix = normalize(&self.content.prefix);
        if prefix.is_root() {
            diag.error("routes.content.prefix", "content prefix must not be `/`");
        } else if prefix != self.content.prefix.as_str() {
            diag.error_with_hint(
                "routes.content.prefix",
                format!("content prefix `{}` is not canonical", self.content.prefix),
                format!("use `{prefix}`"),
            );
        } else if !seen.contains(&prefix) {
            diag.error_with_hint(
                "routes.content.prefix",
                format!("no page route for `{prefix}`; failed content loads fall back to it"),
                format!("add a [[routes.page]] entry with path = \"{prefix}\""),
            );
        }
    }
}
