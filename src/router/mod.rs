//! Route resolution.
//!
//! Maps a [`CanonicalPath`] to the fragment that renders it. Exact routes are
//! checked first; the parametric content rule handles `<prefix>/<slug>`.
//! Resolution is pure and never touches the network.
//!
//! ```text
//! /                 → _content/home.html
//! /writing          → _content/writing.html
//! /writing/my-post  → _content/writing/my-post.html   (canonical /writing/my-post)
//! /writing/         → /writing (normalized first, so the exact route wins)
//! ```

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::{ContentRoute, RoutesSection};
use crate::core::{CanonicalPath, normalize};

/// What a path resolves to. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    /// Fragment location relative to the site root.
    pub fragment: String,
    /// Document-title override.
    pub title: Option<String>,
    /// Canonical path when it differs from the requested one.
    pub canonical: Option<CanonicalPath>,
}

impl RouteDescriptor {
    /// Path this descriptor should be recorded under.
    pub fn canonical_or(&self, requested: &CanonicalPath) -> CanonicalPath {
        self.canonical.clone().unwrap_or_else(|| requested.clone())
    }
}

#[derive(Debug, Clone)]
struct ContentRule {
    prefix: CanonicalPath,
    dir: String,
    suffix: String,
}

impl ContentRule {
    fn from_config(content: &ContentRoute) -> Option<Self> {
        if !content.enable {
            return None;
        }
        let prefix = normalize(&content.prefix);
        if prefix.is_root() {
            return None;
        }
        Some(Self {
            prefix,
            dir: content.dir.trim_end_matches('/').to_string(),
            suffix: content.suffix.clone(),
        })
    }

    /// Slug for `path`, or `None` when the remainder sanitizes to nothing.
    fn slug_for(&self, path: &CanonicalPath) -> Option<String> {
        let remainder = path.remainder_after(&self.prefix)?;
        let flat: String = remainder.chars().filter(|&c| c != '/').collect();
        let slug = match flat.strip_suffix(self.suffix.as_str()) {
            Some(stem) if !self.suffix.is_empty() => stem.to_string(),
            _ => flat,
        };
        (!slug.is_empty()).then_some(slug)
    }

    fn resolve(&self, path: &CanonicalPath) -> Option<RouteDescriptor> {
        let slug = self.slug_for(path)?;
        Some(RouteDescriptor {
            fragment: format!("{}/{slug}{}", self.dir, self.suffix),
            title: None,
            canonical: Some(normalize(&format!("{}/{slug}", self.prefix))),
        })
    }
}

/// Exact-match table plus the optional content rule.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    exact: FxHashMap<CanonicalPath, RouteDescriptor>,
    content: Option<ContentRule>,
}

impl RouteTable {
    pub fn from_config(routes: &RoutesSection) -> Self {
        let exact = routes
            .page
            .iter()
            .map(|page| {
                let descriptor = RouteDescriptor {
                    fragment: page.fragment.clone(),
                    title: page.title.clone(),
                    canonical: None,
                };
                (normalize(&page.path), descriptor)
            })
            .collect();

        Self {
            exact,
            content: ContentRule::from_config(&routes.content),
        }
    }

    /// Resolve a canonical path. Exact routes take precedence.
    pub fn resolve(&self, path: &CanonicalPath) -> Option<RouteDescriptor> {
        if let Some(descriptor) = self.exact.get(path) {
            return Some(descriptor.clone());
        }
        self.content.as_ref()?.resolve(path)
    }

    /// True for paths strictly below the content namespace root.
    pub fn is_content_path(&self, path: &CanonicalPath) -> bool {
        self.content
            .as_ref()
            .is_some_and(|rule| path.is_within(&rule.prefix) && *path != rule.prefix)
    }

    /// Namespace root used as the fetch-failure fallback.
    pub fn content_root(&self) -> Option<&CanonicalPath> {
        self.content.as_ref().map(|rule| &rule.prefix)
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.content.is_none()
    }

    /// Fragment locations of every exact route, sorted.
    pub fn fragments(&self) -> Vec<(&CanonicalPath, &str)> {
        let mut out: Vec<_> = self
            .exact
            .iter()
            .map(|(path, d)| (path, d.fragment.as_str()))
            .collect();
        out.sort();
        out
    }
}

/// Pick the navigation link to highlight for `path`.
///
/// The longest link that `path` lies under wins. The root link matches only
/// the root itself, otherwise it would highlight on every page.
pub fn active_nav<'a, I>(path: &CanonicalPath, links: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a CanonicalPath>,
{
    links
        .into_iter()
        .enumerate()
        .filter(|(_, link)| {
            if link.is_root() {
                path.is_root()
            } else {
                path.is_within(link)
            }
        })
        .max_by_key(|(_, link)| link.as_str().len())
        .map(|(i, _)| i)
}
