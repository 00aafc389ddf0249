//! Canonical path type.
//!
//! Invariants of `CanonicalPath`:
//! - Always starts with `/`
//! - Never carries a query string or fragment
//! - Never ends with `/`, except the root `/` itself

use std::borrow::Borrow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Normalized URL path, the single source of truth for "which page is loaded".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPath(Arc<str>);

/// Map any path or URL-ish string to a canonical path.
///
/// Total over all strings: everything from the first `?` or `#` is dropped,
/// a leading `/` is added when missing and trailing slashes are removed.
/// The empty string maps to `/`.
///
/// All trailing slashes go, not just one, so `normalize` stays idempotent
/// for inputs like `/a//`.
pub fn normalize(input: &str) -> CanonicalPath {
    let path = match input.find(['?', '#']) {
        Some(idx) => &input[..idx],
        None => input,
    };

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return CanonicalPath::root();
    }

    if trimmed.starts_with('/') {
        CanonicalPath(Arc::from(trimmed))
    } else {
        CanonicalPath(Arc::from(format!("/{trimmed}")))
    }
}

impl CanonicalPath {
    /// The site root `/`.
    pub fn root() -> Self {
        Self(Arc::from("/"))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.as_str() == "/"
    }

    /// True when `self` is `prefix` or lies underneath it.
    ///
    /// `/writing/post` is under `/writing`; `/writings` is not.
    pub fn is_within(&self, prefix: &CanonicalPath) -> bool {
        if prefix.is_root() {
            return true;
        }
        match self.as_str().strip_prefix(prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Path below `prefix`, without the separating slash.
    pub fn remainder_after(&self, prefix: &CanonicalPath) -> Option<&str> {
        if prefix.is_root() {
            return self.as_str().strip_prefix('/');
        }
        self.as_str()
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
    }
}

impl std::fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for CanonicalPath {
    fn default() -> Self {
        Self::root()
    }
}

impl AsRef<str> for CanonicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CanonicalPath {
    fn from(s: &str) -> Self {
        normalize(s)
    }
}

impl From<String> for CanonicalPath {
    fn from(s: String) -> Self {
        normalize(&s)
    }
}

impl PartialEq<str> for CanonicalPath {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for CanonicalPath {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl Serialize for CanonicalPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CanonicalPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(normalize(&s))
    }
}
