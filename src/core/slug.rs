//! Heading slugs and the document-wide id registry.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;

/// Token used when a heading slugifies to nothing.
pub const FALLBACK_SLUG: &str = "section";

/// Characters removed before whitespace is turned into hyphens.
const STRIPPED: &[char] = &[
    '"', '\'', '`', '~', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '=', '+', '[', ']',
    '{', '}', '|', ';', ':', '\\', '<', '>', ',', '.', '?', '/',
];

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Turn heading text into a lowercase, URL-safe token.
///
/// Returns an empty string when nothing survives; callers substitute
/// [`FALLBACK_SLUG`].
///
/// ```ignore
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// ```
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered.trim().chars().filter(|c| !STRIPPED.contains(c)).collect();
    let hyphenated = WHITESPACE.replace_all(&stripped, "-");
    let collapsed = HYPHENS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Set of ids already present in the document.
///
/// Scoped to the whole page: ids from the static shell are reserved up
/// front, ids found in a fragment are added before any heading is
/// processed, and every generated id is claimed before the next one is
/// computed.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    taken: FxHashSet<String>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-seeded with ids owned by the surrounding shell.
    pub fn with_reserved<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Mark an existing id as taken. Returns false when it already was.
    pub fn reserve(&mut self, id: impl Into<String>) -> bool {
        self.taken.insert(id.into())
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }

    /// Claim `candidate`, or the first free `candidate-2`, `candidate-3`, ...
    pub fn claim(&mut self, candidate: &str) -> String {
        let id = if self.taken.contains(candidate) {
            (2..)
                .map(|n| format!("{candidate}-{n}"))
                .find(|id| !self.taken.contains(id))
                .unwrap_or_else(|| candidate.to_string())
        } else {
            candidate.to_string()
        };
        self.taken.insert(id.clone());
        id
    }

    /// Slugify `text` (with the fallback token) and claim the result.
    pub fn claim_slug(&mut self, text: &str) -> String {
        let slug = slugify(text);
        if slug.is_empty() {
            self.claim(FALLBACK_SLUG)
        } else {
            self.claim(&slug)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify_examples() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Why  Rust?  "), "why-rust");
        assert_eq!(slugify("a - b"), "a-b");
        assert_eq!(slugify("C++ & \"friends\""), "c-friends");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn test_slugify_punctuation_only() {
        assert_eq!(slugify("?!..."), "");
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_claim_suffixes_in_order() {
        let mut ids = IdRegistry::new();
        assert_eq!(ids.claim_slug("Notes"), "notes");
        assert_eq!(ids.claim_slug("Notes"), "notes-2");
        assert_eq!(ids.claim_slug("notes!"), "notes-3");
    }

    #[test]
    fn test_claim_respects_reserved() {
        let mut ids = IdRegistry::with_reserved(["introduction", "section"]);
        assert_eq!(ids.claim("introduction"), "introduction-2");
        assert_eq!(ids.claim_slug("???"), "section-2");
    }

    #[test]
    fn test_claim_skips_existing_suffix() {
        let mut ids = IdRegistry::with_reserved(["a", "a-2"]);
        assert_eq!(ids.claim("a"), "a-3");
    }

    proptest! {
        #[test]
        fn prop_claimed_ids_are_distinct(texts in proptest::collection::vec(".{0,12}", 0..24)) {
            let mut ids = IdRegistry::new();
            let claimed: Vec<String> = texts.iter().map(|t| ids.claim_slug(t)).collect();
            let unique: FxHashSet<&String> = claimed.iter().collect();
            prop_assert_eq!(unique.len(), claimed.len());
        }
    }
}
