//! History coordination.
//!
//! Every successful load records a [`NavigationState`]. `popstate` reloads
//! only when the path changes; same-page hash links and `hashchange` just
//! scroll.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::{CanonicalPath, normalize};

/// The unit stored in a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub path: CanonicalPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl NavigationState {
    pub fn new(path: CanonicalPath, hash: Option<String>) -> Self {
        Self { path, hash }
    }

    /// URL written to the address bar.
    pub fn url(&self) -> String {
        match &self.hash {
            Some(hash) => format!("{}#{hash}", self.path),
            None => self.path.to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"path\":\"{}\"}}", self.path))
    }

    /// Parse a stored state; foreign or corrupt states yield `None`.
    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}

/// How a load is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// New entry (link navigation).
    Push,
    /// Overwrite the current entry (first load).
    Replace,
    /// Leave history alone (`popstate`).
    Skip,
}

/// Split `path#hash`, decoding the hash. An empty hash is `None`.
pub fn split_hash(target: &str) -> (&str, Option<String>) {
    match target.split_once('#') {
        Some((path, hash)) => (path, decode_hash(hash)),
        None => (target, None),
    }
}

/// Percent-decode a URL fragment into an element id.
pub fn decode_hash(raw: &str) -> Option<String> {
    let raw = raw.strip_prefix('#').unwrap_or(raw);
    if raw.is_empty() {
        return None;
    }
    Some(percent_decode_str(raw).decode_utf8_lossy().into_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopAction {
    /// Path differs from what is loaded: load it without recording.
    Reload { path: CanonicalPath, hash: Option<String> },
    /// Same page: only scroll.
    Scroll { hash: Option<String> },
}

pub fn on_popstate(current: Option<&CanonicalPath>, target: &NavigationState) -> PopAction {
    if current == Some(&target.path) {
        PopAction::Scroll {
            hash: target.hash.clone(),
        }
    } else {
        PopAction::Reload {
            path: target.path.clone(),
            hash: target.hash.clone(),
        }
    }
}

/// A click on an `<a>` element, as seen by the document.
#[derive(Debug, Clone, Default)]
pub struct LinkClick {
    pub href: String,
    pub button: i16,
    pub modified: bool,
    pub target: Option<String>,
    pub download: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// Let the browser handle it.
    Ignore,
    /// Same page: scroll to the hash (or the top).
    ScrollTo { hash: Option<String> },
    /// Load another page.
    Navigate { path: CanonicalPath, hash: Option<String> },
}

/// Decide what an intercepted link click should do.
///
/// `base` is the document URL the href is resolved against.
pub fn classify_click(click: &LinkClick, base: &Url, current: Option<&CanonicalPath>) -> ClickAction {
    if click.modified || click.button != 0 || click.download {
        return ClickAction::Ignore;
    }
    if click
        .target
        .as_deref()
        .is_some_and(|t| !t.is_empty() && t != "_self")
    {
        return ClickAction::Ignore;
    }

    let Ok(url) = base.join(click.href.trim()) else {
        return ClickAction::Ignore;
    };
    if !matches!(url.scheme(), "http" | "https") || url.origin() != base.origin() {
        return ClickAction::Ignore;
    }

    let path = normalize(url.path());
    let hash = url.fragment().and_then(decode_hash);

    if url.fragment().is_some() && current == Some(&path) {
        return ClickAction::ScrollTo { hash };
    }
    ClickAction::Navigate { path, hash }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.org/writing/post").unwrap()
    }

    fn click(href: &str) -> LinkClick {
        LinkClick {
            href: href.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_state_json() {
        let state = NavigationState::new(normalize("/writing"), Some("notes".into()));
        let json = state.to_json();
        assert_eq!(json, r#"{"path":"/writing","hash":"notes"}"#);
        assert_eq!(NavigationState::from_json(&json), Some(state));
        assert_eq!(NavigationState::from_json("null"), None);
        assert_eq!(
            NavigationState::from_json(r#"{"path":"/a/"}"#).unwrap().path,
            "/a"
        );
    }

    #[test]
    fn test_state_url() {
        assert_eq!(NavigationState::new(normalize("/"), None).url(), "/");
        assert_eq!(
            NavigationState::new(normalize("/a"), Some("b".into())).url(),
            "/a#b"
        );
    }

    #[test]
    fn test_split_hash() {
        assert_eq!(split_hash("/a#b%20c"), ("/a", Some("b c".to_string())));
        assert_eq!(split_hash("/a#"), ("/a", None));
        assert_eq!(split_hash("/a"), ("/a", None));
    }

    #[test]
    fn test_popstate() {
        let current = normalize("/writing");
        let same = NavigationState::new(normalize("/writing"), Some("x".into()));
        assert_eq!(
            on_popstate(Some(&current), &same),
            PopAction::Scroll {
                hash: Some("x".into())
            }
        );

        let other = NavigationState::new(normalize("/projects"), None);
        assert!(matches!(on_popstate(Some(&current), &other), PopAction::Reload { .. }));
        assert!(matches!(on_popstate(None, &same), PopAction::Reload { .. }));
    }

    #[test]
    fn test_click_same_page_hash_scrolls() {
        let current = normalize("/writing/post");
        assert_eq!(
            classify_click(&click("#setup"), &base(), Some(&current)),
            ClickAction::ScrollTo {
                hash: Some("setup".into())
            }
        );
        assert_eq!(
            classify_click(&click("#"), &base(), Some(&current)),
            ClickAction::ScrollTo { hash: None }
        );
    }

    #[test]
    fn test_click_navigates() {
        let current = normalize("/writing/post");
        assert_eq!(
            classify_click(&click("/projects"), &base(), Some(&current)),
            ClickAction::Navigate {
                path: normalize("/projects"),
                hash: None
            }
        );
        assert_eq!(
            classify_click(&click("other#a"), &base(), Some(&current)),
            ClickAction::Navigate {
                path: normalize("/writing/other"),
                hash: Some("a".into())
            }
        );
    }

    #[test]
    fn test_click_ignored() {
        let current = normalize("/");
        let cases = [
            LinkClick {
                modified: true,
                ..click("/a")
            },
            LinkClick {
                button: 1,
                ..click("/a")
            },
            LinkClick {
                target: Some("_blank".into()),
                ..click("/a")
            },
            LinkClick {
                download: true,
                ..click("/a")
            },
            click("https://elsewhere.net/a"),
            click("mailto:me@example.org"),
        ];
        for case in &cases {
            assert_eq!(classify_click(case, &base(), Some(&current)), ClickAction::Ignore, "{case:?}");
        }

        let same_window = LinkClick {
            target: Some("_self".into()),
            ..click("/a")
        };
        assert!(matches!(
            classify_click(&same_window, &base(), Some(&current)),
            ClickAction::Navigate { .. }
        ));
    }
}
