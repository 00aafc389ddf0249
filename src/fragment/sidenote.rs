//! Sidenote markup scan.
//!
//! A reference is a `label.sidenote-number` whose `for` names the note; the
//! margin copy of the note is any element with a matching
//! `data-sidenote-ref`. Rail notes live in a `.writing-post__rail-right`
//! column; a fragment without that wrapper uses the parent of its first rail
//! note. Layout itself happens in the host, against live measurements; this
//! scan only pairs the two up.

use rustc_hash::FxHashSet;
use serde::Serialize;

use super::tree::{Fragment, NodeId};
use crate::utils::html::unescape;

pub const REFERENCE_CLASS: &str = "sidenote-number";
pub const RAIL_ATTR: &str = "data-sidenote-ref";
pub const RAIL_CLASS: &str = "writing-post__rail-right";

/// Selector for the rail column.
pub const RAIL_SELECTOR: &str = ".writing-post__rail-right";
/// Selector for notes in the rail.
pub const RAIL_NOTE_SELECTOR: &str = "[data-sidenote-ref]";

/// The rail column of a fragment, if it has one.
pub fn find_rail(fragment: &Fragment) -> Option<NodeId> {
    fragment
        .select_first(|el| el.has_class(RAIL_CLASS))
        .or_else(|| fragment.parent(fragment.select_first(|el| el.has_attr(RAIL_ATTR))?))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SidenoteIndex {
    /// Referenced note ids, in document order.
    pub references: Vec<String>,
    /// Rail note ids, in document order.
    pub rail_notes: Vec<String>,
}

impl SidenoteIndex {
    pub fn scan(fragment: &Fragment) -> Self {
        let references = fragment
            .select(|el| el.is("label") && el.has_class(REFERENCE_CLASS))
            .into_iter()
            .filter_map(|id| fragment.element(id)?.attr("for"))
            .map(|v| unescape(v).into_owned())
            .collect();

        let rail_notes = fragment
            .select(|el| el.has_attr(RAIL_ATTR))
            .into_iter()
            .filter_map(|id| fragment.element(id)?.attr(RAIL_ATTR))
            .map(|v| unescape(v).into_owned())
            .collect();

        Self {
            references,
            rail_notes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// References with no rail note, in document order.
    pub fn unmatched_references(&self) -> Vec<&str> {
        let rail: FxHashSet<&str> = self.rail_notes.iter().map(String::as_str).collect();
        self.references
            .iter()
            .map(String::as_str)
            .filter(|r| !rail.contains(r))
            .collect()
    }

    /// Rail notes nothing refers to, in document order.
    pub fn orphan_notes(&self) -> Vec<&str> {
        let refs: FxHashSet<&str> = self.references.iter().map(String::as_str).collect();
        self.rail_notes
            .iter()
            .map(String::as_str)
            .filter(|n| !refs.contains(n))
            .collect()
    }
}
