//! Table of contents.
//!
//! Headings become a two-level tree: sections (`h2`) with their
//! subsections (`h3`). A subsection seen before any section is promoted to
//! the top level and collects the subsections that follow it. The optional
//! introduction entry points at the page's lead element and never nests.

use serde::Serialize;

use super::heading::HeadingRecord;
use super::tree::{Element, Fragment, NodeId};
use crate::core::IdRegistry;

pub const MOUNT_ATTR: &str = "data-toc";
pub const EMPTY_ATTR: &str = "data-toc-empty";
pub const INTRO_ATTR: &str = "data-toc-intro";
pub const INTRO_ID: &str = "introduction";
pub const INTRO_LABEL: &str = "Introduction";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TocLevel {
    Intro,
    Section,
    Subsection,
}

impl TocLevel {
    pub fn from_heading(level: u8) -> Self {
        if level <= 2 { Self::Section } else { Self::Subsection }
    }

    /// Numeric level used in the `toc-level-N` class.
    pub fn depth(self) -> u8 {
        match self {
            Self::Intro => 1,
            Self::Section => 2,
            Self::Subsection => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub level: TocLevel,
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    pub fn new(level: TocLevel, id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            level,
            id: id.into(),
            label: label.into(),
            children: Vec::new(),
        }
    }
}

impl From<&HeadingRecord> for TocEntry {
    fn from(record: &HeadingRecord) -> Self {
        Self::new(
            TocLevel::from_heading(record.level),
            record.id.as_str(),
            record.label.as_str(),
        )
    }
}

/// Arrange flat entries (document order) into the TOC tree.
pub fn build_tree<I>(entries: I) -> Vec<TocEntry>
where
    I: IntoIterator<Item = TocEntry>,
{
    let mut tree: Vec<TocEntry> = Vec::new();
    let mut current: Option<usize> = None;

    for entry in entries {
        match (entry.level, current) {
            (TocLevel::Intro, _) => {
                tree.push(entry);
                current = None;
            }
            (TocLevel::Subsection, Some(section)) => tree[section].children.push(entry),
            (TocLevel::Section | TocLevel::Subsection, _) => {
                tree.push(entry);
                current = Some(tree.len() - 1);
            }
        }
    }
    tree
}

/// Build the TOC for enhanced headings, with the introduction entry first.
pub fn build_toc(intro: Option<TocEntry>, headings: &[HeadingRecord]) -> Vec<TocEntry> {
    build_tree(intro.into_iter().chain(headings.iter().map(TocEntry::from)))
}

/// Locate the introduction target and make sure it has an id.
///
/// The target is the first `data-toc-intro` element, else the first `h1`.
/// Returns `None` when the page has no headings to introduce.
pub fn intro_entry(
    fragment: &mut Fragment,
    headings: &[HeadingRecord],
    ids: &mut IdRegistry,
) -> Option<TocEntry> {
    if headings.is_empty() {
        return None;
    }

    let target = fragment
        .select_first(|el| el.has_attr(INTRO_ATTR))
        .or_else(|| fragment.select_first(|el| el.is("h1")))?;

    let el = fragment.element_mut(target)?;
    let id = match el.plain_id() {
        Some(existing) => existing,
        None => {
            let id = ids.claim(INTRO_ID);
            el.set_attr("id", &id);
            id
        }
    };
    Some(TocEntry::new(TocLevel::Intro, id, INTRO_LABEL))
}

/// Render `entries` into the fragment's TOC mount.
///
/// Returns the mount, or `None` if the fragment has none. The mount's
/// previous content is replaced; an empty TOC flags the mount instead.
pub fn render_toc(fragment: &mut Fragment, entries: &[TocEntry]) -> Option<NodeId> {
    let mount = fragment.select_first(|el| el.has_attr(MOUNT_ATTR))?;
    fragment.clear_children(mount);

    let el = fragment.element_mut(mount)?;
    if entries.is_empty() {
        el.set_attr(EMPTY_ATTR, "");
        return Some(mount);
    }
    el.remove_attr(EMPTY_ATTR);

    let list = fragment.append_element(mount, Element::new("ol").with_attr("class", "toc-list"));
    render_entries(fragment, list, entries);
    Some(mount)
}

fn render_entries(fragment: &mut Fragment, list: NodeId, entries: &[TocEntry]) {
    for entry in entries {
        let class = format!("toc-item toc-level-{}", entry.level.depth());
        let item = fragment.append_element(list, Element::new("li").with_attr("class", &class));
        let link = fragment.append_element(
            item,
            Element::new("a").with_attr("href", &format!("#{}", entry.id)),
        );
        fragment.append_text(link, &entry.label);

        if !entry.children.is_empty() {
            let sub = fragment.append_element(item, Element::new("ol").with_attr("class", "toc-sublist"));
            render_entries(fragment, sub, &entry.children);
        }
    }
}

/// Indented plain-text outline, one entry per line.
pub fn outline(entries: &[TocEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("{} (#{})\n", entry.label, entry.id));
        for child in &entry.children {
            out.push_str(&format!("  {} (#{})\n", child.label, child.id));
        }
    }
    out
}
