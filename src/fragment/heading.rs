//! Heading enhancer.
//!
//! Gives every `h2`/`h3` a unique id and a permalink. The permalink is
//! wrapped together with the heading's last word so it never wraps onto a
//! line by itself:
//!
//! ```text
//! <h2>Why it works</h2>
//! <h2 id="why-it-works">Why it <span class="heading-nowrap">works<a class="heading-anchor" href="#why-it-works" aria-hidden="true">#</a></span></h2>
//! ```
//!
//! The pass reads the fragment, plans every edit as a value, then applies
//! the plan in one batch.

use serde::Serialize;

use super::tree::{Element, Fragment, NodeId, NodeKind};
use crate::core::IdRegistry;

pub const ANCHOR_CLASS: &str = "heading-anchor";
pub const NOWRAP_CLASS: &str = "heading-nowrap";

/// An enhanced heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingRecord {
    #[serde(skip)]
    pub node: NodeId,
    /// 2 or 3.
    pub level: u8,
    pub id: String,
    pub label: String,
}

#[derive(Debug)]
enum AnchorPlan {
    /// Heading already carries a permalink.
    Existing,
    /// No text to attach to; the anchor becomes the last child.
    Append,
    /// Split `text` into `keep` and the trailing `word`.
    Split { text: NodeId, keep: String, word: String },
}

#[derive(Debug)]
struct Plan {
    record: HeadingRecord,
    assign_id: bool,
    anchor: AnchorPlan,
}

/// Enhance every level-2/level-3 heading and return them in document order.
///
/// Ids already in the fragment are reserved before any id is generated.
/// Headings enhanced by an earlier call are reported but not touched again.
pub fn enhance_headings(fragment: &mut Fragment, ids: &mut IdRegistry) -> Vec<HeadingRecord> {
    for id in fragment.ids() {
        ids.reserve(id);
    }

    let headings = fragment.select(|el| matches!(el.heading_level(), Some(2 | 3)));
    let plans: Vec<Plan> = headings
        .into_iter()
        .filter_map(|node| plan(fragment, node, ids))
        .collect();

    plans.into_iter().map(|plan| apply(fragment, plan)).collect()
}

fn plan(fragment: &Fragment, node: NodeId, ids: &mut IdRegistry) -> Option<Plan> {
    let element = fragment.element(node)?;
    let level = element.heading_level()?;

    if fragment.is_enhanced(node) {
        let record = HeadingRecord {
            node,
            level,
            id: element.plain_id().unwrap_or_default(),
            label: fragment
                .label(node)
                .map_or_else(|| heading_label(fragment, node), str::to_string),
        };
        return Some(Plan {
            record,
            assign_id: false,
            anchor: AnchorPlan::Existing,
        });
    }

    let label = heading_label(fragment, node);
    let (id, assign_id) = match element.plain_id() {
        Some(existing) => (existing, false),
        None => (ids.claim_slug(&label), true),
    };

    Some(Plan {
        record: HeadingRecord {
            node,
            level,
            id,
            label,
        },
        assign_id,
        anchor: plan_anchor(fragment, node),
    })
}

fn plan_anchor(fragment: &Fragment, node: NodeId) -> AnchorPlan {
    let descendants = fragment.descendants(node);
    let is_anchor = |el: &Element| el.is("a") && el.has_class(ANCHOR_CLASS);

    if descendants
        .iter()
        .any(|&d| fragment.element(d).is_some_and(is_anchor))
    {
        return AnchorPlan::Existing;
    }

    let last_text = descendants.into_iter().rev().find_map(|d| match fragment.kind(d) {
        NodeKind::Text(raw) if !raw.trim().is_empty() => Some((d, raw)),
        _ => None,
    });

    match last_text {
        Some((text, raw)) => {
            let (keep, word) = split_last_word(raw);
            AnchorPlan::Split {
                text,
                keep: keep.to_string(),
                word: word.to_string(),
            }
        }
        None => AnchorPlan::Append,
    }
}

/// Split trimmed-right text at its last whitespace run.
fn split_last_word(raw: &str) -> (&str, &str) {
    let trimmed = raw.trim_end();
    match trimmed.rfind(char::is_whitespace) {
        Some(idx) => {
            let ws_len = trimmed[idx..].chars().next().map_or(1, char::len_utf8);
            trimmed.split_at(idx + ws_len)
        }
        None => ("", trimmed),
    }
}

/// Heading text without any permalink, trimmed, leading `#` removed.
fn heading_label(fragment: &Fragment, node: NodeId) -> String {
    let mut raw = String::new();
    for d in fragment.descendants(node) {
        if let NodeKind::Text(text) = fragment.kind(d)
            && !fragment.has_ancestor(d, |el| el.is("a") && el.has_class(ANCHOR_CLASS))
        {
            raw.push_str(text);
        }
    }
    let text = crate::utils::html::unescape(&raw);
    let trimmed = text.trim();
    trimmed.strip_prefix('#').unwrap_or(trimmed).trim().to_string()
}

fn anchor_element(id: &str) -> Element {
    Element::new("a")
        .with_attr("class", ANCHOR_CLASS)
        .with_attr("href", &format!("#{id}"))
        .with_attr("aria-hidden", "true")
}

fn apply(fragment: &mut Fragment, plan: Plan) -> HeadingRecord {
    let Plan {
        record,
        assign_id,
        anchor,
    } = plan;
    let node = record.node;

    if assign_id && let Some(el) = fragment.element_mut(node) {
        el.set_attr("id", &record.id);
    }

    match anchor {
        AnchorPlan::Existing => {}
        AnchorPlan::Append => {
            let a = fragment.append_element(node, anchor_element(&record.id));
            fragment.append_text(a, "#");
        }
        AnchorPlan::Split { text, keep, word } => {
            fragment.set_raw_text(text, keep);
            let wrapper = fragment.insert_after(text, Element::new("span").with_attr("class", NOWRAP_CLASS));
            fragment.append_raw_text(wrapper, &word);
            let a = fragment.append_element(wrapper, anchor_element(&record.id));
            fragment.append_text(a, "#");
        }
    }

    fragment.mark_enhanced(node);
    fragment.cache_label(node, record.label.clone());
    record
}
