//! Per-fragment checks.

use rustc_hash::FxHashMap;

use quire::fragment::{Fragment, PageMeta, SidenoteIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One problem found in a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    /// The offending id, attribute or heading.
    pub target: String,
    pub reason: String,
}

impl Finding {
    fn error(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            target: target.into(),
            reason: reason.into(),
        }
    }

    fn warning(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            target: target.into(),
            reason: reason.into(),
        }
    }
}

/// Run every check on one fragment's HTML.
pub fn scan_fragment(html: &str) -> Vec<Finding> {
    let fragment = match Fragment::parse(html) {
        Ok(fragment) => fragment,
        Err(err) => return vec![Finding::error("<fragment>", err.to_string())],
    };

    let mut findings = Vec::new();
    check_duplicate_ids(&fragment, &mut findings);
    check_sidenotes(&fragment, &mut findings);
    check_subtitles(&fragment, &mut findings);
    check_heading_order(&fragment, &mut findings);
    findings
}

fn check_duplicate_ids(fragment: &Fragment, findings: &mut Vec<Finding>) {
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();
    let mut order = Vec::new();
    for id in fragment.ids() {
        let count = seen.entry(id.clone()).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(id);
        }
    }
    for id in order {
        let count = seen.get(&id).copied().unwrap_or_default();
        findings.push(Finding::error(
            format!("#{id}"),
            format!("id used {count} times"),
        ));
    }
}

fn check_sidenotes(fragment: &Fragment, findings: &mut Vec<Finding>) {
    let index = SidenoteIndex::scan(fragment);
    for reference in index.unmatched_references() {
        findings.push(Finding::error(
            format!("sidenote {reference}"),
            "reference has no rail note",
        ));
    }
    for note in index.orphan_notes() {
        findings.push(Finding::error(
            format!("sidenote {note}"),
            "rail note has no reference",
        ));
    }
}

fn check_subtitles(fragment: &Fragment, findings: &mut Vec<Finding>) {
    let meta = PageMeta::extract(fragment);
    for idx in meta.stray_subtitles {
        findings.push(Finding::error(
            format!("data-page-subtitle-{idx}"),
            format!("index is not contiguous ({} variants before the gap)", meta.subtitles.len()),
        ));
    }
}

fn check_heading_order(fragment: &Fragment, findings: &mut Vec<Finding>) {
    for node in fragment.walk() {
        let Some(el) = fragment.element(node) else {
            continue;
        };
        match el.heading_level() {
            Some(2) => return,
            Some(3) => {
                let text = fragment.text_content(node);
                findings.push(Finding::warning(
                    format!("h3 \"{}\"", text.trim()),
                    "appears before any h2 (promoted in the TOC)",
                ));
                return;
            }
            _ => {}
        }
    }
}
