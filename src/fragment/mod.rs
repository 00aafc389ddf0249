//! Fragment composition.
//!
//! A fetched fragment goes through one pipeline before it is mounted:
//!
//! ```text
//! parse (tl) ──► metadata ──► headings ──► introduction ──► TOC ──► render
//!                 sidenotes
//! ```
//!
//! Every pass works on the owned [`Fragment`] snapshot. The result is plain
//! HTML plus the value objects the loader and the CLI need afterwards.

pub mod heading;
pub mod meta;
pub mod sidenote;
pub mod toc;
mod tree;

pub use heading::{HeadingRecord, enhance_headings};
pub use meta::{HeaderText, PageMeta};
pub use sidenote::SidenoteIndex;
pub use toc::{TocEntry, TocLevel, build_toc, build_tree};
pub use tree::{Attrs, Element, Fragment, FragmentError, NodeId, NodeKind};

use crate::core::IdRegistry;

/// A composed page, ready to mount.
#[derive(Debug, Clone)]
pub struct Page {
    pub html: String,
    pub meta: PageMeta,
    pub headings: Vec<HeadingRecord>,
    pub toc: Vec<TocEntry>,
    pub sidenotes: SidenoteIndex,
    /// Whether the fragment had a TOC mount to render into.
    pub has_toc_mount: bool,
}

/// Parse and enhance a fragment.
///
/// `ids` should hold the shell's reserved ids; ids found in the fragment
/// and every generated id are added to it.
pub fn compose(html: &str, ids: &mut IdRegistry) -> Result<Page, FragmentError> {
    let mut fragment = Fragment::parse(html)?;

    let meta = PageMeta::extract(&fragment);
    let sidenotes = SidenoteIndex::scan(&fragment);
    let headings = enhance_headings(&mut fragment, ids);
    let intro = toc::intro_entry(&mut fragment, &headings, ids);
    let toc = build_toc(intro, &headings);
    let has_toc_mount = toc::render_toc(&mut fragment, &toc).is_some();

    Ok(Page {
        html: fragment.render(),
        meta,
        headings,
        toc,
        sidenotes,
        has_toc_mount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST: &str = r#"<article class="writing-post" data-page-title="Engines" data-page-subtitle-0="on engines"><nav class="writing-toc" data-toc></nav><div class="writing-post__content" data-toc-intro><p>Lead.</p><h2>First part</h2><h3>Detail</h3><h2>First part</h2></div></article>"#;

    #[test]
    fn test_compose_post() {
        let mut ids = IdRegistry::with_reserved(["site-nav"]);
        let page = compose(POST, &mut ids).unwrap();

        assert_eq!(page.meta.title.as_deref(), Some("Engines"));
        let heading_ids: Vec<&str> = page.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(heading_ids, ["first-part", "detail", "first-part-2"]);

        assert_eq!(page.toc.len(), 3);
        assert_eq!(page.toc[0].level, TocLevel::Intro);
        assert_eq!(page.toc[0].id, "introduction");
        assert_eq!(page.toc[1].children.len(), 1);

        assert!(page.has_toc_mount);
        assert!(page.html.contains("<ol class=\"toc-list\">"));
        assert!(page.html.contains("data-toc-intro id=\"introduction\""));
        assert!(page.html.contains("href=\"#first-part-2\""));
    }

    #[test]
    fn test_compose_without_headings() {
        let mut ids = IdRegistry::new();
        let page = compose(
            r#"<nav data-toc></nav><div data-toc-intro><p>short</p></div>"#,
            &mut ids,
        )
        .unwrap();
        assert!(page.toc.is_empty());
        assert!(page.html.contains("data-toc-empty"));
        assert!(!page.html.contains("id=\"introduction\""));
    }

    #[test]
    fn test_compose_is_stable() {
        let first = compose(POST, &mut IdRegistry::new()).unwrap();
        let again = compose(&first.html, &mut IdRegistry::new()).unwrap();
        assert_eq!(first.html, again.html);
        assert_eq!(first.toc, again.toc);
        assert!(again.html.contains(r#"data-toc-intro id="introduction">"#));
    }
}
