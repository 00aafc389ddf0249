//! Loader tests against a scripted host.

use std::cell::{Cell, RefCell};
use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::sync::oneshot;

use super::*;
use crate::config::test_parse_config;
use crate::core::CanonicalPath;
use crate::fragment::HeaderText;
use crate::layout::{
    LabelLayout, LabelMetrics, RailProbe, ReferenceMetrics, SidenoteMeasurements, SidenotePlacement,
};

const HOME: &str = r#"<section data-page-title="Welcome" data-page-subtitle-0="a long welcome" data-page-subtitle-1="hi"><p>Hello.</p></section>"#;
const PROJECTS: &str = r#"<div data-page-title="All projects"><h2>Engines</h2><h3>Difference</h3></div>"#;
const WRITING: &str = r#"<ul class="writing-list"><li><a href="/writing/engines">Engines</a></li></ul>"#;
const POST: &str = r#"<article data-page-title="On Engines"><nav data-toc></nav><div data-toc-intro><p>Lead<label for="sn0" class="sidenote-number"></label></p><h2>Setup</h2></div><div class="writing-post__rail-right"><span class="sidenote sidenote--rail" data-sidenote-ref="sn0">note</span></div></article>"#;

#[derive(Default)]
struct MockHost {
    pages: RefCell<FxHashMap<String, Result<String, FetchError>>>,
    gates: RefCell<FxHashMap<String, oneshot::Receiver<()>>>,
    fetched: RefCell<Vec<String>>,
    content: RefCell<String>,
    title: RefCell<String>,
    header: RefCell<HeaderText>,
    history: RefCell<Vec<(NavigationState, HistoryMode)>>,
    scrolled: RefCell<Vec<Option<String>>>,
    active: RefCell<Option<CanonicalPath>>,
    fades: RefCell<Vec<Fade>>,
    locks: RefCell<Vec<Option<RegionKind>>>,
    rail: Cell<RailProbe>,
    references: RefCell<Vec<ReferenceMetrics>>,
    placements: RefCell<Vec<SidenotePlacement>>,
    layouts: RefCell<Vec<LabelLayout>>,
    shell_ids: RefCell<Vec<String>>,
}

impl MockHost {
    fn with_site() -> Self {
        let host = Self::default();
        host.page("_content/home.html", HOME);
        host.page("_content/projects.html", PROJECTS);
        host.page("_content/writing.html", WRITING);
        host.page("_content/writing/engines.html", POST);
        host
    }

    fn page(&self, location: &str, html: &str) {
        self.pages
            .borrow_mut()
            .insert(location.to_string(), Ok(html.to_string()));
    }

    fn fail(&self, location: &str, err: FetchError) {
        self.pages.borrow_mut().insert(location.to_string(), Err(err));
    }

    fn gate(&self, location: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(location.to_string(), rx);
        tx
    }
}

impl Host for MockHost {
    async fn fetch(&self, location: &str) -> Result<String, FetchError> {
        self.fetched.borrow_mut().push(location.to_string());
        let gate = self.gates.borrow_mut().remove(location);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.pages
            .borrow()
            .get(location)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }

    async fn sleep(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }

    fn shell_ids(&self) -> Vec<String> {
        self.shell_ids.borrow().clone()
    }

    fn fade(&self, fade: Fade) {
        self.fades.borrow_mut().push(fade);
    }

    fn mount(&self, html: &str) {
        *self.content.borrow_mut() = html.to_string();
    }

    fn set_document_title(&self, title: &str) {
        *self.title.borrow_mut() = title.to_string();
    }

    fn set_header(&self, header: &HeaderText) {
        *self.header.borrow_mut() = header.clone();
    }

    fn measure_header(&self) -> Vec<LabelMetrics> {
        vec![LabelMetrics {
            container_width: 300.0,
            char_width: 10.0,
            menu_widths: vec![100.0],
            menu_gap: 8.0,
            variants: self.header.borrow().subtitles.clone(),
        }]
    }

    fn apply_header_layout(&self, layouts: &[LabelLayout]) {
        *self.layouts.borrow_mut() = layouts.to_vec();
    }

    fn measure_sidenotes(&self) -> SidenoteMeasurements {
        SidenoteMeasurements {
            rail: self.rail.get(),
            references: self.references.borrow().clone(),
        }
    }

    fn place_sidenotes(&self, placements: &[SidenotePlacement]) {
        *self.placements.borrow_mut() = placements.to_vec();
    }

    fn mark_active_nav(&self, path: &CanonicalPath) {
        *self.active.borrow_mut() = Some(path.clone());
    }

    fn record_history(&self, state: &NavigationState, mode: HistoryMode) {
        self.history.borrow_mut().push((state.clone(), mode));
    }

    fn scroll_to(&self, hash: Option<&str>) {
        self.scrolled.borrow_mut().push(hash.map(str::to_string));
    }

    fn set_selection_lock(&self, region: Option<RegionKind>) {
        self.locks.borrow_mut().push(region);
    }
}

fn session() -> Session {
    Session::new(Arc::new(test_parse_config(
        "[site]\nname = \"Ada\"\ntitle = \"Ada Lovelace\"\nsubtitles = [\"notes on engines\", \"notes\"]",
    )))
}

// ============================================================================
// Successful loads
// ============================================================================

#[tokio::test]
async fn test_load_exact_route() {
    let session = session();
    let host = MockHost::with_site();

    let outcome = load_route(&session, &host, "/projects/", HistoryMode::Replace).await;
    assert_eq!(outcome, NavOutcome::Loaded(crate::normalize("/projects")));

    let content = host.content.borrow();
    assert!(content.contains("<h2 id=\"engines\">"));
    assert!(content.contains("class=\"heading-anchor\" href=\"#difference\""));

    // Route override beats fragment metadata.
    assert_eq!(*host.title.borrow(), "Projects · Ada");
    assert_eq!(host.header.borrow().title, "All projects");
    assert_eq!(host.header.borrow().subtitles, ["All projects"]);

    let history = host.history.borrow();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].0.path, "/projects");
    assert_eq!(history[0].1, HistoryMode::Replace);

    assert_eq!(host.active.borrow().as_ref().unwrap(), "/projects");
    assert_eq!(session.current_path().unwrap(), "/projects");
    assert_eq!(*host.fades.borrow(), [Fade::Out, Fade::In]);
    assert_eq!(*host.locks.borrow(), [None]);
}

#[tokio::test]
async fn test_metadata_title_and_header() {
    let session = session();
    let host = MockHost::with_site();

    load_route(&session, &host, "/", HistoryMode::Push).await;
    assert_eq!(*host.title.borrow(), "Welcome · Ada");
    assert_eq!(host.header.borrow().subtitles, ["a long welcome", "hi"]);

    // "a long welcome" is 140px; 140 + 16 + 100 fits in 300.
    assert_eq!(
        *host.layouts.borrow(),
        [LabelLayout {
            variant: Some(0),
            stacked: false
        }]
    );
}

#[tokio::test]
async fn test_default_header_without_metadata() {
    let session = session();
    let host = MockHost::with_site();

    load_route(&session, &host, "/writing", HistoryMode::Push).await;
    assert_eq!(*host.title.borrow(), "Writing · Ada");
    assert_eq!(host.header.borrow().title, "Ada Lovelace");
    assert_eq!(host.header.borrow().subtitles, ["notes on engines", "notes"]);
}

#[tokio::test]
async fn test_hash_is_recorded_and_scrolled() {
    let session = session();
    let host = MockHost::with_site();

    let outcome = load_route(&session, &host, "/writing/engines#setup", HistoryMode::Push).await;
    assert_eq!(outcome, NavOutcome::Loaded(crate::normalize("/writing/engines")));

    let history = host.history.borrow();
    assert_eq!(history[0].0.hash.as_deref(), Some("setup"));
    assert_eq!(*host.scrolled.borrow(), [Some("setup".to_string())]);
    assert!(host.content.borrow().contains("data-toc-intro id=\"introduction\""));
}

#[tokio::test]
async fn test_generated_ids_avoid_shell_ids() {
    let session = session();
    let host = MockHost::with_site();
    host.shell_ids
        .borrow_mut()
        .extend(["setup".to_string(), "introduction".to_string()]);

    load_route(&session, &host, "/writing/engines", HistoryMode::Push).await;
    let content = host.content.borrow();
    assert!(content.contains("<h2 id=\"setup-2\">"));
    assert!(content.contains("data-toc-intro id=\"introduction-2\""));
    assert!(content.contains("href=\"#setup-2\""));
}

#[tokio::test]
async fn test_skip_mode_leaves_history() {
    let session = session();
    let host = MockHost::with_site();

    load_route(&session, &host, "/projects", HistoryMode::Skip).await;
    assert!(host.history.borrow().is_empty());
    assert_eq!(session.current_path().unwrap(), "/projects");
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let session = session();
    let host = MockHost::with_site();

    let outcome = load_route(&session, &host, "/nope", HistoryMode::Push).await;
    assert_eq!(outcome, NavOutcome::NotFound);
    assert!(host.fetched.borrow().is_empty());
    assert!(host.content.borrow().contains("page-placeholder--not-found"));
    assert_eq!(*host.title.borrow(), "Not found · Ada");
    assert_eq!(host.header.borrow().title, "Ada Lovelace");
    assert!(host.history.borrow().is_empty());
    assert_eq!(session.current_path(), None);
}

#[tokio::test]
async fn test_missing_post_falls_back_to_index_once() {
    let session = session();
    let host = MockHost::with_site();

    let outcome = load_route(&session, &host, "/writing/missing", HistoryMode::Push).await;
    assert_eq!(outcome, NavOutcome::Loaded(crate::normalize("/writing")));
    assert_eq!(
        *host.fetched.borrow(),
        ["_content/writing/missing.html", "_content/writing.html"]
    );
    assert_eq!(host.history.borrow()[0].0.path, "/writing");
}

#[tokio::test]
async fn test_fallback_does_not_loop() {
    let session = session();
    let host = MockHost::with_site();
    host.fail("_content/writing.html", FetchError::Status(500));

    let outcome = load_route(&session, &host, "/writing/missing", HistoryMode::Push).await;
    assert_eq!(outcome, NavOutcome::Failed("HTTP 500".into()));
    assert_eq!(host.fetched.borrow().len(), 2);
    assert!(host.content.borrow().contains("HTTP 500"));
    assert_eq!(*host.title.borrow(), "Error · Ada");
    assert_eq!(host.header.borrow().title, "Ada Lovelace");
    assert!(host.history.borrow().is_empty());
}

#[tokio::test]
async fn test_non_content_failure_has_no_fallback() {
    let session = session();
    let host = MockHost::with_site();
    host.fail("_content/projects.html", FetchError::Transport("offline".into()));

    let outcome = load_route(&session, &host, "/projects", HistoryMode::Push).await;
    assert_eq!(outcome, NavOutcome::Failed("offline".into()));
    assert_eq!(*host.fetched.borrow(), ["_content/projects.html"]);
    assert!(host.content.borrow().contains("page-placeholder--error"));
}

#[tokio::test]
async fn test_failure_after_success_clears_current_path() {
    let session = session();
    let host = MockHost::with_site();

    load_route(&session, &host, "/projects", HistoryMode::Push).await;
    load_route(&session, &host, "/nope", HistoryMode::Push).await;
    assert_eq!(session.current_path(), None);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_later_navigation_wins() {
    let session = session();
    let host = MockHost::with_site();
    let release = host.gate("_content/projects.html");

    let (slow, fast, _) = tokio::join!(
        load_route(&session, &host, "/projects", HistoryMode::Push),
        load_route(&session, &host, "/writing", HistoryMode::Push),
        async move {
            tokio::task::yield_now().await;
            let _ = release.send(());
        },
    );

    assert_eq!(slow, NavOutcome::Superseded);
    assert_eq!(fast, NavOutcome::Loaded(crate::normalize("/writing")));
    assert!(host.content.borrow().contains("writing-list"));
    assert_eq!(*host.title.borrow(), "Writing · Ada");
    assert_eq!(host.history.borrow().len(), 1);
    assert_eq!(session.current_path().unwrap(), "/writing");
}

#[tokio::test]
async fn test_superseded_failure_renders_nothing() {
    let session = session();
    let host = MockHost::with_site();
    host.fail("_content/projects.html", FetchError::Status(503));
    let release = host.gate("_content/projects.html");

    let (slow, fast, _) = tokio::join!(
        load_route(&session, &host, "/projects", HistoryMode::Push),
        load_route(&session, &host, "/", HistoryMode::Push),
        async move {
            tokio::task::yield_now().await;
            let _ = release.send(());
        },
    );

    assert_eq!(slow, NavOutcome::Superseded);
    assert!(fast.loaded_path().is_some());
    assert!(!host.content.borrow().contains("page-placeholder"));
}

// ============================================================================
// Layout
// ============================================================================

#[tokio::test]
async fn test_sidenotes_skipped_when_rail_hidden() {
    let session = session();
    let host = MockHost::with_site();
    host.references.borrow_mut().push(ReferenceMetrics {
        note_id: "sn0".into(),
        offset_in_block: 0.0,
        block_top: 0.0,
        block_line_height: 20.0,
        note_height: 10.0,
        note_line_height: 20.0,
    });

    load_route(&session, &host, "/writing/engines", HistoryMode::Push).await;
    assert!(host.placements.borrow().is_empty());

    host.rail.set(RailProbe {
        displayed: true,
        width: 200.0,
    });
    relayout(&session, &host);
    let placements = host.placements.borrow();
    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].note_id, "sn0");
}
