//! Fragment loader.
//!
//! One navigation, start to finish:
//!
//! ```text
//! resolve ─► fetch ─► fade out ─► wait ─► compose ─► mount ─► sidenotes
//!    │         │                                                  │
//!    │         └─ content path failed: retry once with its index  ▼
//!    ▼                                          header ─► title ─► labels
//! not found                                                         │
//!                             scroll ◄─ fade in ◄─ history ◄─ nav ◄─┘
//! ```
//!
//! Each call takes a ticket from the session. The ticket is re-checked after
//! every suspension point, and a stale call returns without touching the
//! document, so the navigation started last always wins.

use super::history::{HistoryMode, NavigationState, split_hash};
use super::host::{Fade, Host, Placeholder};
use super::session::Session;
use crate::core::{CanonicalPath, normalize};
use crate::fragment::compose;
use crate::layout::{resolve_label, resolve_sidenotes};
use crate::{debug, log};

/// How a navigation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// Page mounted under this canonical path.
    Loaded(CanonicalPath),
    /// No route; the not-found placeholder is showing.
    NotFound,
    /// Fetch or parse failed; the error placeholder is showing.
    Failed(String),
    /// A later navigation started first; nothing was changed.
    Superseded,
}

impl NavOutcome {
    pub fn loaded_path(&self) -> Option<&CanonicalPath> {
        match self {
            Self::Loaded(path) => Some(path),
            _ => None,
        }
    }
}

/// Load `target` (a path, optionally with `?query` and `#hash`).
pub async fn load_route<H: Host>(
    session: &Session,
    host: &H,
    target: &str,
    mode: HistoryMode,
) -> NavOutcome {
    let ticket = session.begin_navigation();
    let (raw_path, mut hash) = split_hash(target);
    let mut path = normalize(raw_path);
    let mut recovered = false;

    loop {
        let Some(route) = session.routes().resolve(&path) else {
            log!("route"; "no route for {}", path);
            show_failure(session, host, &Placeholder::NotFound, session.not_found_title());
            return NavOutcome::NotFound;
        };

        debug!("nav"; "{} -> {}", path, route.fragment);
        let html = match host.fetch(&route.fragment).await {
            Ok(html) => html,
            Err(err) => {
                if !session.is_current(ticket) {
                    debug!("nav"; "dropping failed fetch of superseded {}", path);
                    return NavOutcome::Superseded;
                }
                if !recovered
                    && session.routes().is_content_path(&path)
                    && let Some(root) = session.routes().content_root()
                {
                    log!("fetch"; "{} failed ({}), showing {} instead", route.fragment, err, root);
                    path = root.clone();
                    hash = None;
                    recovered = true;
                    continue;
                }

                log!("fetch"; "{} failed: {}", route.fragment, err);
                let message = err.to_string();
                show_failure(
                    session,
                    host,
                    &Placeholder::Failed(message.clone()),
                    session.error_title(),
                );
                return NavOutcome::Failed(message);
            }
        };

        if !session.is_current(ticket) {
            debug!("nav"; "superseded after fetching {}", path);
            return NavOutcome::Superseded;
        }

        host.fade(Fade::Out);
        host.sleep(session.config().layout.fade_delay()).await;
        if !session.is_current(ticket) {
            debug!("nav"; "superseded during fade of {}", path);
            return NavOutcome::Superseded;
        }

        let mut ids = session.id_registry(host.shell_ids());
        let page = match compose(&html, &mut ids) {
            Ok(page) => page,
            Err(err) => {
                let message = err.to_string();
                log!("error"; "{}: {}", route.fragment, message);
                show_failure(
                    session,
                    host,
                    &Placeholder::Failed(message.clone()),
                    session.error_title(),
                );
                return NavOutcome::Failed(message);
            }
        };

        let canonical = route.canonical_or(&path);

        host.mount(&page.html);
        host.set_selection_lock(None);
        layout_sidenotes(session, host);

        host.set_header(&page.meta.header(session.default_header()));
        let title = route.title.as_deref().or(page.meta.title.as_deref());
        host.set_document_title(&session.title_for(title));
        layout_labels(session, host);

        host.mark_active_nav(&canonical);
        session.set_current(Some(canonical.clone()));
        if mode != HistoryMode::Skip {
            host.record_history(&NavigationState::new(canonical.clone(), hash.clone()), mode);
        }

        host.fade(Fade::In);
        host.scroll_to(hash.as_deref());

        debug!("nav"; "loaded {} ({} headings)", canonical, page.headings.len());
        return NavOutcome::Loaded(canonical);
    }
}

/// Terminal failure: placeholder, fixed title, default header.
fn show_failure<H: Host>(session: &Session, host: &H, placeholder: &Placeholder, title: String) {
    host.show_placeholder(placeholder);
    host.set_selection_lock(None);
    host.set_header(session.default_header());
    host.set_document_title(&title);
    layout_labels(session, host);
    session.set_current(None);
    host.fade(Fade::In);
}

/// Recompute layout after the viewport changed.
pub fn relayout<H: Host>(session: &Session, host: &H) {
    layout_sidenotes(session, host);
    layout_labels(session, host);
}

fn layout_sidenotes<H: Host>(session: &Session, host: &H) {
    let measurements = host.measure_sidenotes();
    if !measurements.rail.is_visible() {
        return;
    }
    let placements = resolve_sidenotes(&measurements, session.config().layout.sidenote_gap);
    host.place_sidenotes(&placements);
}

fn layout_labels<H: Host>(session: &Session, host: &H) {
    let gap = session.config().layout.label_gap;
    let layouts: Vec<_> = host
        .measure_header()
        .iter()
        .map(|metrics| resolve_label(metrics, gap))
        .collect();
    host.apply_header_layout(&layouts);
}
