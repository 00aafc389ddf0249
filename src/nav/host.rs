//! The seam between the engine and a live document.
//!
//! The loader decides what happens and in which order; a host only fetches,
//! measures and writes what it is told. Hosts run on a single thread, so
//! methods take `&self` and futures are not `Send`.

use std::time::Duration;

use thiserror::Error;

use super::history::{HistoryMode, NavigationState};
use super::selection::RegionKind;
use crate::core::CanonicalPath;
use crate::fragment::HeaderText;
use crate::layout::{LabelLayout, LabelMetrics, SidenoteMeasurements, SidenotePlacement};
use crate::utils::html::escape;

/// Why a fragment could not be fetched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("{0}")]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fade {
    Out,
    In,
}

/// Fixed content shown when a navigation cannot render a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    NotFound,
    Failed(String),
}

impl Placeholder {
    pub fn to_html(&self) -> String {
        match self {
            Self::NotFound => concat!(
                r#"<div class="page-placeholder page-placeholder--not-found">"#,
                "<h1>Not found</h1>",
                "<p>There is no page at this address.</p>",
                "</div>"
            )
            .to_string(),
            Self::Failed(message) => format!(
                r#"<div class="page-placeholder page-placeholder--error"><h1>Something went wrong</h1><p>This page could not be loaded: {}</p></div>"#,
                escape(message)
            ),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait Host {
    /// Fetch a fragment by its location relative to the site root.
    async fn fetch(&self, location: &str) -> Result<String, FetchError>;

    async fn sleep(&self, duration: Duration);

    /// Ids the shell around the content container already uses. Generated
    /// ids must not collide with them.
    fn shell_ids(&self) -> Vec<String> {
        Vec::new()
    }

    fn fade(&self, fade: Fade);

    /// Replace the content container's markup.
    fn mount(&self, html: &str);

    fn show_placeholder(&self, placeholder: &Placeholder) {
        self.mount(&placeholder.to_html());
    }

    fn set_document_title(&self, title: &str);

    fn set_header(&self, header: &HeaderText);

    /// Metrics for every region carrying responsive labels.
    fn measure_header(&self) -> Vec<LabelMetrics>;

    /// One layout per region, in the order `measure_header` returned them.
    fn apply_header_layout(&self, layouts: &[LabelLayout]);

    fn measure_sidenotes(&self) -> SidenoteMeasurements;

    fn place_sidenotes(&self, placements: &[SidenotePlacement]);

    fn mark_active_nav(&self, path: &CanonicalPath);

    fn record_history(&self, state: &NavigationState, mode: HistoryMode);

    /// Scroll to the element with id `hash`, or to the top.
    fn scroll_to(&self, hash: Option<&str>);

    /// `None` releases the lock.
    fn set_selection_lock(&self, region: Option<RegionKind>);
}
