//! Native host.
//!
//! `MemoryShell` plays the part of the browser document for the CLI and for
//! tests: fragments are read from disk, and every effect the loader asks for
//! is recorded in [`ShellState`] instead of being drawn.
//!
//! There is no layout engine here. The sidenote rail is reported hidden and
//! header widths come from a fixed character cell.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::SiteConfig;
use crate::core::{CanonicalPath, normalize};
use crate::fragment::HeaderText;
use crate::layout::{LabelLayout, LabelMetrics, RailProbe, SidenoteMeasurements, SidenotePlacement};
use crate::nav::history::{PopAction, on_popstate};
use crate::nav::{Fade, FetchError, HistoryMode, Host, NavigationState, RegionKind};
use crate::router::active_nav;

/// Character cell used to estimate text widths.
pub const CHAR_WIDTH: f64 = 8.0;
/// Horizontal padding around each menu item.
const MENU_ITEM_PADDING: f64 = 16.0;
const MENU_GAP: f64 = 12.0;

/// One entry of the site menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub path: CanonicalPath,
}

/// Everything the loader has written to the "document".
#[derive(Debug, Clone, Default)]
pub struct ShellState {
    pub content: String,
    pub title: String,
    pub header: HeaderText,
    pub header_layout: Vec<LabelLayout>,
    /// History stack and the index of the current entry.
    pub history: Vec<NavigationState>,
    pub history_index: usize,
    pub active_nav: Option<usize>,
    pub visible: bool,
    pub scroll_target: Option<String>,
    pub selection_lock: Option<RegionKind>,
    pub placements: Vec<SidenotePlacement>,
}

impl ShellState {
    pub fn current_entry(&self) -> Option<&NavigationState> {
        self.history.get(self.history_index)
    }
}

#[derive(Debug)]
pub struct MemoryShell {
    root: PathBuf,
    viewport_width: f64,
    links: Vec<NavLink>,
    state: Mutex<ShellState>,
}

impl MemoryShell {
    pub fn new(root: impl Into<PathBuf>, config: &SiteConfig) -> Self {
        let links = config
            .routes
            .page
            .iter()
            .map(|page| {
                let path = normalize(&page.path);
                let label = match &page.title {
                    Some(title) => title.clone(),
                    None if path.is_root() => "Home".to_string(),
                    None => page.path.trim_matches('/').to_string(),
                };
                NavLink { label, path }
            })
            .collect();

        Self {
            root: root.into(),
            viewport_width: 1024.0,
            links,
            state: Mutex::new(ShellState::default()),
        }
    }

    pub fn with_viewport(mut self, width: f64) -> Self {
        self.viewport_width = width;
        self
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    /// Snapshot of the recorded document state.
    pub fn state(&self) -> ShellState {
        self.state.lock().clone()
    }

    /// Step back in history, as the browser's back button would.
    ///
    /// Returns what the page should do for the entry it lands on.
    pub fn back(&self, current: Option<&CanonicalPath>) -> Option<PopAction> {
        let mut state = self.state.lock();
        if state.history_index == 0 {
            return None;
        }
        state.history_index -= 1;
        let entry = state.current_entry()?;
        Some(on_popstate(current, entry))
    }

    fn resolve_location(&self, location: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(location.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(FetchError::Status(403));
        }
        Ok(self.root.join(relative))
    }
}

impl Host for MemoryShell {
    async fn fetch(&self, location: &str) -> Result<String, FetchError> {
        let path = self.resolve_location(location)?;
        tokio::fs::read_to_string(&path).await.map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => FetchError::Status(404),
            std::io::ErrorKind::PermissionDenied => FetchError::Status(403),
            _ => FetchError::Transport(err.to_string()),
        })
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn fade(&self, fade: Fade) {
        self.state.lock().visible = fade == Fade::In;
    }

    fn mount(&self, html: &str) {
        let mut state = self.state.lock();
        state.content = html.to_string();
        state.placements.clear();
    }

    fn set_document_title(&self, title: &str) {
        self.state.lock().title = title.to_string();
    }

    fn set_header(&self, header: &HeaderText) {
        self.state.lock().header = header.clone();
    }

    fn measure_header(&self) -> Vec<LabelMetrics> {
        let menu_widths = self
            .links
            .iter()
            .map(|link| link.label.chars().count() as f64 * CHAR_WIDTH + MENU_ITEM_PADDING)
            .collect();
        vec![LabelMetrics {
            container_width: self.viewport_width,
            char_width: CHAR_WIDTH,
            menu_widths,
            menu_gap: MENU_GAP,
            variants: self.state.lock().header.subtitles.clone(),
        }]
    }

    fn apply_header_layout(&self, layouts: &[LabelLayout]) {
        self.state.lock().header_layout = layouts.to_vec();
    }

    fn measure_sidenotes(&self) -> SidenoteMeasurements {
        SidenoteMeasurements {
            rail: RailProbe::HIDDEN,
            references: Vec::new(),
        }
    }

    fn place_sidenotes(&self, placements: &[SidenotePlacement]) {
        self.state.lock().placements = placements.to_vec();
    }

    fn mark_active_nav(&self, path: &CanonicalPath) {
        self.state.lock().active_nav = active_nav(path, self.links.iter().map(|l| &l.path));
    }

    fn record_history(&self, entry: &NavigationState, mode: HistoryMode) {
        let mut state = self.state.lock();
        match mode {
            HistoryMode::Skip => {}
            HistoryMode::Replace if !state.history.is_empty() => {
                let idx = state.history_index;
                state.history[idx] = entry.clone();
            }
            HistoryMode::Replace => state.history.push(entry.clone()),
            HistoryMode::Push => {
                if !state.history.is_empty() {
                    let keep = state.history_index + 1;
                    state.history.truncate(keep);
                }
                state.history.push(entry.clone());
                state.history_index = state.history.len() - 1;
            }
        }
    }

    fn scroll_to(&self, hash: Option<&str>) {
        self.state.lock().scroll_target = hash.map(str::to_string);
    }

    fn set_selection_lock(&self, region: Option<RegionKind>) {
        self.state.lock().selection_lock = region;
    }
}
