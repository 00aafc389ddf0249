//! `Host` on top of the live document.
//!
//! Shell markup the host relies on:
//!
//! ```text
//! #page-content                      content container (fragments mount here)
//! [data-label-region]                header/footer; `="header"` gets page text
//!   [data-header-title]              header title
//!   [data-subtitle]                  selected subtitle variant
//!   nav a[href]                      menu items (active one gets .is-active)
//! ```
//!
//! The sidenote rail comes with the mounted fragment
//! (`.writing-post__rail-right`, see [`find_rail`](crate::fragment::sidenote::find_rail)).

use std::cell::RefCell;
use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, HtmlElement, Node, Response, ScrollBehavior, ScrollIntoViewOptions, Window,
};

use crate::core::{CanonicalPath, normalize};
use crate::fragment::HeaderText;
use crate::fragment::sidenote::{RAIL_ATTR, RAIL_NOTE_SELECTOR, RAIL_SELECTOR};
use crate::layout::{
    LabelLayout, LabelMetrics, RailProbe, ReferenceMetrics, SidenoteMeasurements, SidenotePlacement,
};
use crate::nav::selection::SelectionLock;
use crate::nav::{Fade, FetchError, HistoryMode, Host, NavigationState, RegionKind};
use crate::router::active_nav;
use crate::debug;

pub const CONTENT_ID: &str = "page-content";
const REGION_SELECTOR: &str = "[data-label-region]";
const HEADER_REGION: &str = "header";
const PROBE_CLASS: &str = "quire-char-probe";
const PROBE_TEXT: &str = "abcdefghijklmnopqrstuvwxyz";
const FADING_CLASS: &str = "is-fading";
const STACKED_CLASS: &str = "is-stacked";
const ACTIVE_CLASS: &str = "is-active";
const LOCK_ATTR: &str = "data-selection-lock";

/// A selection region: the element delimiting it and its kind.
pub type Region = (Element, RegionKind);

pub struct BrowserHost {
    window: Window,
    document: Document,
    header: RefCell<HeaderText>,
    pub(super) selection: RefCell<SelectionLock<Region>>,
}

impl BrowserHost {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(Self {
            window,
            document,
            header: RefCell::new(HeaderText::default()),
            selection: RefCell::new(SelectionLock::new()),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn content(&self) -> Option<Element> {
        self.document.get_element_by_id(CONTENT_ID)
    }

    fn select_all(&self, root: &Element, selector: &str) -> Vec<Element> {
        let Ok(list) = root.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i)?.dyn_into::<Element>().ok())
            .collect()
    }

    fn regions(&self) -> Vec<Element> {
        let Some(body) = self.document.body() else {
            return Vec::new();
        };
        self.select_all(&body, REGION_SELECTOR)
    }

    fn computed(&self, el: &Element, property: &str) -> Option<String> {
        let style = self.window.get_computed_style(el).ok()??;
        style.get_property_value(property).ok()
    }

    /// Computed line height in px; `normal` is taken as 1.2 × font size.
    fn line_height(&self, el: &Element) -> f64 {
        if let Some(px) = self.computed(el, "line-height").as_deref().and_then(parse_px) {
            return px;
        }
        self.computed(el, "font-size")
            .as_deref()
            .and_then(parse_px)
            .map_or(0.0, |size| size * 1.2)
    }

    /// Width of one character cell in `region`'s font, from a hidden probe
    /// appended to the region.
    fn char_width(&self, region: &Element) -> f64 {
        let probe = match region.query_selector(&format!(":scope > .{PROBE_CLASS}")) {
            Ok(Some(probe)) => probe,
            _ => {
                let Ok(probe) = self.document.create_element("span") else {
                    return 0.0;
                };
                probe.set_class_name(PROBE_CLASS);
                probe.set_attribute("aria-hidden", "true").ok();
                probe
                    .set_attribute(
                        "style",
                        "position:absolute;left:-9999px;top:0;visibility:hidden;white-space:nowrap;font:inherit;letter-spacing:inherit",
                    )
                    .ok();
                probe.set_text_content(Some(PROBE_TEXT));
                region.append_child(&probe).ok();
                probe
            }
        };
        probe.get_bounding_client_rect().width() / PROBE_TEXT.len() as f64
    }

    /// Label metrics for one region, read with its menu unstacked.
    fn measure_region(&self, region: &Element) -> LabelMetrics {
        let classes = region.class_list();
        let was_stacked = classes.contains(STACKED_CLASS);
        if was_stacked {
            classes.remove_1(STACKED_CLASS).ok();
        }

        let menu_widths = self
            .select_all(region, "nav a")
            .iter()
            .map(|a| a.get_bounding_client_rect().width())
            .collect();
        let menu_gap = region
            .query_selector("nav")
            .ok()
            .flatten()
            .and_then(|nav| self.computed(&nav, "column-gap"))
            .as_deref()
            .and_then(parse_px)
            .unwrap_or(0.0);
        let metrics = LabelMetrics {
            container_width: region.get_bounding_client_rect().width(),
            char_width: self.char_width(region),
            menu_widths,
            menu_gap,
            variants: self.region_variants(region),
        };

        // apply_header_layout settles the final state
        if was_stacked {
            classes.add_1(STACKED_CLASS).ok();
        }
        metrics
    }

    fn region_variants(&self, region: &Element) -> Vec<String> {
        if region.get_attribute("data-label-region").as_deref() == Some(HEADER_REGION) {
            return self.header.borrow().subtitles.clone();
        }
        (0..)
            .map_while(|i| region.get_attribute(&format!("data-subtitle-{i}")))
            .collect()
    }

    /// Rail column of the mounted fragment.
    fn rail(&self) -> Option<Element> {
        let content = self.content()?;
        if let Ok(Some(rail)) = content.query_selector(RAIL_SELECTOR) {
            return Some(rail);
        }
        content
            .query_selector(RAIL_NOTE_SELECTOR)
            .ok()??
            .parent_element()
    }

    /// Visibility of the rail, judged by its first child (or the rail itself).
    fn probe_rail(&self) -> RailProbe {
        let Some(rail) = self.rail() else {
            return RailProbe::HIDDEN;
        };
        let probe = rail.first_element_child().unwrap_or(rail);
        RailProbe {
            displayed: self.computed(&probe, "display").as_deref() != Some("none"),
            width: probe.get_bounding_client_rect().width(),
        }
    }

    fn rail_note(&self, note_id: &str) -> Option<Element> {
        let rail = self.rail()?;
        self.select_all(&rail, RAIL_NOTE_SELECTOR)
            .into_iter()
            .find(|el| el.get_attribute(RAIL_ATTR).as_deref() == Some(note_id))
    }

    fn set_lock_attr(&self, region: Option<RegionKind>) {
        let Some(body) = self.document.body() else {
            return;
        };
        match region {
            Some(kind) => body.set_attribute(LOCK_ATTR, kind.as_str()).ok(),
            None => body.remove_attribute(LOCK_ATTR).ok(),
        };
    }
}

impl Host for BrowserHost {
    async fn fetch(&self, location: &str) -> Result<String, FetchError> {
        let url = format!("/{}", location.trim_start_matches('/'));
        let response = JsFuture::from(self.window.fetch_with_str(&url))
            .await
            .map_err(transport)?;
        let response: Response = response.dyn_into().map_err(transport)?;
        if !response.ok() {
            return Err(FetchError::Status(response.status()));
        }
        let text = JsFuture::from(response.text().map_err(transport)?)
            .await
            .map_err(transport)?;
        text.as_string()
            .ok_or_else(|| FetchError::Transport("response body is not text".into()))
    }

    fn shell_ids(&self) -> Vec<String> {
        let content = self.content();
        let Ok(list) = self.document.query_selector_all("[id]") else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i)?.dyn_into::<Element>().ok())
            .filter(|el| match &content {
                Some(content) => {
                    let node: &Node = el;
                    el == content || !content.contains(Some(node))
                }
                None => true,
            })
            .map(|el| el.id())
            .filter(|id| !id.is_empty())
            .collect()
    }

    async fn sleep(&self, duration: Duration) {
        let window = self.window.clone();
        let millis = duration.as_millis().min(i32::MAX as u128) as i32;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
                .ok();
        });
        JsFuture::from(promise).await.ok();
    }

    fn fade(&self, fade: Fade) {
        let Some(content) = self.content() else {
            return;
        };
        let classes = content.class_list();
        match fade {
            Fade::Out => classes.add_1(FADING_CLASS).ok(),
            Fade::In => classes.remove_1(FADING_CLASS).ok(),
        };
    }

    fn mount(&self, html: &str) {
        if let Some(content) = self.content() {
            content.set_inner_html(html);
        }
    }

    fn set_document_title(&self, title: &str) {
        self.document.set_title(title);
    }

    fn set_header(&self, header: &HeaderText) {
        *self.header.borrow_mut() = header.clone();
        let selector = format!("[data-label-region=\"{HEADER_REGION}\"] [data-header-title]");
        if let Ok(Some(title)) = self.document.query_selector(&selector) {
            title.set_text_content(Some(&header.title));
        }
    }

    fn measure_header(&self) -> Vec<LabelMetrics> {
        self.regions()
            .iter()
            .map(|region| self.measure_region(region))
            .collect()
    }

    fn apply_header_layout(&self, layouts: &[LabelLayout]) {
        for (region, layout) in self.regions().iter().zip(layouts) {
            let variants = self.region_variants(region);
            if let Ok(Some(subtitle)) = region.query_selector("[data-subtitle]") {
                let text = layout.variant.and_then(|i| variants.get(i)).map(String::as_str);
                subtitle.set_text_content(text);
            }
            let classes = region.class_list();
            if layout.stacked {
                classes.add_1(STACKED_CLASS).ok();
            } else {
                classes.remove_1(STACKED_CLASS).ok();
            }
        }
    }

    fn measure_sidenotes(&self) -> SidenoteMeasurements {
        let rail = self.probe_rail();
        let Some(content) = self.content().filter(|_| rail.is_visible()) else {
            return SidenoteMeasurements {
                rail,
                references: Vec::new(),
            };
        };
        let content_top = content.get_bounding_client_rect().top();

        let references = self
            .select_all(&content, "label.sidenote-number[for]")
            .iter()
            .filter_map(|label| {
                let note_id = label.get_attribute("for")?;
                let note = self.rail_note(&note_id)?;
                let block = label
                    .closest("p, li, blockquote, figcaption")
                    .ok()
                    .flatten()
                    .or_else(|| label.parent_element())?;
                let block_rect = block.get_bounding_client_rect();
                Some(ReferenceMetrics {
                    offset_in_block: label.get_bounding_client_rect().top() - block_rect.top(),
                    block_top: block_rect.top() - content_top,
                    block_line_height: self.line_height(&block),
                    note_height: note.get_bounding_client_rect().height(),
                    note_line_height: self.line_height(&note),
                    note_id,
                })
            })
            .collect();

        SidenoteMeasurements { rail, references }
    }

    fn place_sidenotes(&self, placements: &[SidenotePlacement]) {
        for placement in placements {
            let Some(note) = self
                .rail_note(&placement.note_id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                continue;
            };
            note.style()
                .set_property("top", &format!("{}px", placement.resolved_top))
                .ok();
            if placement.was_pushed() {
                debug!("sidenote"; "{} pushed to {}px", placement.note_id, placement.resolved_top);
            }
        }
    }

    fn mark_active_nav(&self, path: &CanonicalPath) {
        for region in self.regions() {
            let links = self.select_all(&region, "nav a[href]");
            let paths: Vec<CanonicalPath> = links
                .iter()
                .map(|a| normalize(&a.get_attribute("href").unwrap_or_default()))
                .collect();
            let active = active_nav(path, &paths);
            for (i, link) in links.iter().enumerate() {
                if Some(i) == active {
                    link.class_list().add_1(ACTIVE_CLASS).ok();
                    link.set_attribute("aria-current", "page").ok();
                } else {
                    link.class_list().remove_1(ACTIVE_CLASS).ok();
                    link.remove_attribute("aria-current").ok();
                }
            }
        }
    }

    fn record_history(&self, state: &NavigationState, mode: HistoryMode) {
        let Ok(history) = self.window.history() else {
            return;
        };
        let data = JsValue::from_str(&state.to_json());
        let url = state.url();
        let result = match mode {
            HistoryMode::Push => history.push_state_with_url(&data, "", Some(&url)),
            HistoryMode::Replace => history.replace_state_with_url(&data, "", Some(&url)),
            HistoryMode::Skip => Ok(()),
        };
        if result.is_err() {
            debug!("nav"; "history update for {} rejected", url);
        }
    }

    fn scroll_to(&self, hash: Option<&str>) {
        let target = hash.and_then(|id| self.document.get_element_by_id(id));
        match target {
            Some(el) => {
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(ScrollBehavior::Smooth);
                el.scroll_into_view_with_scroll_into_view_options(&options);
            }
            None => self.window.scroll_to_with_x_and_y(0.0, 0.0),
        }
    }

    fn set_selection_lock(&self, region: Option<RegionKind>) {
        if region.is_none()
            && let Ok(mut lock) = self.selection.try_borrow_mut()
        {
            lock.reset();
        }
        self.set_lock_attr(region);
    }
}

fn transport(err: JsValue) -> FetchError {
    FetchError::Transport(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// `"24px"` → 24.0
fn parse_px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}
