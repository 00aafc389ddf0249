//! Browser entry point.
//!
//! `QuireApp` wires the navigation engine to the live document: it performs
//! the first load, intercepts in-site link clicks and keeps history, scroll,
//! layout and the selection lock in sync with user events.
//!
//! ```js
//! import init, { QuireApp } from "./quire.js";
//! await init();
//! new QuireApp(await (await fetch("/quire.toml")).text()).start();
//! ```

mod host;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, MouseEvent, Node, PopStateEvent};
use web_time::Instant;

use crate::config::SiteConfig;
use crate::layout::Debouncer;
use crate::nav::history::{
    ClickAction, LinkClick, PopAction, classify_click, decode_hash, on_popstate,
};
use crate::nav::selection::{LockChange, closest_region};
use crate::nav::{HistoryMode, Host, NavigationState, Session, load_route, relayout};
use crate::{debug, log, logger};

use host::{BrowserHost, Region};

type Listener = Closure<dyn FnMut(Event)>;

struct App {
    session: Session,
    host: BrowserHost,
    resize: RefCell<Debouncer>,
    listeners: RefCell<Vec<Listener>>,
}

#[wasm_bindgen]
pub struct QuireApp {
    app: Rc<App>,
}

#[wasm_bindgen]
impl QuireApp {
    /// Build the app from the contents of `quire.toml`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_toml: &str) -> Result<QuireApp, JsValue> {
        console_error_panic_hook::set_once();

        let config = SiteConfig::from_str_checked(config_toml, "quire.toml")
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        let resize = Debouncer::new(config.layout.resize_debounce());
        let app = App {
            session: Session::new(Arc::new(config)),
            host: BrowserHost::new()?,
            resize: RefCell::new(resize),
            listeners: RefCell::new(Vec::new()),
        };
        Ok(QuireApp { app: Rc::new(app) })
    }

    #[wasm_bindgen(js_name = setVerbose)]
    pub fn set_verbose(&self, verbose: bool) {
        logger::set_verbose(verbose);
    }

    /// Install event listeners and load the current location.
    pub fn start(&self) -> Result<(), JsValue> {
        install_listeners(&self.app)?;

        let location = self.app.host.window().location();
        let target = format!("{}{}", location.pathname()?, location.hash()?);
        navigate(&self.app, target, HistoryMode::Replace);
        Ok(())
    }

    /// Load a path as if a link to it had been clicked.
    pub fn navigate(&self, target: String) {
        navigate(&self.app, target, HistoryMode::Push);
    }

    /// Remove every listener this app installed.
    pub fn destroy(&self) {
        let window = self.app.host.window();
        let document = self.app.host.document();
        for listener in self.app.listeners.borrow_mut().drain(..) {
            let f = listener.as_ref().unchecked_ref();
            for event in ["popstate", "hashchange", "resize"] {
                window.remove_event_listener_with_callback(event, f).ok();
            }
            for event in ["click", "pointerdown", "pointerup", "selectionchange"] {
                document.remove_event_listener_with_callback(event, f).ok();
            }
        }
    }
}

fn navigate(app: &Rc<App>, target: String, mode: HistoryMode) {
    let app = app.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = load_route(&app.session, &app.host, &target, mode).await;
        debug!("nav"; "{} -> {:?}", target, outcome);
    });
}

fn install_listeners(app: &Rc<App>) -> Result<(), JsValue> {
    let window = app.host.window().clone();
    let document = app.host.document().clone();

    let click = listener(app, on_click);
    document.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;

    let popstate = listener(app, on_popstate_event);
    window.add_event_listener_with_callback("popstate", popstate.as_ref().unchecked_ref())?;

    let hashchange = listener(app, |app, _| {
        let hash = app.host.window().location().hash().unwrap_or_default();
        app.host.scroll_to(decode_hash(&hash).as_deref());
    });
    window.add_event_listener_with_callback("hashchange", hashchange.as_ref().unchecked_ref())?;

    let resize = listener(app, |app, _| on_resize(app));
    window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;

    let pointer_down = listener(app, |app, event| {
        let region = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| region_of(&el));
        let change = app.host.selection.borrow_mut().pointer_down(region);
        apply_lock(app, change);
    });
    document.add_event_listener_with_callback("pointerdown", pointer_down.as_ref().unchecked_ref())?;

    let pointer_up = listener(app, |app, _| {
        let collapsed = selection_collapsed(app);
        let change = app.host.selection.borrow_mut().pointer_up(collapsed);
        apply_lock(app, change);
    });
    document.add_event_listener_with_callback("pointerup", pointer_up.as_ref().unchecked_ref())?;

    let selection = listener(app, |app, _| on_selection_change(app));
    document
        .add_event_listener_with_callback("selectionchange", selection.as_ref().unchecked_ref())?;

    app.listeners
        .borrow_mut()
        .extend([click, popstate, hashchange, resize, pointer_down, pointer_up, selection]);
    Ok(())
}

/// Wrap a handler; the closure holds the app weakly so dropping the app
/// frees it.
fn listener(app: &Rc<App>, handler: impl Fn(&Rc<App>, &Event) + 'static) -> Listener {
    let weak = Rc::downgrade(app);
    Closure::wrap(Box::new(move |event: Event| {
        if let Some(app) = weak.upgrade() {
            handler(&app, &event);
        }
    }))
}

fn on_click(app: &Rc<App>, event: &Event) {
    if event.default_prevented() {
        return;
    }
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    let Some(anchor) = event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest("a[href]").ok().flatten())
    else {
        return;
    };

    let click = LinkClick {
        href: anchor.get_attribute("href").unwrap_or_default(),
        button: mouse.button(),
        modified: mouse.meta_key() || mouse.ctrl_key() || mouse.shift_key() || mouse.alt_key(),
        target: anchor.get_attribute("target"),
        download: anchor.has_attribute("download"),
    };
    let Some(base) = app
        .host
        .window()
        .location()
        .href()
        .ok()
        .and_then(|href| Url::parse(&href).ok())
    else {
        return;
    };

    match classify_click(&click, &base, app.session.current_path().as_ref()) {
        ClickAction::Ignore => {}
        ClickAction::ScrollTo { hash } => {
            event.prevent_default();
            if let Some(path) = app.session.current_path() {
                let state = NavigationState::new(path, hash.clone());
                app.host.record_history(&state, HistoryMode::Push);
            }
            app.host.scroll_to(hash.as_deref());
        }
        ClickAction::Navigate { path, hash } => {
            event.prevent_default();
            let target = NavigationState::new(path, hash).url();
            navigate(app, target, HistoryMode::Push);
        }
    }
}

fn on_popstate_event(app: &Rc<App>, event: &Event) {
    let stored = event
        .dyn_ref::<PopStateEvent>()
        .and_then(|e| e.state().as_string())
        .and_then(|json| NavigationState::from_json(&json));

    // Entries created outside the engine carry no state; use the address bar.
    let state = match stored {
        Some(state) => state,
        None => {
            let location = app.host.window().location();
            let path = location.pathname().unwrap_or_default();
            let hash = location.hash().unwrap_or_default();
            NavigationState::new(path.into(), decode_hash(&hash))
        }
    };

    match on_popstate(app.session.current_path().as_ref(), &state) {
        PopAction::Scroll { hash } => app.host.scroll_to(hash.as_deref()),
        PopAction::Reload { .. } => navigate(app, state.url(), HistoryMode::Skip),
    }
}

fn on_resize(app: &Rc<App>) {
    let opened = app.resize.borrow_mut().notify(Instant::now());
    if !opened {
        return;
    }

    let app = app.clone();
    wasm_bindgen_futures::spawn_local(async move {
        loop {
            let wait = app.resize.borrow().sleep_duration(Instant::now());
            let Some(wait) = wait else {
                return;
            };
            app.host.sleep(wait).await;
            if app.resize.borrow_mut().take_if_ready(Instant::now()) {
                relayout(&app.session, &app.host);
                return;
            }
        }
    });
}

fn on_selection_change(app: &Rc<App>) {
    let Ok(Some(selection)) = app.host.window().get_selection() else {
        return;
    };
    let collapsed = selection.is_collapsed();
    let region = selection
        .anchor_node()
        .and_then(|node| element_of(&node))
        .and_then(|el| region_of(&el));
    let change = app.host.selection.borrow_mut().selection_change(collapsed, region);
    apply_lock(app, change);
}

fn selection_collapsed(app: &App) -> bool {
    match app.host.window().get_selection() {
        Ok(Some(selection)) => selection.is_collapsed(),
        _ => true,
    }
}

fn apply_lock(app: &App, change: LockChange<Region>) {
    match change {
        LockChange::Unchanged => {}
        LockChange::Locked((_, kind)) => {
            debug!("selection"; "locked to {}", kind.as_str());
            app.host.set_selection_lock(Some(kind));
        }
        LockChange::Released => app.host.set_selection_lock(None),
    }
}

fn element_of(node: &Node) -> Option<Element> {
    match node.dyn_ref::<Element>() {
        Some(el) => Some(el.clone()),
        None => node.parent_element(),
    }
}

/// Closest selection region around `el`.
fn region_of(el: &Element) -> Option<Region> {
    let chain = std::iter::successors(Some(el.clone()), |el| el.parent_element())
        .map(|el| {
            let tag = el.tag_name();
            let classes = el.class_name();
            (el, tag, classes)
        });
    closest_region(chain)
}

#[wasm_bindgen(start)]
fn init() {
    log!("quire"; "engine loaded");
}
