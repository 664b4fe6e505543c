//! WASM bindings for `folio-parse`.
//!
//! Exposes the post parser to JavaScript via wasm-bindgen, plus a
//! [`TocNavigator`] that keeps a table of contents in step with a scrolling
//! element in the page.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use folio_parse::nav::{NavConfig, Navigator, ScrollContainer, ScrollMetrics};
use folio_parse::toc::{self, TocGroup};
use folio_parse::Post;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, EventTarget, ScrollBehavior, ScrollToOptions,
    Window,
};

/// Parse a post body and return its blocks as a JSON array.
#[wasm_bindgen]
pub fn parse(input: &str) -> String {
    serde_json::to_string(&folio_parse::parse(input)).unwrap_or_else(|_| "[]".to_string())
}

/// Load a full post (front matter and body) and return it as JSON.
///
/// Returns a JSON object with `{ post, diagnostics }`.
#[wasm_bindgen(js_name = loadPost)]
pub fn load_post(id: &str, input: &str) -> String {
    let loaded = Post::load(id, input);
    serde_json::json!({
        "post": loaded.post,
        "diagnostics": loaded.diagnostics,
    })
    .to_string()
}

/// Table of contents entries for a post, as an array of `{ id, text, level }`.
#[wasm_bindgen]
pub fn headings(input: &str) -> Result<JsValue, JsValue> {
    let post = Post::load("", input).post;
    serde_wasm_bindgen::to_value(&post.headings()).map_err(Into::into)
}

/// Grouped table of contents: `[{ parent, children }]`.
#[wasm_bindgen(js_name = tocGroups)]
pub fn toc_groups(input: &str) -> Result<JsValue, JsValue> {
    let post = Post::load("", input).post;
    serde_wasm_bindgen::to_value(&toc::group_headings(&post.headings())).map_err(Into::into)
}

/// Validate a post and return diagnostics as JSON.
///
/// Loading problems come first, then authoring checks. An empty array means
/// the post is clean.
#[wasm_bindgen]
pub fn validate(id: &str, input: &str) -> String {
    let loaded = Post::load(id, input);
    let mut all = loaded.diagnostics;
    all.extend(loaded.post.validate());
    serde_json::to_string(&all).unwrap_or_else(|_| "[]".to_string())
}

// ------------------------------------------------------------------
// Scroll tracking
// ------------------------------------------------------------------

/// A scrollable element in the live page.
struct DomContainer {
    document: Document,
    element: Element,
    /// The document's own scrolling element, whose top is the viewport top.
    viewport: bool,
}

impl ScrollContainer for DomContainer {
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: f64::from(self.element.scroll_top()),
            scroll_height: f64::from(self.element.scroll_height()),
            client_height: f64::from(self.element.client_height()),
            top: if self.viewport {
                0.0
            } else {
                self.element.get_bounding_client_rect().top()
            },
        }
    }

    fn heading_top(&self, id: &str) -> Option<f64> {
        let heading = self.document.get_element_by_id(id)?;
        Some(heading.get_bounding_client_rect().top())
    }

    fn scroll_to(&mut self, offset: f64) {
        let options = ScrollToOptions::new();
        options.set_top(offset);
        options.set_behavior(ScrollBehavior::Smooth);
        self.element.scroll_to_with_scroll_to_options(&options);
    }
}

struct Inner {
    navigator: Navigator,
    groups: Vec<TocGroup>,
    container: Option<DomContainer>,
    pending: Option<i32>,
    on_change: Option<js_sys::Function>,
}

/// Scroll-spy for a rendered post.
///
/// Listens to scroll events on the post's container, tracks the active
/// heading, and scrolls smoothly to a heading on [`jump_to`](Self::jump_to).
/// Listeners and timers are released when the object is freed.
#[wasm_bindgen]
pub struct TocNavigator {
    window: Window,
    inner: Rc<RefCell<Inner>>,
    listener: Option<(EventTarget, Closure<dyn FnMut()>)>,
}

#[wasm_bindgen]
impl TocNavigator {
    /// Track the headings of `source`, rendered inside the element matching
    /// `content_selector` (default `main, [role=main]`).
    ///
    /// Scroll events come from the nearest scrollable ancestor of that
    /// element, falling back to the document's scrolling element.
    /// `config` is an optional JSON object of navigation settings.
    #[wasm_bindgen(constructor)]
    pub fn new(
        source: &str,
        content_selector: Option<String>,
        config: Option<String>,
    ) -> Result<TocNavigator, JsValue> {
        let config: NavConfig = match config {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| JsValue::from_str(&format!("Invalid navigation config: {e}")))?,
            None => NavConfig::default(),
        };

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document"))?;

        let selector = content_selector.as_deref().unwrap_or("main, [role=main]");
        let scroller = document
            .query_selector(selector)?
            .and_then(|content| scrollable_ancestor(&window, &content));
        let (container, target): (Option<DomContainer>, Option<EventTarget>) = match scroller {
            Some(element) => (
                Some(DomContainer {
                    document: document.clone(),
                    element: element.clone(),
                    viewport: false,
                }),
                Some(element.unchecked_into()),
            ),
            None => match document.scrolling_element() {
                // The viewport scrolls the window, so listen there.
                Some(element) => (
                    Some(DomContainer {
                        document: document.clone(),
                        element,
                        viewport: true,
                    }),
                    Some(window.clone().unchecked_into()),
                ),
                None => (None, None),
            },
        };

        let post = Post::load("", source).post;
        let headings = post.headings();
        let inner = Rc::new(RefCell::new(Inner {
            navigator: Navigator::from_headings(headings.clone(), config),
            groups: toc::group_headings(&headings),
            container,
            pending: None,
            on_change: None,
        }));

        let listener = match target {
            Some(target) => {
                let weak = Rc::downgrade(&inner);
                let closure = Closure::<dyn FnMut()>::new(move || handle_scroll(&weak));
                let options = AddEventListenerOptions::new();
                options.set_passive(true);
                target.add_event_listener_with_callback_and_add_event_listener_options(
                    "scroll",
                    closure.as_ref().unchecked_ref(),
                    &options,
                )?;
                Some((target, closure))
            }
            None => None,
        };

        handle_scroll(&Rc::downgrade(&inner));

        Ok(TocNavigator {
            window,
            inner,
            listener,
        })
    }

    /// Id of the active heading, if any.
    #[wasm_bindgen(js_name = activeId)]
    pub fn active_id(&self) -> Option<String> {
        self.inner
            .borrow()
            .navigator
            .active_heading_id()
            .map(str::to_string)
    }

    /// Index of the TOC group holding the active heading.
    #[wasm_bindgen(js_name = activeGroup)]
    pub fn active_group(&self) -> Option<usize> {
        let inner = self.inner.borrow();
        toc::active_group(&inner.groups, inner.navigator.active_heading_id())
    }

    /// Current navigation state as `{ activeHeadingId, isProgrammaticScroll }`.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.borrow().navigator.state()).map_err(Into::into)
    }

    /// Register a callback invoked with the new id whenever the active
    /// heading changes.
    #[wasm_bindgen(js_name = setOnChange)]
    pub fn set_on_change(&self, callback: js_sys::Function) {
        self.inner.borrow_mut().on_change = Some(callback);
    }

    /// Smoothly scroll to the heading with `id` and make it active.
    ///
    /// Returns `false` when the heading is unknown or not in the page.
    #[wasm_bindgen(js_name = jumpTo)]
    pub fn jump_to(&self, id: &str) -> bool {
        let notify = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let before = inner.navigator.active_heading_id().map(str::to_string);
            let Some(ticket) = inner.navigator.jump_to(id, inner.container.as_mut()) else {
                return false;
            };

            if let Some(handle) = inner.pending.take() {
                self.window.clear_timeout_with_handle(handle);
            }

            let weak = Rc::downgrade(&self.inner);
            let callback = Closure::once_into_js(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut inner = inner.borrow_mut();
                    inner.pending = None;
                    inner.navigator.settle(ticket);
                }
            });
            let delay = i32::try_from(ticket.delay.as_millis()).unwrap_or(i32::MAX);
            match self
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    callback.unchecked_ref(),
                    delay,
                ) {
                Ok(handle) => inner.pending = Some(handle),
                // Without a timer the guard would never drop.
                Err(_) => {
                    inner.navigator.settle(ticket);
                }
            }

            let changed = active_change(before.as_deref(), inner.navigator.active_heading_id());
            inner.on_change.clone().zip(changed)
        };

        if let Some((callback, id)) = notify {
            notify_change(&callback, &id);
        }
        true
    }
}

impl Drop for TocNavigator {
    fn drop(&mut self) {
        if let Some((target, closure)) = self.listener.take() {
            let _ = target
                .remove_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
        }
        if let Some(handle) = self.inner.borrow_mut().pending.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

/// The newly active id, if it differs from `before`.
fn active_change(before: Option<&str>, after: Option<&str>) -> Option<String> {
    after.filter(|id| before != Some(*id)).map(str::to_string)
}

/// Call the page's change callback, logging anything it throws.
fn notify_change(callback: &js_sys::Function, id: &str) {
    if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(id)) {
        web_sys::console::warn_2(&JsValue::from_str("folio: TOC change callback threw"), &err);
    }
}

/// First element from `start` upwards whose content scrolls vertically.
fn scrollable_ancestor(window: &Window, start: &Element) -> Option<Element> {
    let mut current = Some(start.clone());
    while let Some(element) = current {
        let overflow = window
            .get_computed_style(&element)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value("overflow-y").ok())
            .unwrap_or_default();
        let scrolls = matches!(overflow.as_str(), "auto" | "scroll" | "overlay");
        if scrolls && element.scroll_height() > element.client_height() {
            return Some(element);
        }
        current = element.parent_element();
    }
    None
}

/// Recompute the active heading and tell the page if it changed.
///
/// The borrow is released before calling back into JavaScript, which may
/// query the navigator again.
fn handle_scroll(inner: &Weak<RefCell<Inner>>) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let notify = {
        let mut guard = inner.borrow_mut();
        let state = &mut *guard;
        if !state.navigator.on_scroll(state.container.as_ref()) {
            return;
        }
        state
            .on_change
            .clone()
            .zip(state.navigator.active_heading_id().map(str::to_string))
    };
    if let Some((callback, id)) = notify {
        notify_change(&callback, &id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_to_active_heading_reports_no_change() {
        assert_eq!(active_change(Some("setup"), Some("setup")), None);
        assert_eq!(active_change(Some("setup"), Some("usage")).as_deref(), Some("usage"));
        assert_eq!(active_change(None, Some("intro")).as_deref(), Some("intro"));
        assert_eq!(active_change(Some("intro"), None), None);
    }
}
