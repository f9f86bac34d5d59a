//! iOS Safari viewport fixes.
//!
//! Everything that touches global document state lives here behind an
//! explicit lifecycle: [`PlatformAdapter::install`] attaches the listeners
//! and dropping the adapter detaches them again. Delayed scrolls keep their
//! timer handles so teardown cancels anything still pending.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use medseek_chat::platform::{viewport_unit, NO_ZOOM_FONT_SIZE};
use medseek_chat::{KeyboardEvent, KeyboardTracker};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, Event, HtmlElement, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition,
    Window,
};

use crate::dom::{self, EventListener};
use crate::utils;

const KEYBOARD_SCROLL_DELAY_MS: u32 = 100;
const FOCUS_SCROLL_DELAY_MS: u32 = 300;
const SETTLE_SCROLL_DELAY_MS: u32 = 100;
const MESSAGES_SELECTOR: &str = ".messages-container";

// Pending delayed action; replacing or dropping the handle cancels it
type TimerSlot = Rc<RefCell<Option<Timeout>>>;

/// Installed iOS viewport workarounds
pub struct PlatformAdapter {
    root: HtmlElement,
    keyboard_scroll: TimerSlot,
    focus_scroll: TimerSlot,
    _listeners: Vec<EventListener>,
}

impl PlatformAdapter {
    /// Attach the workarounds. Returns `None` outside iOS Safari.
    pub fn install(window: &Window) -> Result<Option<Self>, JsValue> {
        if !medseek_chat::is_ios_safari(&utils::user_agent()) {
            log::debug!("Not iOS Safari, viewport fixes skipped");
            return Ok(None);
        }

        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object"))?;
        let root = document
            .document_element()
            .ok_or_else(|| JsValue::from_str("No document element"))?
            .dyn_into::<HtmlElement>()?;

        set_viewport_height(window, &root);

        let keyboard_scroll = TimerSlot::default();
        let focus_scroll = TimerSlot::default();
        let mut listeners = Vec::new();

        // Keyboard show/hide resizes the window; keep the newest message visible
        let mut tracker = KeyboardTracker::new(inner_height(window));
        {
            let window_for_cb = window.clone();
            let root = root.clone();
            let slot = keyboard_scroll.clone();
            listeners.push(EventListener::new(window.as_ref(), "resize", move |_| {
                set_viewport_height(&window_for_cb, &root);
                if tracker.observe(inner_height(&window_for_cb)).is_some() {
                    let document = window_for_cb.document();
                    let timeout = Timeout::new(KEYBOARD_SCROLL_DELAY_MS, move || {
                        if let Some(container) = document
                            .and_then(|d| d.query_selector(MESSAGES_SELECTOR).ok().flatten())
                        {
                            dom::scroll_to_end(&container);
                        }
                    });
                    *slot.borrow_mut() = Some(timeout);
                }
            })?);
        }

        {
            let window_for_cb = window.clone();
            let root = root.clone();
            listeners.push(EventListener::new(window.as_ref(), "orientationchange", move |_| {
                set_viewport_height(&window_for_cb, &root);
            })?);
        }

        // Focused inputs: 16px stops the auto-zoom, then bring them into view
        {
            let slot = focus_scroll.clone();
            listeners.push(EventListener::new(document.as_ref(), "focusin", move |event| {
                on_input_focus(&slot, event)
            })?);
        }

        log::info!("iOS viewport fixes installed");
        Ok(Some(Self {
            root,
            keyboard_scroll,
            focus_scroll,
            _listeners: listeners,
        }))
    }
}

impl Drop for PlatformAdapter {
    fn drop(&mut self) {
        self.keyboard_scroll.borrow_mut().take();
        self.focus_scroll.borrow_mut().take();
        let _ = self.root.style().remove_property("--vh");
        log::debug!("iOS viewport fixes removed");
    }
}

/// Keyboard toggle listener; dropping it unsubscribes
pub struct KeyboardSubscription {
    _listener: EventListener,
}

/// Call `callback` when the on-screen keyboard shows or hides.
/// Returns `None` when not running on iOS.
pub fn on_keyboard_toggle<F>(window: &Window, mut callback: F) -> Result<Option<KeyboardSubscription>, JsValue>
where
    F: FnMut(KeyboardEvent) + 'static,
{
    if !utils::is_ios() {
        return Ok(None);
    }

    let mut tracker = KeyboardTracker::new(inner_height(window));
    let window_for_cb = window.clone();
    let listener = EventListener::new(window.as_ref(), "resize", move |_| {
        if let Some(event) = tracker.observe(inner_height(&window_for_cb)) {
            log::debug!("Keyboard {} ({}px)", event.name(), event.height());
            callback(event);
        }
    })?;

    Ok(Some(KeyboardSubscription {
        _listener: listener,
    }))
}

/// Scrolls an element to its end on the next tick. On iOS a smooth scroll
/// gets a second pass once late layout has settled. Dropping the scroller or
/// calling [`BottomScroller::cancel`] stops any pass still pending.
#[derive(Default)]
pub struct BottomScroller {
    first: RefCell<Option<Timeout>>,
    settle: TimerSlot,
}

impl BottomScroller {
    pub fn scroll(&self, element: &Element, smooth: bool) {
        let element = element.clone();
        let settle_pass = smooth && utils::is_ios();
        let settle = self.settle.clone();
        settle.borrow_mut().take();

        let timeout = Timeout::new(0, move || {
            dom::scroll_to_end(&element);
            if settle_pass {
                let timeout =
                    Timeout::new(SETTLE_SCROLL_DELAY_MS, move || dom::scroll_to_end(&element));
                *settle.borrow_mut() = Some(timeout);
            }
        });
        *self.first.borrow_mut() = Some(timeout);
    }

    pub fn cancel(&self) {
        self.first.borrow_mut().take();
        self.settle.borrow_mut().take();
    }
}

fn inner_height(window: &Window) -> i32 {
    window
        .inner_height()
        .ok()
        .and_then(|h| h.as_f64())
        .unwrap_or(0.0) as i32
}

fn set_viewport_height(window: &Window, root: &HtmlElement) {
    let height = window
        .inner_height()
        .ok()
        .and_then(|h| h.as_f64())
        .unwrap_or(0.0);
    let _ = root.style().set_property("--vh", &viewport_unit(height));
}

fn on_input_focus(slot: &TimerSlot, event: Event) {
    let Some(element) = event
        .target()
        .and_then(|t| t.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };

    if !matches!(element.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT") {
        return;
    }

    let _ = element.style().set_property("font-size", NO_ZOOM_FONT_SIZE);

    let timeout = Timeout::new(FOCUS_SCROLL_DELAY_MS, move || {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Center);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    });
    *slot.borrow_mut() = Some(timeout);
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use gloo_timers::future::TimeoutFuture;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn scrollable() -> Element {
        let document = crate::document().unwrap();
        let outer = document.create_element("div").unwrap();
        outer
            .set_attribute("style", "height:50px;overflow:auto")
            .unwrap();
        outer.set_inner_html(r#"<div style="height:500px"></div>"#);
        document.body().unwrap().append_child(&outer).unwrap();
        outer
    }

    #[wasm_bindgen_test]
    async fn test_scroll_reaches_end() {
        let element = scrollable();
        let scroller = BottomScroller::default();
        scroller.scroll(&element, false);
        TimeoutFuture::new(20).await;
        assert!(element.scroll_top() > 0);
    }

    #[wasm_bindgen_test]
    async fn test_cancelled_scroll_never_runs() {
        let element = scrollable();
        let scroller = BottomScroller::default();
        scroller.scroll(&element, true);
        scroller.cancel();
        TimeoutFuture::new(20).await;
        assert_eq!(element.scroll_top(), 0);
    }

    #[wasm_bindgen_test]
    async fn test_dropping_scroller_cancels_pending_scroll() {
        let element = scrollable();
        let scroller = BottomScroller::default();
        scroller.scroll(&element, false);
        drop(scroller);
        TimeoutFuture::new(20).await;
        assert_eq!(element.scroll_top(), 0);
    }
}
