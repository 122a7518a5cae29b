// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The installed overlay runtime.
//!
//! [`OverlayRuntime`] composes an [`Overlay`] with the browser: a mutation
//! observer on the document, passive `scroll`/`resize` listeners on the
//! window, a trailing-edge [`Timeout`], and one abortable fetch per queued
//! draw. Every browser callback holds only a weak reference, so dropping the
//! runtime (or calling [`teardown`](OverlayRuntime::teardown)) releases
//! everything.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use core::cell::RefCell;

use inlay_core::config::OverlayConfig;
use inlay_core::draw::{FetchError, RequestId};
use inlay_core::overlay::{FetchTicket, Overlay};
use inlay_core::throttle::Attempt;
use inlay_core::trace::TraceSink;
use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{AbortController, AddEventListenerOptions, Window};

use crate::bridge::WebKitBridge;
use crate::canvas::CanvasElement;
use crate::fetch;
use crate::now;
use crate::observer::{self, DocumentObserver, MutationBatch};
use crate::timer::Timeout;
use crate::viewport::WindowViewport;

/// Window events that can move overlay elements without a DOM mutation.
const LAYOUT_EVENTS: [&str; 2] = ["scroll", "resize"];

struct Shared {
    overlay: RefCell<Overlay<CanvasElement>>,
    bridge: RefCell<WebKitBridge>,
    viewport: WindowViewport,
    /// Abort handles of in-flight fetches.
    fetches: RefCell<BTreeMap<RequestId, AbortController>>,
    timer: RefCell<Option<Timeout>>,
    observer: RefCell<Option<DocumentObserver>>,
    listener: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Shared {
    fn request_geometry(&self) {
        let attempt = self.overlay.borrow_mut().request_geometry(
            now(),
            &self.viewport,
            &mut *self.bridge.borrow_mut(),
        );
        self.arm(attempt);
    }

    fn arm(&self, attempt: Attempt) {
        if let Attempt::Scheduled(at) = attempt
            && let Some(timer) = &*self.timer.borrow()
        {
            timer.arm(at.saturating_duration_since(now()));
        }
    }

    fn fire_timer(&self) {
        self.overlay.borrow_mut().fire_geometry_timer(
            now(),
            &self.viewport,
            &mut *self.bridge.borrow_mut(),
        );
    }

    fn on_mutations(&self, batch: MutationBatch) {
        let (attempt, canceled) = self.overlay.borrow_mut().on_mutations(
            batch.changes,
            now(),
            &self.viewport,
            &mut *self.bridge.borrow_mut(),
        );
        self.abort(canceled);
        self.arm(attempt);
    }

    fn abort(&self, requests: impl IntoIterator<Item = RequestId>) {
        let mut fetches = self.fetches.borrow_mut();
        for request in requests {
            if let Some(controller) = fetches.remove(&request) {
                controller.abort();
            }
        }
    }

    fn draw(self: &Rc<Self>, id: &str, image_id: &str, x: f64, y: f64, width: u32, height: u32) {
        let Some(ticket) = self
            .overlay
            .borrow_mut()
            .draw(id, image_id, x, y, width, height)
        else {
            return;
        };
        let uri = ticket.uri(self.overlay.borrow().config().resource_scheme);

        let Ok(controller) = AbortController::new() else {
            self.complete(&ticket, Err(FetchError::Transport));
            return;
        };
        let signal = controller.signal();
        self.fetches.borrow_mut().insert(ticket.request, controller);

        let weak = Rc::downgrade(self);
        wasm_bindgen_futures::spawn_local(async move {
            let payload = fetch::fetch_bytes(&uri, &signal).await;
            if let Some(shared) = weak.upgrade() {
                shared.fetches.borrow_mut().remove(&ticket.request);
                shared.complete(&ticket, payload);
            }
        });
    }

    fn complete(&self, ticket: &FetchTicket, payload: Result<alloc::vec::Vec<u8>, FetchError>) {
        self.overlay
            .borrow_mut()
            .complete_draw(ticket, payload, &self.viewport);
    }

    fn detach(&self) {
        self.observer.borrow_mut().take();
        if let Some(timer) = self.timer.borrow_mut().take() {
            timer.cancel();
        }
        if let Some(listener) = self.listener.borrow_mut().take() {
            let window = self.viewport.window();
            for event in LAYOUT_EVENTS {
                let _ = window
                    .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
            }
        }
    }
}

/// The overlay runtime for one document.
///
/// From JavaScript, the host drives it with the `child_*` commands.
#[wasm_bindgen]
pub struct OverlayRuntime {
    shared: Rc<Shared>,
}

impl core::fmt::Debug for OverlayRuntime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OverlayRuntime")
            .field("children", &self.shared.overlay.borrow().len())
            .field("fetches", &self.shared.fetches.borrow().len())
            .finish_non_exhaustive()
    }
}

impl OverlayRuntime {
    /// Installs the runtime on the current window's document.
    ///
    /// Subscribes to document mutations and window layout events, sends the
    /// ready notification, then adopts any overlay elements already in the
    /// document.
    pub fn install(config: OverlayConfig) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;

        let shared = Rc::new(Shared {
            overlay: RefCell::new(Overlay::new(config)),
            bridge: RefCell::new(WebKitBridge::new(config.handlers)),
            viewport: WindowViewport::new(window.clone()),
            fetches: RefCell::new(BTreeMap::new()),
            timer: RefCell::new(None),
            observer: RefCell::new(None),
            listener: RefCell::new(None),
        });

        let weak = Rc::downgrade(&shared);
        *shared.timer.borrow_mut() = Some(Timeout::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.fire_timer();
            }
        }));

        let weak = Rc::downgrade(&shared);
        let listener = Closure::wrap(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.request_geometry();
            }
        }) as Box<dyn FnMut()>);
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        for event in LAYOUT_EVENTS {
            window.add_event_listener_with_callback_and_add_event_listener_options(
                event,
                listener.as_ref().unchecked_ref(),
                &options,
            )?;
        }
        *shared.listener.borrow_mut() = Some(listener);

        let weak = Rc::downgrade(&shared);
        let observer = DocumentObserver::observe(&document, config, move |batch| {
            if let Some(shared) = weak.upgrade() {
                shared.on_mutations(batch);
            }
        })?;
        *shared.observer.borrow_mut() = Some(observer);

        shared
            .overlay
            .borrow_mut()
            .ready(&mut *shared.bridge.borrow_mut());

        let existing = observer::existing(&config, &document);
        if !existing.is_empty() {
            shared.on_mutations(existing);
        }

        Ok(Self { shared })
    }

    /// Installs a trace sink on the underlying overlay.
    pub fn set_trace_sink(&self, sink: Box<dyn TraceSink>) {
        self.shared.overlay.borrow_mut().set_trace_sink(sink);
    }

    /// The window this runtime is installed on.
    #[must_use]
    pub fn window(&self) -> &Window {
        self.shared.viewport.window()
    }
}

#[wasm_bindgen]
impl OverlayRuntime {
    /// Resizes a child's backing store; sizes are in logical pixels.
    pub fn child_resize(&self, id: &str, width: f64, height: f64, min_width: f64, min_height: f64) {
        let canceled = self.shared.overlay.borrow_mut().resize(
            id,
            width,
            height,
            min_width,
            min_height,
            &self.shared.viewport,
        );
        self.shared.abort(canceled);
    }

    /// Queues a paint of `image_id` at `(x, y)`; an empty image id means the
    /// widget's current contents.
    pub fn child_draw(&self, id: &str, image_id: &str, x: f64, y: f64, width: u32, height: u32) {
        self.shared.draw(id, image_id, x, y, width, height);
    }

    /// Shows or hides a child.
    pub fn child_set_visible(&self, id: &str, visible: bool) {
        self.shared.overlay.borrow_mut().set_visible(id, visible);
    }

    /// Resizes a freshly discovered child, then shows or hides it.
    pub fn child_init(
        &self,
        id: &str,
        width: f64,
        height: f64,
        min_width: f64,
        min_height: f64,
        visible: bool,
    ) {
        let canceled = self.shared.overlay.borrow_mut().init_child(
            id,
            width,
            height,
            min_width,
            min_height,
            visible,
            &self.shared.viewport,
        );
        self.shared.abort(canceled);
    }

    /// Requests a rate-limited geometry pass, as a scroll event would.
    pub fn update_positions(&self) {
        self.shared.request_geometry();
    }

    /// Ids of the tracked children.
    #[must_use]
    pub fn children(&self) -> Array {
        self.shared
            .overlay
            .borrow()
            .child_ids()
            .map(|id| JsValue::from_str(id.as_str()))
            .collect()
    }

    /// Detaches from the document and window, aborts every in-flight fetch,
    /// and forgets all children.
    pub fn teardown(&self) {
        self.shared.detach();
        let canceled = self.shared.overlay.borrow_mut().teardown();
        self.shared.abort(canceled.into_iter().map(|(_, request)| request));
        let stragglers = core::mem::take(&mut *self.shared.fetches.borrow_mut());
        for controller in stragglers.into_values() {
            controller.abort();
        }
    }
}

impl Drop for OverlayRuntime {
    fn drop(&mut self) {
        self.shared.detach();
    }
}
