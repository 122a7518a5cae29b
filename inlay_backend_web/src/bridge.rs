// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `window.webkit.messageHandlers` as the [`HostBridge`].
//!
//! Each notification is posted to a named handler. A missing handler (page
//! opened outside the hosting view) drops the message; nothing is ever
//! thrown back into the page.

use inlay_core::backend::HostBridge;
use inlay_core::config::HandlerNames;
use inlay_core::message::{Discovered, Placement};
use js_sys::{Function, Object, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast as _, JsValue};

/// Posts notifications to the host's script message handlers.
#[derive(Clone, Copy, Debug)]
pub struct WebKitBridge {
    handlers: HandlerNames,
}

impl WebKitBridge {
    /// Creates a bridge posting to the given handlers.
    #[must_use]
    pub fn new(handlers: HandlerNames) -> Self {
        Self { handlers }
    }

    /// The handler names in use.
    #[must_use]
    pub fn handlers(&self) -> HandlerNames {
        self.handlers
    }
}

impl HostBridge for WebKitBridge {
    fn ready(&mut self) {
        post(self.handlers.ready, &Object::new().into());
    }

    fn children_discovered(&mut self, batch: &[Discovered]) {
        post_serialized(self.handlers.children_discovered, &batch);
    }

    fn children_moved(&mut self, batch: &[Placement]) {
        post_serialized(self.handlers.children_moved, &batch);
    }
}

fn post_serialized(name: &str, payload: &impl Serialize) {
    match serde_wasm_bindgen::to_value(payload) {
        Ok(value) => post(name, &value),
        Err(err) => web_sys::console::warn_1(&JsValue::from_str(&alloc::format!(
            "inlay: cannot encode {name} payload: {err}"
        ))),
    }
}

fn post(name: &str, value: &JsValue) {
    let Some(handler) = message_handler(name) else {
        return;
    };
    let Some(post_message) = Reflect::get(&handler, &JsValue::from_str("postMessage"))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
    else {
        return;
    };
    let _ = post_message.call1(&handler, value);
}

fn message_handler(name: &str) -> Option<JsValue> {
    let mut target: JsValue = js_sys::global().into();
    for key in ["webkit", "messageHandlers", name] {
        target = Reflect::get(&target, &JsValue::from_str(key)).ok()?;
        if target.is_undefined() || target.is_null() {
            return None;
        }
    }
    Some(target)
}
