// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for inlay.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`OverlayRuntime`]: the installed runtime and its host-facing commands
//! - [`CanvasElement`]: `<canvas>` placeholders as overlay elements
//! - [`DocumentObserver`]: `MutationObserver` subscription
//! - [`WindowViewport`]: device-pixel ratio and scroll offset
//! - [`WebKitBridge`]: notifications via `window.webkit.messageHandlers`
//! - [`Timeout`]: `setTimeout` trailing-edge timer
//! - [`ConsoleSink`]: trace events to `console.debug`
//!
//! Build with: `wasm-pack build --target web inlay_backend_web`, then from the
//! page script:
//!
//! ```js
//! import init, { install } from "./pkg/inlay_backend_web.js";
//! await init();
//! window.maxwell = install();
//! ```

#![no_std]

extern crate alloc;

mod bridge;
mod canvas;
mod console;
pub mod fetch;
mod observer;
mod runtime;
mod timer;
mod viewport;

pub use bridge::WebKitBridge;
pub use canvas::{CanvasElement, FORCED_HEIGHT_ATTRIBUTE, FORCED_WIDTH_ATTRIBUTE, SCALE_ATTRIBUTE};
pub use console::ConsoleSink;
pub use inlay_core::backend::{HostBridge, OverlayElement, Viewport};
pub use observer::{DocumentObserver, MutationBatch};
pub use runtime::OverlayRuntime;
pub use timer::Timeout;
pub use viewport::WindowViewport;

use inlay_core::config::OverlayConfig;
use inlay_core::time::HostTime;
use wasm_bindgen::prelude::*;

/// Returns the current host time from `performance.now()`, in microsecond
/// ticks.
#[must_use]
pub fn now() -> HostTime {
    timer::host_time_from_millis(timer::performance_now())
}

/// Installs the overlay runtime with the `maxwell` protocol defaults.
///
/// With the `trace` feature, overlay events are logged to the console.
#[wasm_bindgen]
pub fn install() -> Result<OverlayRuntime, JsValue> {
    let runtime = OverlayRuntime::install(OverlayConfig::maxwell())?;
    if cfg!(feature = "trace") {
        runtime.set_trace_sink(alloc::boxed::Box::new(ConsoleSink));
    }
    Ok(runtime)
}
