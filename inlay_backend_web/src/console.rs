// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace output to the browser console.

use alloc::format;
use alloc::string::String;

use inlay_core::trace::{
    DiscoveryEvent, DrawEvent, DrawStage, ForgetEvent, GeometryEvent, ResizeEvent, ThrottleEvent,
    TraceSink, VisibilityEvent,
};
use wasm_bindgen::JsValue;

/// A [`TraceSink`] writing one `console.debug` line per event.
///
/// Events only flow with this crate's `trace` feature enabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

fn emit(line: &str) {
    web_sys::console::debug_1(&JsValue::from_str(line));
}

pub(crate) fn draw_line(e: &DrawEvent<'_>) -> String {
    let stage = match e.stage {
        DrawStage::Queued => String::from("queued"),
        DrawStage::Applied => String::from("applied"),
        DrawStage::Failed(err) => format!("failed ({err})"),
        DrawStage::Stale => String::from("stale"),
    };
    format!("[inlay:draw] {} #{} {stage}", e.child, e.request.0)
}

impl TraceSink for ConsoleSink {
    fn on_discovery(&mut self, e: &DiscoveryEvent) {
        emit(&format!(
            "[inlay:discover] new={} duplicate={}",
            e.discovered, e.duplicates
        ));
    }

    fn on_forget(&mut self, e: &ForgetEvent<'_>) {
        emit(&format!(
            "[inlay:forget] {} canceled={}",
            e.child, e.canceled
        ));
    }

    fn on_geometry(&mut self, e: &GeometryEvent) {
        emit(&format!(
            "[inlay:geometry] changed={}/{} scale={}",
            e.changed, e.evaluated, e.scale
        ));
    }

    fn on_throttle(&mut self, e: &ThrottleEvent) {
        let how = if e.coalesced { "coalesced" } else { "scheduled" };
        emit(&format!(
            "[inlay:throttle] {how} until {:.1}ms",
            e.deadline.ticks() as f64 / 1000.0
        ));
    }

    fn on_resize(&mut self, e: &ResizeEvent<'_>) {
        emit(&format!(
            "[inlay:resize] {} {}x{} -> {}x{} canceled={} restored={}",
            e.child, e.from.width, e.from.height, e.to.width, e.to.height, e.canceled, e.restored
        ));
    }

    fn on_draw(&mut self, e: &DrawEvent<'_>) {
        emit(&draw_line(e));
    }

    fn on_visibility(&mut self, e: &VisibilityEvent<'_>) {
        let state = if e.visible { "shown" } else { "hidden" };
        emit(&format!("[inlay:visibility] {} {state}", e.child));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inlay_core::draw::{FetchError, RequestId};

    #[test]
    fn draw_lines_name_the_stage() {
        let mut e = DrawEvent {
            child: "w1",
            request: RequestId(7),
            stage: DrawStage::Applied,
        };
        assert_eq!(draw_line(&e), "[inlay:draw] w1 #7 applied");

        e.stage = DrawStage::Failed(FetchError::PayloadSize {
            expected: 16,
            actual: 15,
        });
        assert_eq!(
            draw_line(&e),
            "[inlay:draw] w1 #7 failed (pixel payload is 15 bytes, expected 16)"
        );
    }
}
