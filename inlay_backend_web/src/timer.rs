// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout` one-shot timer.
//!
//! [`Timeout`] arms the browser timer for the trailing geometry pass. It owns
//! a single JS closure for its whole lifetime; arming again replaces the
//! pending timeout instead of stacking a second one.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use inlay_core::time::{Duration, HostTime};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

// Direct global bindings instead of `web_sys::Window` methods, which would
// need the Window fetched (and checked) on every call.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, delay_ms: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

/// Converts a `performance.now()` reading (milliseconds) to a [`HostTime`].
pub(crate) fn host_time_from_millis(ms: f64) -> HostTime {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "performance.now() returns small positive f64; µs fits in u64"
    )]
    let us = (ms * 1000.0) as u64;
    HostTime(us)
}

/// Converts a delay to whole `setTimeout` milliseconds, rounding up so the
/// callback never runs before the deadline.
pub(crate) fn delay_millis(delay: Duration) -> i32 {
    let ms = delay.ticks().div_ceil(1000);
    i32::try_from(ms).unwrap_or(i32::MAX)
}

/// A re-armable one-shot browser timer.
pub struct Timeout {
    inner: Rc<TimeoutInner>,
}

struct TimeoutInner {
    closure: RefCell<Option<Closure<dyn FnMut()>>>,
    callback: RefCell<Box<dyn FnMut()>>,
    /// The id of the pending `setTimeout`, if armed.
    pending: Cell<Option<i32>>,
}

impl Timeout {
    /// Creates a disarmed timer that runs `callback` each time it expires.
    pub fn new(callback: impl FnMut() + 'static) -> Self {
        let inner = Rc::new(TimeoutInner {
            closure: RefCell::new(None),
            callback: RefCell::new(Box::new(callback)),
            pending: Cell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let closure = Closure::wrap(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.pending.take().is_none() {
                return;
            }
            let mut callback = inner.callback.borrow_mut();
            (*callback)();
        }) as Box<dyn FnMut()>);
        *inner.closure.borrow_mut() = Some(closure);

        Self { inner }
    }

    /// Arms the timer to fire after `delay`, replacing any pending firing.
    pub fn arm(&self, delay: Duration) {
        self.cancel();
        if let Some(ref closure) = *self.inner.closure.borrow() {
            let id = set_timeout(closure.as_ref().unchecked_ref(), delay_millis(delay));
            self.inner.pending.set(Some(id));
        }
    }

    /// Cancels the pending firing, if any.
    pub fn cancel(&self) {
        if let Some(id) = self.inner.pending.take() {
            clear_timeout(id);
        }
    }

    /// Returns `true` if a firing is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.inner.pending.get().is_some()
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        self.cancel();
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for Timeout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Timeout")
            .field("pending", &self.inner.pending.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_round_up_to_whole_millis() {
        assert_eq!(delay_millis(Duration::ZERO), 0);
        assert_eq!(delay_millis(Duration(1)), 1);
        assert_eq!(delay_millis(Duration::from_millis(100)), 100);
        assert_eq!(delay_millis(Duration(99_001)), 100);
    }

    #[test]
    fn huge_delays_saturate() {
        assert_eq!(delay_millis(Duration(u64::MAX)), i32::MAX);
    }

    #[test]
    fn performance_millis_become_micro_ticks() {
        assert_eq!(host_time_from_millis(16.5), HostTime(16_500));
        assert_eq!(host_time_from_millis(0.0), HostTime(0));
    }
}
