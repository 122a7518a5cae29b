// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the overlay protocol.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`Overlay`](crate::overlay::Overlay) calls as it discovers children, runs
//! geometry passes, and moves draw requests through their queues. All method
//! bodies default to no-ops, so implementing only the events you care about
//! is fine.
//!
//! [`Tracer`] owns an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing (zero overhead) and
//! installed sinks are dropped. When **on**, each method performs a single
//! `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use alloc::boxed::Box;

use crate::draw::{FetchError, RequestId};
use crate::scale::PhysicalSize;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a batch of inserted nodes has been processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscoveryEvent {
    /// Children added to the registry.
    pub discovered: usize,
    /// Candidates skipped because their id was already registered.
    pub duplicates: usize,
}

/// Emitted when a child is dropped from the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForgetEvent<'a> {
    /// The child's id.
    pub child: &'a str,
    /// Pending draws canceled with it.
    pub canceled: usize,
}

/// Emitted after a geometry pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryEvent {
    /// Children measured.
    pub evaluated: usize,
    /// Children whose rectangle changed and were reported.
    pub changed: usize,
    /// Device-pixel ratio used for the pass.
    pub scale: f64,
}

/// Emitted when a geometry request is deferred to the window boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThrottleEvent {
    /// When the trailing pass is due.
    pub deadline: HostTime,
    /// `true` if this request joined an already scheduled pass.
    pub coalesced: bool,
}

/// Emitted when a resize changes a child's backing store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResizeEvent<'a> {
    /// The child's id.
    pub child: &'a str,
    /// Previous backing-store size.
    pub from: PhysicalSize,
    /// New backing-store size.
    pub to: PhysicalSize,
    /// Pending draws canceled by the resize.
    pub canceled: usize,
    /// Whether previous contents were repainted after resizing.
    pub restored: bool,
}

/// What happened to a draw request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawStage {
    /// Pushed onto the child's queue; fetch issued.
    Queued,
    /// Painted into the surface.
    Applied,
    /// Dropped without painting.
    Failed(FetchError),
    /// Completed after being canceled (or after its child vanished); ignored.
    Stale,
}

/// Emitted as a draw request moves through its queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawEvent<'a> {
    /// The child's id.
    pub child: &'a str,
    /// The request.
    pub request: RequestId,
    /// The transition.
    pub stage: DrawStage,
}

/// Emitted when a child is shown or hidden.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityEvent<'a> {
    /// The child's id.
    pub child: &'a str,
    /// New visibility.
    pub visible: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from an overlay.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a discovery batch.
    fn on_discovery(&mut self, e: &DiscoveryEvent) {
        _ = e;
    }

    /// Called when a child is forgotten.
    fn on_forget(&mut self, e: &ForgetEvent<'_>) {
        _ = e;
    }

    /// Called after a geometry pass.
    fn on_geometry(&mut self, e: &GeometryEvent) {
        _ = e;
    }

    /// Called when a geometry request is deferred.
    fn on_throttle(&mut self, e: &ThrottleEvent) {
        _ = e;
    }

    /// Called after a resize took effect.
    fn on_resize(&mut self, e: &ResizeEvent<'_>) {
        _ = e;
    }

    /// Called on each draw request transition.
    fn on_draw(&mut self, e: &DrawEvent<'_>) {
        _ = e;
    }

    /// Called when a child's visibility changes.
    fn on_visibility(&mut self, e: &VisibilityEvent<'_>) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owner of an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$doc:meta])* $name:ident => $method:ident($ty:ty)) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: $ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        let mut tracer = Self::none();
        tracer.set_sink(sink);
        tracer
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Replaces the installed sink.
    pub fn set_sink(&mut self, sink: Box<dyn TraceSink>) {
        #[cfg(feature = "trace")]
        {
            self.sink = Some(sink);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
        }
    }

    dispatch!(
        /// Emits a [`DiscoveryEvent`].
        discovery => on_discovery(&DiscoveryEvent)
    );
    dispatch!(
        /// Emits a [`ForgetEvent`].
        forget => on_forget(&ForgetEvent<'_>)
    );
    dispatch!(
        /// Emits a [`GeometryEvent`].
        geometry => on_geometry(&GeometryEvent)
    );
    dispatch!(
        /// Emits a [`ThrottleEvent`].
        throttle => on_throttle(&ThrottleEvent)
    );
    dispatch!(
        /// Emits a [`ResizeEvent`].
        resize => on_resize(&ResizeEvent<'_>)
    );
    dispatch!(
        /// Emits a [`DrawEvent`].
        draw => on_draw(&DrawEvent<'_>)
    );
    dispatch!(
        /// Emits a [`VisibilityEvent`].
        visibility => on_visibility(&VisibilityEvent<'_>)
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_discovery(&DiscoveryEvent {
            discovered: 1,
            duplicates: 0,
        });
        sink.on_draw(&DrawEvent {
            child: "a",
            request: RequestId(1),
            stage: DrawStage::Queued,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.geometry(&GeometryEvent {
            evaluated: 0,
            changed: 0,
            scale: 1.0,
        });
        tracer.visibility(&VisibilityEvent {
            child: "a",
            visible: true,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::rc::Rc;
        use alloc::vec::Vec;
        use core::cell::RefCell;

        struct RecordingSink {
            changed: Rc<RefCell<Vec<usize>>>,
        }
        impl TraceSink for RecordingSink {
            fn on_geometry(&mut self, e: &GeometryEvent) {
                self.changed.borrow_mut().push(e.changed);
            }
        }

        let changed = Rc::new(RefCell::new(Vec::new()));
        let mut tracer = Tracer::new(Box::new(RecordingSink {
            changed: Rc::clone(&changed),
        }));
        tracer.geometry(&GeometryEvent {
            evaluated: 3,
            changed: 2,
            scale: 1.0,
        });
        assert_eq!(*changed.borrow(), [2]);
    }
}
