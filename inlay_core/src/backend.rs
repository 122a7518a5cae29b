// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! The core never touches a document directly. A backend crate supplies
//! three pieces:
//!
//! - **Elements**: implements [`OverlayElement`] for the platform's
//!   placeholder node (on the web, a `<canvas>`), exposing display style,
//!   authored CSS size, the drawing surface, and layout geometry.
//!
//! - **Viewport**: implements [`Viewport`] to report the current
//!   device-pixel ratio and scroll offset. Both are read fresh on every
//!   operation.
//!
//! - **Host bridge**: implements [`HostBridge`] to forward outbound
//!   notifications to the native side.
//!
//! Inbound commands, change notifications, timers, and fetches are wired by
//! the backend to the matching [`Overlay`](crate::overlay::Overlay) methods.
//!
//! # Event loop pseudocode
//!
//! ```rust,ignore
//! // Document mutation callback: inserted and removed overlay elements,
//! // in record order. The geometry pass is requested internally.
//! let (attempt, canceled) = overlay.on_mutations(changes, now(), &viewport, &mut bridge);
//! abort_fetches(canceled);
//! if let Attempt::Scheduled(at) = attempt {
//!     arm_timer(at.saturating_duration_since(now()));
//! }
//!
//! // Scroll / resize: the pass runs immediately when the limiter is idle.
//! if let Attempt::Scheduled(at) = overlay.request_geometry(now(), &viewport, &mut bridge) {
//!     arm_timer(at.saturating_duration_since(now()));
//! }
//!
//! // Timer expiry
//! overlay.fire_geometry_timer(now(), &viewport, &mut bridge);
//!
//! // Host command
//! if let Some(ticket) = overlay.draw(id, image_id, x, y, w, h) {
//!     spawn(async move {
//!         let bytes = fetch(&ticket.uri(config.resource_scheme)).await;
//!         overlay.complete_draw(&ticket, bytes, &viewport);
//!     });
//! }
//! ```

use alloc::string::String;

use kurbo::{Rect, Size, Vec2};

use crate::child::AuthoredSize;
use crate::draw::PixelBuffer;
use crate::message::{Discovered, Placement};
use crate::scale::PhysicalSize;

/// An overlay placeholder element and its drawing surface.
pub trait OverlayElement {
    /// Captured surface contents, restored after a backing-store resize.
    type Snapshot;

    /// Returns the element's current inline CSS `display` value.
    fn display(&self) -> String;

    /// Sets the element's inline CSS `display` value.
    fn set_display(&mut self, value: &str);

    /// Reports which axes have an explicit, non-`auto` CSS size.
    fn authored_size(&self) -> AuthoredSize;

    /// Returns the backing-store size in physical pixels.
    fn backing_size(&self) -> PhysicalSize;

    /// Sets the backing-store size. This clears the surface.
    fn set_backing_size(&mut self, size: PhysicalSize);

    /// Captures the current surface contents. Returns `None` if the surface
    /// is empty or cannot be read.
    fn snapshot(&self) -> Option<Self::Snapshot>;

    /// Paints a snapshot at the origin, replacing (not blending with) the
    /// pixels underneath.
    fn restore(&mut self, snapshot: &Self::Snapshot);

    /// Paints `pixels` stretched over `dest` (physical units), replacing the
    /// pixels underneath.
    fn put_pixels(&mut self, dest: Rect, pixels: &PixelBuffer);

    /// Sets the CSS minimum size in logical units.
    fn set_min_size(&mut self, size: Size);

    /// Forces the CSS width in logical units.
    fn set_forced_width(&mut self, width: f64);

    /// Forces the CSS height in logical units.
    fn set_forced_height(&mut self, height: f64);

    /// Applies (`Some`) or clears (`None`) the visual-scale compensation that
    /// makes a physical-size backing store occupy its logical footprint.
    fn set_visual_scale(&mut self, scale: Option<f64>);

    /// Returns the element's bounding rectangle in viewport coordinates of
    /// the scale-compensated document.
    ///
    /// The geometry pass converts this with
    /// [`Scale::viewport_rect_to_logical`](crate::scale::Scale::viewport_rect_to_logical).
    /// A backend that measures plain logical CSS boxes must map them with
    /// [`Scale::logical_to_viewport_rect`](crate::scale::Scale::logical_to_viewport_rect)
    /// so the reported geometry equals the CSS box.
    fn bounding_rect(&self) -> Rect;
}

/// The environment of the hosting view.
pub trait Viewport {
    /// Current device-pixel ratio.
    fn scale(&self) -> f64;

    /// Current document scroll offset.
    fn scroll_offset(&self) -> Vec2;
}

/// Outbound notifications to the host.
pub trait HostBridge {
    /// The overlay runtime is installed and ready for commands.
    fn ready(&mut self);

    /// New overlay elements were found. Never called with an empty batch.
    fn children_discovered(&mut self, batch: &[Discovered]);

    /// Overlay elements moved or resized. Never called with an empty batch.
    fn children_moved(&mut self, batch: &[Placement]);
}
