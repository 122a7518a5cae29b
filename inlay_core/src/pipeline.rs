// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw pipeline: resizing, painting, and showing a single child.
//!
//! A child is idle between commands. A resize cancels every pending draw,
//! resizes the backing store, and repaints what was there so the widget never
//! flashes empty. Draws are painted strictly in submission order (see
//! [`draw`](crate::draw)).

use alloc::vec::Vec;

use kurbo::Size;

use crate::backend::OverlayElement;
use crate::child::Child;
use crate::draw::{FetchError, RequestId};
use crate::scale::{PhysicalSize, Scale};

/// What a resize did.
#[derive(Debug)]
pub(crate) struct Resized {
    pub(crate) from: PhysicalSize,
    pub(crate) to: PhysicalSize,
    pub(crate) canceled: Vec<RequestId>,
    pub(crate) restored: bool,
}

impl<E: OverlayElement> Child<E> {
    /// Resizes the backing store to `size` (logical) and applies `min` as the
    /// CSS minimum size. Returns `None` without touching the element if the
    /// backing store already has the requested physical size.
    pub(crate) fn resize(&mut self, size: Size, min: Size, scale: Scale) -> Option<Resized> {
        let from = self.element.backing_size();
        let to = scale.to_physical_size(size);
        if from == to {
            return None;
        }

        let canceled = self.queue.cancel_all();

        let snapshot = if from.is_empty() {
            None
        } else {
            self.element.snapshot()
        };
        self.element.set_backing_size(to);
        self.size = to;
        if let Some(snapshot) = &snapshot {
            self.element.restore(snapshot);
        }

        self.element.set_min_size(min);
        if !self.authored.width {
            self.element.set_forced_width(min.width);
        }
        if !self.authored.height {
            self.element.set_forced_height(min.height);
        }
        self.element
            .set_visual_scale((!scale.is_identity()).then_some(scale.factor()));

        Some(Resized {
            from,
            to,
            canceled,
            restored: snapshot.is_some(),
        })
    }

    /// Paints every completed request at the head of the queue, stopping at
    /// the first pending one. Returns each drained request with whether it
    /// was painted.
    pub(crate) fn apply_ready(&mut self, scale: Scale) -> Vec<(RequestId, Result<(), FetchError>)> {
        let mut applied = Vec::new();
        for done in self.queue.drain_ready() {
            let painted = done.outcome.map(|pixels| {
                self.element
                    .put_pixels(scale.rect_to_physical(done.dest), &pixels);
            });
            applied.push((done.id, painted));
        }
        applied
    }

    /// Shows the element with its original display value, or hides it.
    pub(crate) fn set_visible(&mut self, visible: bool) {
        if visible {
            self.element.set_display(&self.saved_display);
        } else {
            self.element.set_display("none");
        }
    }
}
