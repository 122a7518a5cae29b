// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry tracking: measuring children and diffing against the last report.

use alloc::vec::Vec;

use crate::backend::{OverlayElement, Viewport};
use crate::message::{AUTHOR_SIZED, Placement};
use crate::registry::ChildRegistry;
use crate::scale::Scale;
use crate::trace::GeometryEvent;

/// Measures every child and returns placements for those whose logical
/// rectangle differs from the cached one.
///
/// A rectangle counts as changed unless all four components are exactly
/// equal to the cached values. Cached rectangles are updated in place.
pub(crate) fn measure<E: OverlayElement>(
    registry: &mut ChildRegistry<E>,
    viewport: &impl Viewport,
) -> (Vec<Placement>, GeometryEvent) {
    let scale = Scale::new(viewport.scale());
    let scroll = viewport.scroll_offset();
    let mut placements = Vec::new();
    let mut evaluated = 0;

    for child in registry.iter_mut() {
        evaluated += 1;
        let rect = scale.viewport_rect_to_logical(child.element.bounding_rect(), scroll);
        if child.last_rect == Some(rect) {
            continue;
        }
        child.last_rect = Some(rect);

        placements.push(Placement {
            id: child.id.clone(),
            x: rect.x0,
            y: rect.y0,
            width: if child.authored.width {
                AUTHOR_SIZED
            } else {
                rect.width()
            },
            height: if child.authored.height {
                AUTHOR_SIZED
            } else {
                rect.height()
            },
        });
    }

    let event = GeometryEvent {
        evaluated,
        changed: placements.len(),
        scale: scale.factor(),
    };
    (placements, event)
}
