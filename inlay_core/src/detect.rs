// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change detection: adopting newly inserted overlay elements.
//!
//! The backend subscribes to document mutations, filters inserted nodes with
//! [`OverlayConfig::accepts`](crate::config::OverlayConfig::accepts), and
//! hands the survivors over as [`Candidate`]s. Removed nodes are reported by
//! id so their children can be forgotten; both arrive as [`Mutation`]s in
//! record order.

use alloc::vec::Vec;

use crate::backend::OverlayElement;
use crate::child::{Child, ChildId};
use crate::message::Discovered;
use crate::registry::ChildRegistry;
use crate::scale::PhysicalSize;
use crate::trace::DiscoveryEvent;

/// An inserted element that passed the overlay filter.
#[derive(Debug)]
pub struct Candidate<E> {
    /// The element's `id` attribute.
    pub id: ChildId,
    /// The element itself.
    pub element: E,
}

impl<E> Candidate<E> {
    /// Pairs an id with its element.
    pub fn new(id: impl Into<ChildId>, element: E) -> Self {
        Self {
            id: id.into(),
            element,
        }
    }
}

/// One overlay-relevant change from a mutation callback.
///
/// Changes are applied in record order, so an element inserted and removed
/// within the same callback is never left registered, and an element moved
/// elsewhere in the document (removed, then inserted) is adopted afresh.
#[derive(Debug)]
pub enum Mutation<E> {
    /// An overlay element entered the document.
    Inserted(Candidate<E>),
    /// The overlay element with this id left the document.
    Removed(ChildId),
}

/// Registers a candidate unless its id is already known.
///
/// The adopted element is hidden and its surface zeroed so nothing shows
/// before the host sizes and places it. Returns `None` for duplicates.
pub(crate) fn adopt_one<E: OverlayElement>(
    registry: &mut ChildRegistry<E>,
    candidate: Candidate<E>,
) -> Option<Discovered> {
    let Candidate { id, mut element } = candidate;
    if registry.contains(id.as_str()) {
        return None;
    }

    let saved_display = element.display();
    element.set_display("none");
    element.set_backing_size(PhysicalSize::EMPTY);
    let authored = element.authored_size();

    let entry = Discovered {
        id: id.clone(),
        use_dom_size: authored.any(),
    };
    registry
        .insert(Child::new(id, element, authored, saved_display))
        .ok()
        .map(|_| entry)
}

/// Registers every candidate whose id is not yet known. Returns the
/// discovery batch in candidate order.
pub(crate) fn adopt<E: OverlayElement>(
    registry: &mut ChildRegistry<E>,
    candidates: impl IntoIterator<Item = Candidate<E>>,
) -> (Vec<Discovered>, DiscoveryEvent) {
    let mut batch = Vec::new();
    let mut duplicates = 0;

    for candidate in candidates {
        match adopt_one(registry, candidate) {
            Some(entry) => batch.push(entry),
            None => duplicates += 1,
        }
    }

    let event = DiscoveryEvent {
        discovered: batch.len(),
        duplicates,
    };
    (batch, event)
}
