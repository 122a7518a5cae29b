// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document mutation subscription.
//!
//! [`DocumentObserver`] watches a whole subtree for inserted and removed
//! nodes and turns each callback invocation into one [`MutationBatch`].
//! Inserted nodes are inspected themselves, not their descendants. A removed
//! node takes every overlay element inside it along, so removals also search
//! the detached subtree.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use inlay_core::child::ChildId;
use inlay_core::config::OverlayConfig;
use inlay_core::detect::{Candidate, Mutation};
use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{
    Document, Element, HtmlCanvasElement, MutationObserver, MutationObserverInit, MutationRecord,
    Node, NodeList,
};

use crate::canvas::CanvasElement;

/// The overlay-relevant content of one mutation callback.
#[derive(Debug, Default)]
pub struct MutationBatch {
    /// Insertions and removals of overlay elements, in record order.
    pub changes: Vec<Mutation<CanvasElement>>,
}

impl MutationBatch {
    /// Returns `true` if the batch carries nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    fn insert(&mut self, el: Element) {
        let id = el.id();
        if let Ok(canvas) = el.dyn_into::<HtmlCanvasElement>() {
            self.changes
                .push(Mutation::Inserted(Candidate::new(id, CanvasElement::new(canvas))));
        }
    }
}

type ObserverClosure = Closure<dyn FnMut(Array, MutationObserver)>;

/// A live `MutationObserver` subscription. Dropping it disconnects.
pub struct DocumentObserver {
    observer: MutationObserver,
    _closure: ObserverClosure,
}

impl core::fmt::Debug for DocumentObserver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DocumentObserver").finish_non_exhaustive()
    }
}

impl DocumentObserver {
    /// Starts observing `target` and its whole subtree.
    ///
    /// `on_batch` runs once per callback with the nodes accepted by
    /// `config`, even if none were; a layout change can accompany any
    /// mutation.
    pub fn observe(
        target: &Node,
        config: OverlayConfig,
        mut on_batch: impl FnMut(MutationBatch) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(move |records: Array, _: MutationObserver| {
            on_batch(collect(&config, &records));
        }) as Box<dyn FnMut(Array, MutationObserver)>);

        let observer = MutationObserver::new(closure.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        init.set_attributes(true);
        observer.observe_with_options(target, &init)?;

        Ok(Self {
            observer,
            _closure: closure,
        })
    }

    /// Stops delivering callbacks. Queued records are discarded.
    pub fn disconnect(&self) {
        self.observer.disconnect();
    }
}

impl Drop for DocumentObserver {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Extracts overlay elements from a list of mutation records.
pub(crate) fn collect(config: &OverlayConfig, records: &Array) -> MutationBatch {
    let mut batch = MutationBatch::default();
    for record in records.iter() {
        let record: MutationRecord = record.unchecked_into();
        if record.type_() != "childList" {
            continue;
        }
        for id in removed_ids(config, &record.removed_nodes()) {
            batch.changes.push(Mutation::Removed(ChildId::new(id)));
        }
        for el in overlay_elements(config, &record.added_nodes()) {
            batch.insert(el);
        }
    }
    batch
}

/// Collects overlay elements already in the document, which no mutation
/// record will ever report.
pub(crate) fn existing(config: &OverlayConfig, root: &Document) -> MutationBatch {
    let mut batch = MutationBatch::default();
    let Ok(nodes) = root.query_selector_all(&selector(config)) else {
        return batch;
    };
    for el in overlay_elements(config, &nodes) {
        batch.insert(el);
    }
    batch
}

/// Ids of the overlay elements that left the document with `nodes`: each
/// removed node itself, then its descendants in tree order.
pub(crate) fn removed_ids(config: &OverlayConfig, nodes: &NodeList) -> Vec<String> {
    let selector = selector(config);
    let mut ids = Vec::new();
    for i in 0..nodes.length() {
        let Some(root) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        if accepted(config, &root) {
            ids.push(root.id());
        }
        if let Ok(inner) = root.query_selector_all(&selector) {
            ids.extend(overlay_elements(config, &inner).map(|el| el.id()));
        }
    }
    ids
}

fn selector(config: &OverlayConfig) -> String {
    alloc::format!("{}.{}", config.element_tag, config.marker_class)
}

fn accepted(config: &OverlayConfig, el: &Element) -> bool {
    config.accepts(
        &el.id(),
        &el.tag_name(),
        el.class_list().contains(config.marker_class),
    )
}

fn overlay_elements<'a>(
    config: &'a OverlayConfig,
    nodes: &'a NodeList,
) -> impl Iterator<Item = Element> + 'a {
    (0..nodes.length())
        .filter_map(|i| nodes.item(i)?.dyn_into::<Element>().ok())
        .filter(|el| accepted(config, el))
}
