// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The overlay context object.
//!
//! [`Overlay`] owns the child registry, the geometry rate limiter, and every
//! child's draw queue. Its lifetime is the hosting view's: create one when the
//! document's runtime is installed, call [`teardown`](Overlay::teardown) when
//! the view goes away.
//!
//! All methods run to completion on the caller's thread. The only
//! asynchronous step, fetching pixel payloads, is left to the backend: a
//! [`draw`](Overlay::draw) returns a [`FetchTicket`] and the backend reports
//! the outcome with [`complete_draw`](Overlay::complete_draw).

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Rect, Size};

use crate::backend::{HostBridge, OverlayElement, Viewport};
use crate::child::{Child, ChildId};
use crate::config::OverlayConfig;
use crate::detect::{self, Candidate, Mutation};
use crate::draw::{FetchError, PixelBuffer, RequestId};
use crate::geometry;
use crate::message::Discovered;
use crate::registry::ChildRegistry;
use crate::scale::Scale;
use crate::throttle::{Attempt, RateLimiter};
use crate::time::HostTime;
use crate::trace::{
    DiscoveryEvent, DrawEvent, DrawStage, ForgetEvent, ResizeEvent, ThrottleEvent, TraceSink,
    Tracer, VisibilityEvent,
};

/// A pixel fetch the backend must perform for a queued draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    /// The child the pixels are for.
    pub child: ChildId,
    /// The queued request.
    pub request: RequestId,
    /// Host-assigned image id; empty for "current contents".
    pub image_id: String,
    /// Expected bitmap width in pixels.
    pub width: u32,
    /// Expected bitmap height in pixels.
    pub height: u32,
}

impl FetchTicket {
    /// Builds the payload URI: `<scheme><child>` followed by `?<image>` when
    /// the image id is non-empty.
    #[must_use]
    pub fn uri(&self, scheme: &str) -> String {
        if self.image_id.is_empty() {
            format!("{scheme}{}", self.child)
        } else {
            format!("{scheme}{}?{}", self.child, self.image_id)
        }
    }

    /// Number of payload bytes the fetch must yield.
    #[must_use]
    pub fn expected_len(&self) -> Option<usize> {
        PixelBuffer::byte_len(self.width, self.height)
    }
}

/// Overlay state for one hosting view.
#[derive(Debug)]
pub struct Overlay<E> {
    config: OverlayConfig,
    registry: ChildRegistry<E>,
    limiter: RateLimiter,
    next_request: u64,
    ready_sent: bool,
    tracer: Tracer,
}

impl<E: OverlayElement> Overlay<E> {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            limiter: RateLimiter::new(config.throttle_window),
            config,
            registry: ChildRegistry::new(),
            next_request: 1,
            ready_sent: false,
            tracer: Tracer::none(),
        }
    }

    /// Installs a trace sink. Events are only delivered with the `trace`
    /// feature enabled.
    pub fn set_trace_sink(&mut self, sink: alloc::boxed::Box<dyn TraceSink>) {
        self.tracer.set_sink(sink);
    }

    /// The configuration this overlay was created with.
    #[must_use]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Number of tracked children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` if no child is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Looks up a tracked child.
    #[must_use]
    pub fn child(&self, id: &str) -> Option<&Child<E>> {
        self.registry.get(id)
    }

    /// Iterates tracked child ids in order.
    pub fn child_ids(&self) -> impl Iterator<Item = &ChildId> {
        self.registry.iter().map(Child::id)
    }

    /// Sends the one-time ready notification. Later calls do nothing.
    pub fn ready(&mut self, bridge: &mut impl HostBridge) {
        if !self.ready_sent {
            self.ready_sent = true;
            bridge.ready();
        }
    }

    // -- Change detection ------------------------------------------------------

    /// Adopts newly inserted overlay elements.
    ///
    /// Sends one discovery notification for the whole batch if anything was
    /// adopted. Returns `true` in that case.
    pub fn discover(
        &mut self,
        candidates: impl IntoIterator<Item = Candidate<E>>,
        bridge: &mut impl HostBridge,
    ) -> bool {
        let (batch, event) = detect::adopt(&mut self.registry, candidates);
        self.tracer.discovery(&event);
        if batch.is_empty() {
            return false;
        }
        bridge.children_discovered(&batch);
        true
    }

    /// Drops a child whose element left the document.
    ///
    /// Returns the pending draws that were canceled so their fetches can be
    /// aborted. Unknown ids yield nothing.
    pub fn forget(&mut self, id: &str) -> Vec<RequestId> {
        let Some(mut child) = self.registry.remove(id) else {
            return Vec::new();
        };
        let canceled = child.queue.cancel_all();
        self.tracer.forget(&ForgetEvent {
            child: id,
            canceled: canceled.len(),
        });
        canceled
    }

    /// Handles one mutation callback, then requests a geometry pass.
    ///
    /// Changes are applied in record order: an insertion adopts the element,
    /// a removal forgets it (and drops it from this callback's discovery
    /// batch if it was adopted earlier in the same callback). The discovery
    /// notification (if any) is sent once, before the geometry notification
    /// triggered by the same callback. Returns the geometry request outcome
    /// and the draws canceled by removals.
    pub fn on_mutations(
        &mut self,
        changes: impl IntoIterator<Item = Mutation<E>>,
        now: HostTime,
        viewport: &impl Viewport,
        bridge: &mut impl HostBridge,
    ) -> (Attempt, Vec<RequestId>) {
        let mut batch: Vec<Discovered> = Vec::new();
        let mut duplicates = 0;
        let mut canceled = Vec::new();
        for change in changes {
            match change {
                Mutation::Inserted(candidate) => {
                    match detect::adopt_one(&mut self.registry, candidate) {
                        Some(entry) => batch.push(entry),
                        None => duplicates += 1,
                    }
                }
                Mutation::Removed(id) => {
                    batch.retain(|entry| entry.id != id);
                    canceled.extend(self.forget(id.as_str()));
                }
            }
        }

        self.tracer.discovery(&DiscoveryEvent {
            discovered: batch.len(),
            duplicates,
        });
        if !batch.is_empty() {
            bridge.children_discovered(&batch);
        }
        let attempt = self.request_geometry(now, viewport, bridge);
        (attempt, canceled)
    }

    // -- Geometry tracking -----------------------------------------------------

    /// Runs a geometry pass now, bypassing the rate limiter.
    ///
    /// Sends one notification with every child whose rectangle changed, or
    /// nothing if none did. Returns the number of changed children.
    pub fn update_geometry(
        &mut self,
        viewport: &impl Viewport,
        bridge: &mut impl HostBridge,
    ) -> usize {
        let (placements, event) = geometry::measure(&mut self.registry, viewport);
        self.tracer.geometry(&event);
        if !placements.is_empty() {
            bridge.children_moved(&placements);
        }
        placements.len()
    }

    /// Requests a rate-limited geometry pass.
    ///
    /// Runs the pass immediately when the limiter is idle. Otherwise the
    /// caller must arm a timer for [`Attempt::Scheduled`] and call
    /// [`fire_geometry_timer`](Self::fire_geometry_timer) when it expires;
    /// [`Attempt::Coalesced`] means such a timer is already armed.
    pub fn request_geometry(
        &mut self,
        now: HostTime,
        viewport: &impl Viewport,
        bridge: &mut impl HostBridge,
    ) -> Attempt {
        let attempt = self.limiter.attempt(now);
        match attempt {
            Attempt::RunNow => {
                self.update_geometry(viewport, bridge);
            }
            Attempt::Scheduled(deadline) => self.tracer.throttle(&ThrottleEvent {
                deadline,
                coalesced: false,
            }),
            Attempt::Coalesced(deadline) => self.tracer.throttle(&ThrottleEvent {
                deadline,
                coalesced: true,
            }),
        }
        attempt
    }

    /// Runs the trailing geometry pass when its timer expires. Returns
    /// `false` if the pass had been canceled.
    pub fn fire_geometry_timer(
        &mut self,
        now: HostTime,
        viewport: &impl Viewport,
        bridge: &mut impl HostBridge,
    ) -> bool {
        if !self.limiter.fire(now) {
            return false;
        }
        self.update_geometry(viewport, bridge);
        true
    }

    /// When the scheduled trailing geometry pass is due, if any.
    #[must_use]
    pub fn geometry_deadline(&self) -> Option<HostTime> {
        self.limiter.deadline()
    }

    // -- Host commands ---------------------------------------------------------

    /// Resizes a child's backing store to `width` × `height` logical units
    /// and sets its CSS minimum size.
    ///
    /// Does nothing for unknown children or when the physical backing-store
    /// size would not change. Otherwise every pending draw for the child is
    /// canceled; their ids are returned so the fetches can be aborted.
    pub fn resize(
        &mut self,
        id: &str,
        width: f64,
        height: f64,
        min_width: f64,
        min_height: f64,
        viewport: &impl Viewport,
    ) -> Vec<RequestId> {
        let Some(child) = self.registry.get_mut(id) else {
            return Vec::new();
        };
        let scale = Scale::new(viewport.scale());
        let Some(resized) = child.resize(
            Size::new(width, height),
            Size::new(min_width, min_height),
            scale,
        ) else {
            return Vec::new();
        };
        self.tracer.resize(&ResizeEvent {
            child: id,
            from: resized.from,
            to: resized.to,
            canceled: resized.canceled.len(),
            restored: resized.restored,
        });
        resized.canceled
    }

    /// Queues a paint of image `image_id` into a child at the logical
    /// rectangle `(x, y, width, height)`.
    ///
    /// Returns `None` for unknown children. Otherwise the request is already
    /// at the tail of the child's queue and the backend must fetch the
    /// ticket's payload and report it via
    /// [`complete_draw`](Self::complete_draw).
    pub fn draw(
        &mut self,
        id: &str,
        image_id: &str,
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    ) -> Option<FetchTicket> {
        let child = self.registry.get_mut(id)?;
        let request = RequestId(self.next_request);
        self.next_request += 1;

        let dest = Rect::from_origin_size((x, y), (f64::from(width), f64::from(height)));
        child.queue.push_pending(request, dest);
        self.tracer.draw(&DrawEvent {
            child: id,
            request,
            stage: DrawStage::Queued,
        });

        Some(FetchTicket {
            child: child.id.clone(),
            request,
            image_id: String::from(image_id),
            width,
            height,
        })
    }

    /// Records the outcome of a ticket's fetch and paints whatever is now
    /// unblocked at the head of the child's queue.
    ///
    /// A payload whose length is not `width * height * 4` counts as a failed
    /// fetch. Outcomes for canceled requests or forgotten children are
    /// ignored. Returns the number of requests painted.
    pub fn complete_draw(
        &mut self,
        ticket: &FetchTicket,
        payload: Result<Vec<u8>, FetchError>,
        viewport: &impl Viewport,
    ) -> usize {
        let id = ticket.child.as_str();
        let stale = DrawEvent {
            child: id,
            request: ticket.request,
            stage: DrawStage::Stale,
        };
        let Some(child) = self.registry.get_mut(id) else {
            self.tracer.draw(&stale);
            return 0;
        };

        let outcome =
            payload.and_then(|bytes| PixelBuffer::new(ticket.width, ticket.height, bytes));
        if !child.queue.complete(ticket.request, outcome) {
            self.tracer.draw(&stale);
            return 0;
        }

        let scale = Scale::new(viewport.scale());
        let mut painted = 0;
        for (request, result) in child.apply_ready(scale) {
            let stage = match result {
                Ok(()) => {
                    painted += 1;
                    DrawStage::Applied
                }
                Err(err) => DrawStage::Failed(err),
            };
            self.tracer.draw(&DrawEvent {
                child: id,
                request,
                stage,
            });
        }
        painted
    }

    /// Shows or hides a child. Unknown ids are ignored.
    pub fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(child) = self.registry.get_mut(id) {
            child.set_visible(visible);
            self.tracer.visibility(&VisibilityEvent { child: id, visible });
        }
    }

    /// Initializes a freshly discovered child: resize, then show or hide.
    ///
    /// Returns the draws canceled by the resize.
    pub fn init_child(
        &mut self,
        id: &str,
        width: f64,
        height: f64,
        min_width: f64,
        min_height: f64,
        visible: bool,
        viewport: &impl Viewport,
    ) -> Vec<RequestId> {
        let canceled = self.resize(id, width, height, min_width, min_height, viewport);
        self.set_visible(id, visible);
        canceled
    }

    // -- Lifecycle ---------------------------------------------------------------

    /// Cancels every pending draw, drops the scheduled geometry pass, and
    /// forgets all children.
    ///
    /// Returns every canceled request so the backend can abort the fetches.
    pub fn teardown(&mut self) -> Vec<(ChildId, RequestId)> {
        self.limiter.cancel();
        let mut canceled = Vec::new();
        for mut child in self.registry.drain() {
            let pending = child.queue.cancel_all();
            self.tracer.forget(&ForgetEvent {
                child: child.id.as_str(),
                canceled: pending.len(),
            });
            canceled.extend(pending.into_iter().map(|req| (child.id.clone(), req)));
        }
        canceled
    }
}
