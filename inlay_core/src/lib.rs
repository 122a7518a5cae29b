// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry sync and ordered drawing for native widgets overlaid on web
//! documents.
//!
//! A document marks regions with placeholder elements; a native backend owns
//! the real widgets. `inlay_core` keeps the two in step: it discovers
//! placeholders, reports their on-screen geometry to the host, and paints
//! host-supplied bitmaps into them in the order the host asked for. It is
//! `no_std` compatible (with `alloc`) and never touches a document directly;
//! backends supply the DOM through the traits in [`backend`].
//!
//! # Architecture
//!
//! ```text
//!   document mutations ──► Overlay::discover() ──► children_discovered
//!                                 │
//!   scroll / resize ──────────────┤
//!                                 ▼
//!                 Overlay::request_geometry() ──► RateLimiter
//!                                 │
//!                                 ▼
//!                 Overlay::update_geometry() ──► children_moved
//!
//!   host: resize ──► cancel queue, resize backing store, repaint snapshot
//!   host: draw ────► DrawQueue (pending) ──► FetchTicket ──► backend fetch
//!                                                                 │
//!                 Overlay::complete_draw() ◄──────────────────────┘
//!                                 │
//!                                 ▼
//!                 paint head-first, stall at first pending
//! ```
//!
//! **[`overlay`]**: The [`Overlay`](overlay::Overlay) context object that
//! owns all state for one hosting view.
//!
//! **[`registry`]** and **[`child`]**: Tracked overlay elements keyed by id.
//!
//! **[`detect`]**: Adoption of newly inserted elements.
//!
//! **[`draw`]**: Per-child FIFO of in-flight fetches with strict
//! submission-order application.
//!
//! **[`throttle`]**: Trailing-edge rate limiter for geometry passes.
//!
//! **[`scale`]**: Logical/physical unit conversion.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `serde` (disabled by default): Derives `Serialize` for notification
//!   payloads.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod child;
pub mod config;
pub mod detect;
pub mod draw;
mod geometry;
pub mod message;
pub mod overlay;
mod pipeline;
pub mod registry;
pub mod scale;
pub mod throttle;
pub mod time;
pub mod trace;

#[cfg(test)]
mod testing;
