// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outbound notification payloads.
//!
//! Both notifications are batched: a discovery pass or geometry pass sends at
//! most one message, carrying every entry it produced.

use crate::child::ChildId;

/// Sentinel reported for an axis whose size the document author controls.
pub const AUTHOR_SIZED: f64 = -1.0;

/// A newly discovered overlay element.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Discovered {
    /// The element's id.
    pub id: ChildId,
    /// Whether the author sized either axis in CSS, in which case the host
    /// should follow the document's size rather than impose its own.
    pub use_dom_size: bool,
}

/// A child whose on-screen rectangle changed, in logical units.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Placement {
    /// The element's id.
    pub id: ChildId,
    /// Left edge relative to the viewport.
    pub x: f64,
    /// Top edge relative to the viewport.
    pub y: f64,
    /// Width, or [`AUTHOR_SIZED`].
    pub width: f64,
    /// Height, or [`AUTHOR_SIZED`].
    pub height: f64,
}
