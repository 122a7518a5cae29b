// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element overlay state.

use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;

use kurbo::Rect;

use crate::draw::DrawQueue;
use crate::scale::PhysicalSize;

/// The externally assigned identifier of an overlay element.
///
/// Taken from the element's `id` attribute at discovery time and never
/// changed afterwards.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct ChildId(String);

impl ChildId {
    /// Creates an id from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ChildId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChildId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ChildId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Debug for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChildId({:?})", self.0)
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which axes of an element the document author sized explicitly in CSS.
///
/// An author-sized axis is left alone by resizes and reported as `-1` in
/// geometry notifications.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AuthoredSize {
    /// The author set a non-`auto` CSS width.
    pub width: bool,
    /// The author set a non-`auto` CSS height.
    pub height: bool,
}

impl AuthoredSize {
    /// Returns `true` if the author controls either axis.
    #[inline]
    #[must_use]
    pub const fn any(self) -> bool {
        self.width || self.height
    }
}

/// One tracked overlay element.
///
/// Discovery fields (`id`, `authored`, `saved_display`) are written once by
/// the change detector. The geometry tracker owns `last_rect`; the draw
/// pipeline owns `size` and `queue`.
#[derive(Debug)]
pub struct Child<E> {
    pub(crate) id: ChildId,
    pub(crate) element: E,
    pub(crate) authored: AuthoredSize,
    pub(crate) saved_display: String,
    pub(crate) size: PhysicalSize,
    pub(crate) last_rect: Option<Rect>,
    pub(crate) queue: DrawQueue,
}

impl<E> Child<E> {
    pub(crate) fn new(id: ChildId, element: E, authored: AuthoredSize, saved_display: String) -> Self {
        Self {
            id,
            element,
            authored,
            saved_display,
            size: PhysicalSize::EMPTY,
            last_rect: None,
            queue: DrawQueue::new(),
        }
    }

    /// Returns the child's identifier.
    #[must_use]
    pub fn id(&self) -> &ChildId {
        &self.id
    }

    /// Returns the backing element.
    #[must_use]
    pub fn element(&self) -> &E {
        &self.element
    }

    /// Returns which axes the author sized in CSS.
    #[must_use]
    pub fn authored(&self) -> AuthoredSize {
        self.authored
    }

    /// Returns the display value the element had before it was hidden.
    #[must_use]
    pub fn saved_display(&self) -> &str {
        &self.saved_display
    }

    /// Returns the last backing-store size set by a resize.
    #[must_use]
    pub fn size(&self) -> PhysicalSize {
        self.size
    }

    /// Returns the last reported rectangle in logical units, if measured.
    #[must_use]
    pub fn last_rect(&self) -> Option<Rect> {
        self.last_rect
    }

    /// Returns the number of draw requests still queued.
    #[must_use]
    pub fn pending_draws(&self) -> usize {
        self.queue.len()
    }
}
