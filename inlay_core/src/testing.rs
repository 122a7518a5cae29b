// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording doubles for the backend traits.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Rect, Size, Vec2};

use crate::backend::{HostBridge, OverlayElement, Viewport};
use crate::child::AuthoredSize;
use crate::draw::PixelBuffer;
use crate::message::{Discovered, Placement};
use crate::scale::PhysicalSize;

/// A style or surface mutation performed on a [`FakeElement`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Op {
    Display(String),
    Backing(PhysicalSize),
    Restore,
    Paint(Rect, u8),
    MinSize(Size),
    Width(f64),
    Height(f64),
    VisualScale(Option<f64>),
}

/// An in-memory overlay element.
///
/// Painted bitmaps are identified by their first byte, so tests can tell
/// draws apart by filling each payload with a distinct tag.
#[derive(Debug, Default)]
pub(crate) struct FakeElement {
    pub(crate) display: String,
    pub(crate) authored: AuthoredSize,
    pub(crate) backing: PhysicalSize,
    pub(crate) rect: Rect,
    pub(crate) painted: Vec<(Rect, u8)>,
    pub(crate) ops: Vec<Op>,
}

impl FakeElement {
    pub(crate) fn new(display: &str) -> Self {
        Self {
            display: String::from(display),
            ..Self::default()
        }
    }

    pub(crate) fn authored(mut self, width: bool, height: bool) -> Self {
        self.authored = AuthoredSize { width, height };
        self
    }

    pub(crate) fn at(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Tags painted so far, in paint order.
    pub(crate) fn paint_tags(&self) -> Vec<u8> {
        self.painted.iter().map(|(_, tag)| *tag).collect()
    }
}

impl OverlayElement for FakeElement {
    type Snapshot = Vec<(Rect, u8)>;

    fn display(&self) -> String {
        self.display.clone()
    }

    fn set_display(&mut self, value: &str) {
        self.display = String::from(value);
        self.ops.push(Op::Display(self.display.clone()));
    }

    fn authored_size(&self) -> AuthoredSize {
        self.authored
    }

    fn backing_size(&self) -> PhysicalSize {
        self.backing
    }

    fn set_backing_size(&mut self, size: PhysicalSize) {
        self.backing = size;
        self.painted.clear();
        self.ops.push(Op::Backing(size));
    }

    fn snapshot(&self) -> Option<Self::Snapshot> {
        (!self.backing.is_empty()).then(|| self.painted.clone())
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) {
        self.painted.clone_from(snapshot);
        self.ops.push(Op::Restore);
    }

    fn put_pixels(&mut self, dest: Rect, pixels: &PixelBuffer) {
        let tag = pixels.data().first().copied().unwrap_or(0);
        self.painted.push((dest, tag));
        self.ops.push(Op::Paint(dest, tag));
    }

    fn set_min_size(&mut self, size: Size) {
        self.ops.push(Op::MinSize(size));
    }

    fn set_forced_width(&mut self, width: f64) {
        self.ops.push(Op::Width(width));
    }

    fn set_forced_height(&mut self, height: f64) {
        self.ops.push(Op::Height(height));
    }

    fn set_visual_scale(&mut self, scale: Option<f64>) {
        self.ops.push(Op::VisualScale(scale));
    }

    fn bounding_rect(&self) -> Rect {
        self.rect
    }
}

/// A viewport with a fixed ratio and scroll offset.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FakeViewport {
    pub(crate) scale: f64,
    pub(crate) scroll: Vec2,
}

impl FakeViewport {
    pub(crate) fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            scroll: Vec2::ZERO,
        }
    }
}

impl Viewport for FakeViewport {
    fn scale(&self) -> f64 {
        self.scale
    }

    fn scroll_offset(&self) -> Vec2 {
        self.scroll
    }
}

/// A notification received by a [`RecordingBridge`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Sent {
    Ready,
    Discovered(Vec<Discovered>),
    Moved(Vec<Placement>),
}

/// A host bridge that records every notification.
#[derive(Debug, Default)]
pub(crate) struct RecordingBridge {
    pub(crate) sent: Vec<Sent>,
}

impl RecordingBridge {
    pub(crate) fn moved(&self) -> Vec<&[Placement]> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Moved(batch) => Some(batch.as_slice()),
                _ => None,
            })
            .collect()
    }
}

impl HostBridge for RecordingBridge {
    fn ready(&mut self) {
        self.sent.push(Sent::Ready);
    }

    fn children_discovered(&mut self, batch: &[Discovered]) {
        self.sent.push(Sent::Discovered(batch.to_vec()));
    }

    fn children_moved(&mut self, batch: &[Placement]) {
        self.sent.push(Sent::Moved(batch.to_vec()));
    }
}
