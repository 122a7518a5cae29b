// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, each stamped with the time it was
//! received. Child ids are stored length-prefixed. [`decode`] reads the
//! records back as an iterator of [`Stamped`] events.

use std::time::Instant;

use inlay_core::draw::{FetchError, RequestId};
use inlay_core::scale::PhysicalSize;
use inlay_core::time::HostTime;
use inlay_core::trace::{
    DiscoveryEvent, DrawEvent, DrawStage, ForgetEvent, GeometryEvent, ResizeEvent, ThrottleEvent,
    TraceSink, VisibilityEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_DISCOVERY: u8 = 1;
const TAG_FORGET: u8 = 2;
const TAG_GEOMETRY: u8 = 3;
const TAG_THROTTLE: u8 = 4;
const TAG_RESIZE: u8 = 5;
const TAG_DRAW: u8 = 6;
const TAG_VISIBILITY: u8 = 7;

const STAGE_QUEUED: u8 = 0;
const STAGE_APPLIED: u8 = 1;
const STAGE_FAILED_TRANSPORT: u8 = 2;
const STAGE_FAILED_ABORTED: u8 = 3;
const STAGE_FAILED_SIZE: u8 = 4;
const STAGE_STALE: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes timestamped events into a compact binary
/// buffer.
pub struct RecorderSink {
    buf: Vec<u8>,
    clock: Box<dyn FnMut() -> HostTime>,
}

impl std::fmt::Debug for RecorderSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecorderSink")
            .field("bytes", &self.buf.len())
            .finish_non_exhaustive()
    }
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder whose timestamps count microseconds since
    /// its creation.
    #[must_use]
    pub fn new() -> Self {
        let origin = Instant::now();
        Self::with_clock(move || {
            HostTime(u64::try_from(origin.elapsed().as_micros()).unwrap_or(u64::MAX))
        })
    }

    /// Creates an empty recorder that stamps events with `clock`.
    #[must_use]
    pub fn with_clock(clock: impl FnMut() -> HostTime + 'static) -> Self {
        Self {
            buf: Vec::new(),
            clock: Box::new(clock),
        }
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn begin(&mut self, tag: u8) {
        let at = (self.clock)();
        self.write_u8(tag);
        self.write_u64(at.ticks());
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_count(&mut self, v: usize) {
        self.write_u64(u64::try_from(v).unwrap_or(u64::MAX));
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_size(&mut self, size: PhysicalSize) {
        self.write_u32(size.width);
        self.write_u32(size.height);
    }

    fn write_str(&mut self, s: &str) {
        let len = u32::try_from(s.len()).unwrap_or(u32::MAX);
        self.write_u32(len);
        self.buf.extend_from_slice(&s.as_bytes()[..len as usize]);
    }

    fn write_stage(&mut self, stage: DrawStage) {
        match stage {
            DrawStage::Queued => self.write_u8(STAGE_QUEUED),
            DrawStage::Applied => self.write_u8(STAGE_APPLIED),
            DrawStage::Failed(FetchError::Transport) => self.write_u8(STAGE_FAILED_TRANSPORT),
            DrawStage::Failed(FetchError::Aborted) => self.write_u8(STAGE_FAILED_ABORTED),
            DrawStage::Failed(FetchError::PayloadSize { expected, actual }) => {
                self.write_u8(STAGE_FAILED_SIZE);
                self.write_count(expected);
                self.write_count(actual);
            }
            DrawStage::Stale => self.write_u8(STAGE_STALE),
        }
    }
}

impl TraceSink for RecorderSink {
    fn on_discovery(&mut self, e: &DiscoveryEvent) {
        self.begin(TAG_DISCOVERY);
        self.write_count(e.discovered);
        self.write_count(e.duplicates);
    }

    fn on_forget(&mut self, e: &ForgetEvent<'_>) {
        self.begin(TAG_FORGET);
        self.write_str(e.child);
        self.write_count(e.canceled);
    }

    fn on_geometry(&mut self, e: &GeometryEvent) {
        self.begin(TAG_GEOMETRY);
        self.write_count(e.evaluated);
        self.write_count(e.changed);
        self.write_u64(e.scale.to_bits());
    }

    fn on_throttle(&mut self, e: &ThrottleEvent) {
        self.begin(TAG_THROTTLE);
        self.write_u64(e.deadline.ticks());
        self.write_bool(e.coalesced);
    }

    fn on_resize(&mut self, e: &ResizeEvent<'_>) {
        self.begin(TAG_RESIZE);
        self.write_str(e.child);
        self.write_size(e.from);
        self.write_size(e.to);
        self.write_count(e.canceled);
        self.write_bool(e.restored);
    }

    fn on_draw(&mut self, e: &DrawEvent<'_>) {
        self.begin(TAG_DRAW);
        self.write_str(e.child);
        self.write_u64(e.request.0);
        self.write_stage(e.stage);
    }

    fn on_visibility(&mut self, e: &VisibilityEvent<'_>) {
        self.begin(TAG_VISIBILITY);
        self.write_str(e.child);
        self.write_bool(e.visible);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`DiscoveryEvent`].
    Discovery(DiscoveryEvent),
    /// A [`ForgetEvent`].
    Forget {
        /// The child's id.
        child: String,
        /// Pending draws canceled with it.
        canceled: usize,
    },
    /// A [`GeometryEvent`].
    Geometry(GeometryEvent),
    /// A [`ThrottleEvent`].
    Throttle(ThrottleEvent),
    /// A [`ResizeEvent`].
    Resize {
        /// The child's id.
        child: String,
        /// Previous backing-store size.
        from: PhysicalSize,
        /// New backing-store size.
        to: PhysicalSize,
        /// Pending draws canceled by the resize.
        canceled: usize,
        /// Whether previous contents were repainted.
        restored: bool,
    },
    /// A [`DrawEvent`].
    Draw {
        /// The child's id.
        child: String,
        /// The request.
        request: RequestId,
        /// The transition.
        stage: DrawStage,
    },
    /// A [`VisibilityEvent`].
    Visibility {
        /// The child's id.
        child: String,
        /// New visibility.
        visible: bool,
    },
}

/// A decoded event and the time it was recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct Stamped {
    /// When the recorder received the event.
    pub at: HostTime,
    /// The event.
    pub event: RecordedEvent,
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Stamped`] events.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read_bytes(&mut self, n: usize) -> Option<&[u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.read_bytes(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.read_bytes(8)?.try_into().ok()?))
    }

    fn read_count(&mut self) -> Option<usize> {
        usize::try_from(self.read_u64()?).ok()
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_size(&mut self) -> Option<PhysicalSize> {
        Some(PhysicalSize::new(self.read_u32()?, self.read_u32()?))
    }

    fn read_str(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        String::from_utf8(self.read_bytes(len)?.to_vec()).ok()
    }

    fn read_stage(&mut self) -> Option<DrawStage> {
        Some(match self.read_u8()? {
            STAGE_QUEUED => DrawStage::Queued,
            STAGE_APPLIED => DrawStage::Applied,
            STAGE_FAILED_TRANSPORT => DrawStage::Failed(FetchError::Transport),
            STAGE_FAILED_ABORTED => DrawStage::Failed(FetchError::Aborted),
            STAGE_FAILED_SIZE => DrawStage::Failed(FetchError::PayloadSize {
                expected: self.read_count()?,
                actual: self.read_count()?,
            }),
            STAGE_STALE => DrawStage::Stale,
            _ => return None,
        })
    }

    fn decode_event(&mut self, tag: u8) -> Option<RecordedEvent> {
        Some(match tag {
            TAG_DISCOVERY => RecordedEvent::Discovery(DiscoveryEvent {
                discovered: self.read_count()?,
                duplicates: self.read_count()?,
            }),
            TAG_FORGET => RecordedEvent::Forget {
                child: self.read_str()?,
                canceled: self.read_count()?,
            },
            TAG_GEOMETRY => RecordedEvent::Geometry(GeometryEvent {
                evaluated: self.read_count()?,
                changed: self.read_count()?,
                scale: f64::from_bits(self.read_u64()?),
            }),
            TAG_THROTTLE => RecordedEvent::Throttle(ThrottleEvent {
                deadline: HostTime(self.read_u64()?),
                coalesced: self.read_bool()?,
            }),
            TAG_RESIZE => RecordedEvent::Resize {
                child: self.read_str()?,
                from: self.read_size()?,
                to: self.read_size()?,
                canceled: self.read_count()?,
                restored: self.read_bool()?,
            },
            TAG_DRAW => RecordedEvent::Draw {
                child: self.read_str()?,
                request: RequestId(self.read_u64()?),
                stage: self.read_stage()?,
            },
            TAG_VISIBILITY => RecordedEvent::Visibility {
                child: self.read_str()?,
                visible: self.read_bool()?,
            },
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Stamped;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let at = HostTime(self.read_u64()?);
        // Unknown tags or truncated records end the iteration.
        let event = self.decode_event(tag)?;
        Some(Stamped { at, event })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
