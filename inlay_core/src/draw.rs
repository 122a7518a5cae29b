// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-child ordered queue of in-flight pixel fetches.
//!
//! Every `draw` command becomes a [`DrawRequest`] pushed onto its child's
//! [`DrawQueue`] *before* the fetch is issued, so queue order is submission
//! order. Fetches complete in arbitrary order; completions only record their
//! outcome. [`DrawQueue::drain_ready`] then yields requests from the head
//! while the head has completed:
//!
//! ```text
//!   head                               tail
//!   [ Ready | Ready | Pending | Ready | Pending ]
//!     ^^^^^^^^^^^^^   stall here: the third request
//!     yielded         blocks everything behind it
//! ```
//!
//! The stall-on-gap rule is the queue's invariant: a request is never applied
//! while an older request for the same child is still pending. Cancellation
//! ([`DrawQueue::cancel_all`]) removes every entry, so a late completion for a
//! canceled request finds nothing to update and is dropped.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

/// Identifies one draw request across an overlay's lifetime.
///
/// Ids increase monotonically and are never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({})", self.0)
    }
}

/// Why a fetch produced no paintable pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchError {
    /// The underlying transport failed or returned no payload.
    Transport,
    /// The fetch was aborted before completing.
    Aborted,
    /// The payload was not exactly `width * height * 4` bytes.
    PayloadSize {
        /// Byte length implied by the requested dimensions.
        expected: usize,
        /// Byte length actually received.
        actual: usize,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => f.write_str("pixel fetch failed"),
            Self::Aborted => f.write_str("pixel fetch aborted"),
            Self::PayloadSize { expected, actual } => write!(
                f,
                "pixel payload is {actual} bytes, expected {expected}"
            ),
        }
    }
}

impl core::error::Error for FetchError {}

/// A tightly packed, row-major RGBA8 bitmap.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps `data` as a `width` × `height` bitmap.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::PayloadSize`] if `data` is not exactly
    /// `width * height * 4` bytes long.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FetchError> {
        let expected = Self::byte_len(width, height);
        if expected != Some(data.len()) {
            return Err(FetchError::PayloadSize {
                expected: expected.unwrap_or(usize::MAX),
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Number of bytes a `width` × `height` RGBA8 bitmap occupies, or `None`
    /// on overflow.
    #[must_use]
    pub fn byte_len(width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)
    }

    /// Bitmap width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Bitmap height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw RGBA bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer and returns the raw RGBA bytes.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data_len", &self.data.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
enum DrawState {
    Pending,
    Done(Result<PixelBuffer, FetchError>),
}

/// One pixel fetch in flight for a child.
#[derive(Debug)]
pub struct DrawRequest {
    id: RequestId,
    dest: Rect,
    state: DrawState,
}

impl DrawRequest {
    /// The request's id.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Destination rectangle in logical units.
    #[must_use]
    pub fn dest(&self) -> Rect {
        self.dest
    }

    /// Returns `true` while the fetch has not completed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, DrawState::Pending)
    }
}

/// A request popped from the head of a [`DrawQueue`] after completing.
#[derive(Debug)]
pub struct CompletedDraw {
    /// The request's id.
    pub id: RequestId,
    /// Destination rectangle in logical units.
    pub dest: Rect,
    /// The decoded bitmap, or why there is none.
    pub outcome: Result<PixelBuffer, FetchError>,
}

/// FIFO of draw requests for a single child.
#[derive(Debug, Default)]
pub struct DrawQueue {
    entries: VecDeque<DrawRequest>,
}

impl DrawQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued requests, pending or completed-but-blocked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates queued requests from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &DrawRequest> {
        self.entries.iter()
    }

    /// Appends a pending request at the tail.
    pub fn push_pending(&mut self, id: RequestId, dest: Rect) {
        debug_assert!(
            self.entries.back().is_none_or(|last| last.id < id),
            "request ids must increase"
        );
        self.entries.push_back(DrawRequest {
            id,
            dest,
            state: DrawState::Pending,
        });
    }

    /// Removes every queued request and returns the ids of those whose fetch
    /// is still pending, so the caller can abort them.
    pub fn cancel_all(&mut self) -> Vec<RequestId> {
        self.entries
            .drain(..)
            .filter(DrawRequest::is_pending)
            .map(|req| req.id)
            .collect()
    }

    /// Records the outcome of a fetch.
    ///
    /// Returns `false` if no pending request with that id is queued (it was
    /// canceled, or already completed); the outcome is then dropped.
    pub fn complete(&mut self, id: RequestId, outcome: Result<PixelBuffer, FetchError>) -> bool {
        match self.entries.iter_mut().find(|req| req.id == id) {
            Some(req) if req.is_pending() => {
                req.state = DrawState::Done(outcome);
                true
            }
            _ => false,
        }
    }

    /// Pops completed requests from the head, stopping at the first one that
    /// is still pending.
    pub fn drain_ready(&mut self) -> DrainReady<'_> {
        DrainReady { queue: self }
    }
}

/// Iterator returned by [`DrawQueue::drain_ready`].
#[derive(Debug)]
pub struct DrainReady<'a> {
    queue: &'a mut DrawQueue,
}

impl Iterator for DrainReady<'_> {
    type Item = CompletedDraw;

    fn next(&mut self) -> Option<CompletedDraw> {
        if self.queue.entries.front()?.is_pending() {
            return None;
        }
        let req = self.queue.entries.pop_front()?;
        match req.state {
            DrawState::Done(outcome) => Some(CompletedDraw {
                id: req.id,
                dest: req.dest,
                outcome,
            }),
            DrawState::Pending => unreachable!("head checked above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn pixels(tag: u8) -> PixelBuffer {
        PixelBuffer::new(1, 1, vec![tag; 4]).unwrap()
    }

    fn rect() -> Rect {
        Rect::new(0.0, 0.0, 1.0, 1.0)
    }

    fn ids(drained: DrainReady<'_>) -> Vec<u64> {
        drained.map(|d| d.id.0).collect()
    }

    #[test]
    fn payload_length_is_checked() {
        assert!(PixelBuffer::new(2, 3, vec![0; 24]).is_ok());
        assert_eq!(
            PixelBuffer::new(2, 3, vec![0; 23]),
            Err(FetchError::PayloadSize {
                expected: 24,
                actual: 23
            })
        );
        assert_eq!(PixelBuffer::byte_len(0, 10), Some(0));
    }

    #[test]
    fn out_of_order_completions_apply_in_submission_order() {
        let mut q = DrawQueue::new();
        for id in 1..=3 {
            q.push_pending(RequestId(id), rect());
        }

        assert!(q.complete(RequestId(2), Ok(pixels(2))));
        assert!(ids(q.drain_ready()).is_empty(), "head still pending");

        assert!(q.complete(RequestId(3), Ok(pixels(3))));
        assert!(ids(q.drain_ready()).is_empty(), "head still pending");

        assert!(q.complete(RequestId(1), Ok(pixels(1))));
        assert_eq!(ids(q.drain_ready()), [1, 2, 3]);
        assert!(q.is_empty());
    }

    #[test]
    fn drain_stops_at_first_gap() {
        let mut q = DrawQueue::new();
        for id in 1..=3 {
            q.push_pending(RequestId(id), rect());
        }
        q.complete(RequestId(1), Ok(pixels(1)));
        q.complete(RequestId(3), Ok(pixels(3)));

        assert_eq!(ids(q.drain_ready()), [1]);
        assert_eq!(q.len(), 2);
        assert!(q.iter().next().unwrap().is_pending(), "request 2 blocks");
    }

    #[test]
    fn failures_are_drained_without_blocking() {
        let mut q = DrawQueue::new();
        q.push_pending(RequestId(1), rect());
        q.push_pending(RequestId(2), rect());
        q.complete(RequestId(2), Ok(pixels(2)));
        q.complete(RequestId(1), Err(FetchError::Transport));

        let drained: Vec<_> = q.drain_ready().collect();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].outcome, Err(FetchError::Transport));
        assert!(drained[1].outcome.is_ok());
    }

    #[test]
    fn cancel_all_empties_queue_and_ignores_late_completions() {
        let mut q = DrawQueue::new();
        q.push_pending(RequestId(1), rect());
        q.push_pending(RequestId(2), rect());
        q.push_pending(RequestId(3), rect());
        q.complete(RequestId(3), Ok(pixels(3)));

        assert_eq!(q.cancel_all(), [RequestId(1), RequestId(2)], "only pending");
        assert!(q.is_empty());

        q.push_pending(RequestId(4), rect());
        assert!(!q.complete(RequestId(1), Ok(pixels(1))), "canceled");
        assert!(q.complete(RequestId(4), Ok(pixels(4))));
        assert_eq!(ids(q.drain_ready()), [4]);
    }

    #[test]
    fn double_completion_is_ignored() {
        let mut q = DrawQueue::new();
        q.push_pending(RequestId(7), rect());
        q.push_pending(RequestId(8), rect());
        assert!(q.complete(RequestId(8), Ok(pixels(8))));
        assert!(!q.complete(RequestId(8), Err(FetchError::Aborted)));
    }

    #[test]
    fn fetch_error_messages() {
        use alloc::string::ToString as _;
        assert_eq!(
            FetchError::PayloadSize {
                expected: 8,
                actual: 3
            }
            .to_string(),
            "pixel payload is 3 bytes, expected 8"
        );
    }
}
