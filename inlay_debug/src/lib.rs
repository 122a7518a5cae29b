// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for inlay
//! diagnostics.
//!
//! This crate provides [`TraceSink`](inlay_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact timestamped binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from
//!   recorded bytes.

pub mod chrome;
pub mod pretty;
pub mod recorder;
