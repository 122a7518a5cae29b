// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use inlay_core::draw::FetchError;
use inlay_core::trace::{
    DiscoveryEvent, DrawEvent, DrawStage, ForgetEvent, GeometryEvent, ResizeEvent, ThrottleEvent,
    TraceSink, VisibilityEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn failure(err: FetchError) -> &'static str {
    match err {
        FetchError::Transport => "transport",
        FetchError::Aborted => "aborted",
        FetchError::PayloadSize { .. } => "size",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_discovery(&mut self, e: &DiscoveryEvent) {
        let _ = writeln!(
            self.writer,
            "[discover] new={} duplicate={}",
            e.discovered, e.duplicates,
        );
    }

    fn on_forget(&mut self, e: &ForgetEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[forget] child={} canceled={}",
            e.child, e.canceled,
        );
    }

    fn on_geometry(&mut self, e: &GeometryEvent) {
        let _ = writeln!(
            self.writer,
            "[geometry] changed={}/{} scale={}",
            e.changed, e.evaluated, e.scale,
        );
    }

    fn on_throttle(&mut self, e: &ThrottleEvent) {
        let how = if e.coalesced { "coalesced" } else { "scheduled" };
        let _ = writeln!(
            self.writer,
            "[throttle] {how} deadline={}µs",
            e.deadline.ticks(),
        );
    }

    fn on_resize(&mut self, e: &ResizeEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[resize] child={} {}x{} -> {}x{} canceled={} restored={}",
            e.child, e.from.width, e.from.height, e.to.width, e.to.height, e.canceled, e.restored,
        );
    }

    fn on_draw(&mut self, e: &DrawEvent<'_>) {
        let _ = match e.stage {
            DrawStage::Queued => writeln!(
                self.writer,
                "[draw:queued] child={} request={}",
                e.child, e.request.0,
            ),
            DrawStage::Applied => writeln!(
                self.writer,
                "[draw:applied] child={} request={}",
                e.child, e.request.0,
            ),
            DrawStage::Failed(err) => writeln!(
                self.writer,
                "[draw:failed] child={} request={} reason={} ({err})",
                e.child,
                e.request.0,
                failure(err),
            ),
            DrawStage::Stale => writeln!(
                self.writer,
                "[draw:stale] child={} request={}",
                e.child, e.request.0,
            ),
        };
    }

    fn on_visibility(&mut self, e: &VisibilityEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[visibility] child={} visible={}",
            e.child, e.visible,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inlay_core::draw::RequestId;
    use inlay_core::scale::PhysicalSize;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_resize() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_resize(&ResizeEvent {
            child: "w1",
            from: PhysicalSize::new(10, 10),
            to: PhysicalSize::new(20, 40),
            canceled: 2,
            restored: true,
        });
        let output = output(sink);
        assert!(output.starts_with("[resize]"), "got: {output}");
        assert!(output.contains("10x10 -> 20x40"), "got: {output}");
        assert!(output.contains("canceled=2"), "got: {output}");
    }

    #[test]
    fn pretty_print_failed_draw() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_draw(&DrawEvent {
            child: "w1",
            request: RequestId(3),
            stage: DrawStage::Failed(FetchError::Aborted),
        });
        let output = output(sink);
        assert!(output.contains("[draw:failed]"), "got: {output}");
        assert!(output.contains("reason=aborted"), "got: {output}");
    }

    #[test]
    fn one_line_per_event() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_discovery(&DiscoveryEvent {
            discovered: 2,
            duplicates: 0,
        });
        sink.on_visibility(&VisibilityEvent {
            child: "a",
            visible: false,
        });
        assert_eq!(output(sink).lines().count(), 2);
    }
}
