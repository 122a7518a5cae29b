// Copyright 2026 the Inlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Draw requests become async slices (`b`/`e` pairs keyed by request id), so
//! each fetch shows up as a bar from queueing to its outcome. Everything else
//! is an instant event.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use inlay_core::time::HostTime;
use inlay_core::trace::DrawStage;
use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Recorder timestamps are already microseconds and are written unchanged.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for stamped in decode(bytes) {
        let ts = us(stamped.at);
        events.push(match stamped.event {
            RecordedEvent::Discovery(e) => instant(
                "Discovery",
                "Detect",
                ts,
                json!({ "discovered": e.discovered, "duplicates": e.duplicates }),
            ),
            RecordedEvent::Forget { child, canceled } => instant(
                "Forget",
                "Detect",
                ts,
                json!({ "child": child, "canceled": canceled }),
            ),
            RecordedEvent::Geometry(e) => instant(
                "GeometryPass",
                "Geometry",
                ts,
                json!({ "evaluated": e.evaluated, "changed": e.changed, "scale": e.scale }),
            ),
            RecordedEvent::Throttle(e) => instant(
                if e.coalesced { "Coalesced" } else { "Deferred" },
                "Geometry",
                ts,
                json!({ "deadline_us": us(e.deadline) }),
            ),
            RecordedEvent::Resize {
                child,
                from,
                to,
                canceled,
                restored,
            } => instant(
                "Resize",
                "Draw",
                ts,
                json!({
                    "child": child,
                    "from": [from.width, from.height],
                    "to": [to.width, to.height],
                    "canceled": canceled,
                    "restored": restored,
                }),
            ),
            RecordedEvent::Draw {
                child,
                request,
                stage,
            } => {
                let (ph, outcome) = match stage {
                    DrawStage::Queued => ("b", None),
                    DrawStage::Applied => ("e", Some(String::from("applied"))),
                    DrawStage::Failed(err) => ("e", Some(err.to_string())),
                    DrawStage::Stale => ("e", Some(String::from("stale"))),
                };
                json!({
                    "ph": ph,
                    "name": child,
                    "cat": "Draw",
                    "id": request.0,
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": { "outcome": outcome },
                })
            }
            RecordedEvent::Visibility { child, visible } => instant(
                "Visibility",
                "Draw",
                ts,
                json!({ "child": child, "visible": visible }),
            ),
        });
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn instant(name: &str, cat: &str, ts: f64, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "g",
        "args": args,
    })
}

fn us(t: HostTime) -> f64 {
    t.ticks() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use inlay_core::draw::{FetchError, RequestId};
    use inlay_core::trace::{DiscoveryEvent, DrawEvent, GeometryEvent, TraceSink};

    fn fixed_clock() -> RecorderSink {
        RecorderSink::with_clock(|| HostTime(2_500))
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = fixed_clock();
        rec.on_discovery(&DiscoveryEvent {
            discovered: 1,
            duplicates: 0,
        });
        rec.on_geometry(&GeometryEvent {
            evaluated: 1,
            changed: 1,
            scale: 2.0,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 2);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "Discovery");
        assert_eq!(parsed[0]["ts"], 2500.0);

        assert_eq!(parsed[1]["name"], "GeometryPass");
        assert_eq!(parsed[1]["args"]["scale"], 2.0);
    }

    #[test]
    fn draws_become_async_slices() {
        let mut rec = fixed_clock();
        rec.on_draw(&DrawEvent {
            child: "w1",
            request: RequestId(9),
            stage: DrawStage::Queued,
        });
        rec.on_draw(&DrawEvent {
            child: "w1",
            request: RequestId(9),
            stage: DrawStage::Failed(FetchError::Transport),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();

        assert_eq!(parsed[0]["ph"], "b");
        assert_eq!(parsed[0]["id"], 9);
        assert_eq!(parsed[0]["name"], "w1");
        assert!(parsed[0]["args"]["outcome"].is_null());

        assert_eq!(parsed[1]["ph"], "e");
        assert_eq!(parsed[1]["id"], 9);
        assert_eq!(parsed[1]["args"]["outcome"], "pixel fetch failed");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
