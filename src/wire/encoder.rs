//! NDJSON encoding for wire envelopes
//!
//! Complements the projection step (`AgentEvent` -> `WireEnvelope`) with
//! encoding helpers (`WireEnvelope` -> newline-delimited JSON lines).

use std::pin::Pin;

use futures_util::{Stream, StreamExt};

use crate::error::{RestitchError, Result};
use crate::wire::{AgentEvent, WireEnvelope, to_wire};

/// Line stream suitable for NDJSON HTTP responses.
pub type WireLineStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Encode one envelope as a single NDJSON line (newline included).
pub fn wire_line(envelope: &WireEnvelope) -> Result<String> {
    let mut line = serde_json::to_string(envelope)?;
    line.push('\n');
    Ok(line)
}

/// Encode a stream of envelopes into NDJSON lines.
pub fn encode_wire_lines<S>(stream: S) -> WireLineStream
where
    S: Stream<Item = Result<WireEnvelope>> + Send + 'static,
{
    Box::pin(stream.map(|item| item.and_then(|envelope| wire_line(&envelope))))
}

/// Encode a stream of agent events into client-facing NDJSON lines.
///
/// Emits an initial `info`/`stream_started` line, then one line per event.
/// A transport error is projected as an `error` envelope line and ends the
/// stream.
pub fn encode_agent_events<S>(run_id: Option<String>, events: S) -> WireLineStream
where
    S: Stream<Item = std::result::Result<AgentEvent, RestitchError>> + Send + 'static,
{
    Box::pin(async_stream::try_stream! {
        let started = to_wire(&AgentEvent::Info {
            message: "stream_started".into(),
            data: serde_json::json!({ "run_id": run_id }),
        });
        yield wire_line(&started)?;

        let mut events = std::pin::pin!(events);
        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    yield wire_line(&to_wire(&event))?;
                }
                Err(err) => {
                    let envelope = to_wire(&AgentEvent::Error {
                        message: err.to_string(),
                    });
                    yield wire_line(&envelope)?;
                    break;
                }
            }
        }
    })
}
