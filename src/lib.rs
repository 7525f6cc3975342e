//! # Restitch - Streaming Chunk Reassembly for LLM Agents
//!
//! Restitch reconstructs complete model messages from unreliable,
//! incrementally-delivered chat-completion streams. It accumulates partial
//! tool-call fragments across chunks, merges partial JSON arguments, and
//! produces a single coherent result with defined tie-break and fallback
//! policies.
//!
//! ## What it does
//!
//! - **Accumulation**: [`StreamAccumulator`] folds heterogeneous chunk
//!   events (text deltas, normalized `tool_calls`, provider-specific
//!   `tool_call_chunks`, legacy `function_call` payloads) into one per-turn
//!   state.
//! - **Finalization**: [`finalize_state`] turns accumulated state into a
//!   [`FinalizedMessage`] — a plain answer or an ordered list of completed
//!   tool calls — reporting degradations through a non-fatal issues list.
//! - **Forced-text protocol**: [`parse_forced_text`] parses the
//!   `Action:` / `Action Input:` / `Final Answer:` fallback grammar used
//!   when structured tool-call fields are unreliable.
//! - **Wire projection**: [`to_wire`] and [`encode_agent_events`] turn
//!   agent events into the `{type, ts, run_id, node, data}` NDJSON records
//!   clients consume.
//!
//! ## Quick Start
//!
//! ```rust
//! use restitch::{AccumulatorConfig, ChunkEvent, collect_stream, route_after_model};
//! use futures_util::stream;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let chunks = stream::iter(vec![
//!         Ok(ChunkEvent::from_value(&json!({
//!             "tool_call_chunks": [{"id": "c1", "name": "get_weather", "args": "{\"city\""}]
//!         }))),
//!         Ok(ChunkEvent::from_value(&json!({
//!             "tool_call_chunks": [{"id": "c1", "args": ": \"Madrid\"}"}]
//!         }))),
//!     ]);
//!
//!     let message = collect_stream(chunks, AccumulatorConfig::default()).await?;
//!     assert_eq!(message.tool_calls[0].args["city"], json!("Madrid"));
//!     println!("route: {:?}", route_after_model(&message));
//!     Ok(())
//! }
//! ```
//!
//! Data-shape problems never fail: malformed chunks are ignored at the
//! field level, unparseable arguments degrade to `{}` with an issue code,
//! and empty model output is a caller-policy condition, not an error.

#![deny(unsafe_code)]

pub mod accumulator;
pub mod driver;
pub mod error;
pub mod finalize;
pub mod protocol;
pub mod types;
pub mod wire;

pub use accumulator::{
    AccumulatedState, AccumulatorConfig, ArgsBuffer, OverflowHandler, StreamAccumulator,
    ToolCallFragment,
};
pub use driver::{ChunkStream, RouteDecision, collect_stream, route_after_model};
pub use error::{RestitchError, Result};
pub use finalize::finalize_state;
pub use protocol::parse_forced_text;
pub use types::{
    ChunkContent, ChunkEvent, FinalizeIssue, FinalizedMessage, RawFunctionCall, RawToolCall,
    ToolCallRecord,
};
pub use wire::{
    AgentEvent, WireEnvelope, WireEventType, WireLineStream, encode_agent_events,
    encode_wire_lines, to_wire, wire_line,
};

/// Common imports for working with restitch.
pub mod prelude {
    pub use crate::accumulator::{AccumulatorConfig, StreamAccumulator};
    pub use crate::driver::{RouteDecision, collect_stream, route_after_model};
    pub use crate::error::{RestitchError, Result};
    pub use crate::finalize::finalize_state;
    pub use crate::protocol::parse_forced_text;
    pub use crate::types::{ChunkEvent, FinalizeIssue, FinalizedMessage, ToolCallRecord};
    pub use crate::wire::{AgentEvent, WireEnvelope, encode_agent_events, to_wire};
}
