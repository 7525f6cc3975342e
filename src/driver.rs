//! Stream driver and graph routing
//!
//! Drives one asynchronous chunk stream through one accumulator (one turn,
//! one state, no sharing) and decides where the surrounding agent graph
//! goes next.

use std::pin::Pin;

use futures::{Stream, StreamExt};

use crate::accumulator::{AccumulatorConfig, StreamAccumulator};
use crate::error::Result;
use crate::types::{ChunkEvent, FinalizedMessage};

/// Chunk stream as delivered by the model-streaming collaborator.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChunkEvent>> + Send>>;

/// Where the agent graph goes after a model turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Execute the requested tools
    Tools,
    /// Terminate the run
    End,
}

/// Tool calls present routes to tools unconditionally, even when the
/// message also carries text content.
pub fn route_after_model(message: &FinalizedMessage) -> RouteDecision {
    if message.has_tool_calls() {
        RouteDecision::Tools
    } else {
        RouteDecision::End
    }
}

/// Drive a chunk stream to completion and finalize the accumulated state.
///
/// Transport errors from the stream propagate; data-shape problems never
/// do. An empty stream yields an empty message, not an error.
pub async fn collect_stream<S>(stream: S, config: AccumulatorConfig) -> Result<FinalizedMessage>
where
    S: Stream<Item = Result<ChunkEvent>>,
{
    let mut accumulator = StreamAccumulator::with_config(config);
    let mut stream = std::pin::pin!(stream);
    while let Some(item) = stream.next().await {
        accumulator.ingest(&item?);
    }
    Ok(accumulator.finalize())
}
