//! Wire envelope types and event projection
//!
//! The route layer streams agent activity to clients as newline-delimited
//! JSON records of shape `{type, ts, run_id, node, data}`. [`to_wire`]
//! projects one agent event into one envelope (1:1), distinct from the
//! accumulator's many:1 reassembly.

mod encoder;

pub use encoder::*;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::types::ChunkEvent;

/// Wire event type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireEventType {
    /// Incremental model output
    Token,
    /// Tool execution started
    ToolStart,
    /// Tool execution finished
    ToolEnd,
    /// Graph node started
    NodeStart,
    /// Graph node finished
    NodeEnd,
    /// Whole-graph run finished
    GraphEnd,
    /// Chat model call finished
    ChatModelEnd,
    /// Stream-level failure
    Error,
    /// Informational marker (e.g. stream start)
    Info,
}

/// One observed agent/graph event, as seen by the route layer.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// A graph node began executing
    NodeStart {
        /// Node name
        node: String,
        /// Run identifier
        run_id: Option<String>,
    },
    /// A graph node finished executing
    NodeEnd {
        /// Node name
        node: String,
        /// Run identifier
        run_id: Option<String>,
    },
    /// One streamed model chunk
    Token {
        /// Node the chunk originated from
        node: Option<String>,
        /// Run identifier
        run_id: Option<String>,
        /// The chunk itself
        chunk: ChunkEvent,
    },
    /// The chat model call completed with its full output
    ChatModelEnd {
        /// Node the call ran in
        node: Option<String>,
        /// Run identifier
        run_id: Option<String>,
        /// Raw model output snapshot
        output: Value,
    },
    /// A tool began executing
    ToolStart {
        /// Tool name
        name: String,
        /// Run identifier
        run_id: Option<String>,
        /// Tool input
        input: Value,
    },
    /// A tool finished executing
    ToolEnd {
        /// Tool name
        name: String,
        /// Run identifier
        run_id: Option<String>,
        /// Tool output
        output: Value,
    },
    /// The graph run completed
    GraphEnd {
        /// Run identifier
        run_id: Option<String>,
        /// Final graph output
        output: Value,
    },
    /// A stream-level failure
    Error {
        /// Human-readable message
        message: String,
    },
    /// Informational marker
    Info {
        /// Marker label
        message: String,
        /// Extra payload
        data: Value,
    },
}

/// The client-facing NDJSON record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEnvelope {
    /// Event type
    #[serde(rename = "type")]
    pub kind: WireEventType,
    /// Emission timestamp, epoch seconds
    pub ts: f64,
    /// Run identifier, when known
    pub run_id: Option<String>,
    /// Node name, when known
    pub node: Option<String>,
    /// Type-specific payload
    pub data: Value,
}

impl WireEnvelope {
    fn new(kind: WireEventType, run_id: Option<String>, node: Option<String>, data: Value) -> Self {
        Self {
            kind,
            ts: Utc::now().timestamp_millis() as f64 / 1000.0,
            run_id,
            node,
            data,
        }
    }
}

/// Project one agent event into one wire envelope.
pub fn to_wire(event: &AgentEvent) -> WireEnvelope {
    match event {
        AgentEvent::NodeStart { node, run_id } => WireEnvelope::new(
            WireEventType::NodeStart,
            run_id.clone(),
            Some(node.clone()),
            json!({ "node": node }),
        ),
        AgentEvent::NodeEnd { node, run_id } => WireEnvelope::new(
            WireEventType::NodeEnd,
            run_id.clone(),
            Some(node.clone()),
            json!({ "node": node }),
        ),
        AgentEvent::Token { node, run_id, chunk } => WireEnvelope::new(
            WireEventType::Token,
            run_id.clone(),
            node.clone(),
            token_payload(chunk),
        ),
        AgentEvent::ChatModelEnd { node, run_id, output } => WireEnvelope::new(
            WireEventType::ChatModelEnd,
            run_id.clone(),
            node.clone(),
            chat_model_end_payload(output),
        ),
        AgentEvent::ToolStart { name, run_id, input } => WireEnvelope::new(
            WireEventType::ToolStart,
            run_id.clone(),
            None,
            json!({ "name": name, "input": input }),
        ),
        AgentEvent::ToolEnd { name, run_id, output } => WireEnvelope::new(
            WireEventType::ToolEnd,
            run_id.clone(),
            None,
            json!({ "name": name, "output": output }),
        ),
        AgentEvent::GraphEnd { run_id, output } => WireEnvelope::new(
            WireEventType::GraphEnd,
            run_id.clone(),
            None,
            graph_end_payload(output),
        ),
        AgentEvent::Error { message } => WireEnvelope::new(
            WireEventType::Error,
            None,
            None,
            json!({ "message": message }),
        ),
        AgentEvent::Info { message, data } => WireEnvelope::new(
            WireEventType::Info,
            None,
            None,
            json!({ "message": message, "data": data }),
        ),
    }
}

/// Token payload: the extracted delta plus, when the chunk carries them, the
/// observed tool-call fragments and a debug snapshot of the raw carriers.
fn token_payload(chunk: &ChunkEvent) -> Value {
    let delta = chunk.text_delta();
    let fragments = chunk.fragments();

    if delta.is_empty() && fragments.is_empty() {
        tracing::warn!("streaming token without delta");
    }

    let mut payload = Map::new();
    payload.insert("delta".into(), Value::String(delta));

    if !fragments.is_empty() {
        payload.insert(
            "tool_calls_delta".into(),
            Value::Array(fragments.iter().map(|f| f.to_wire_value()).collect()),
        );

        let mut debug = Map::new();
        let chunk_tool_calls: Vec<Value> = chunk
            .tool_calls
            .iter()
            .chain(&chunk.tool_call_chunks)
            .map(|f| f.to_wire_value())
            .collect();
        if !chunk_tool_calls.is_empty() {
            debug.insert("chunk_tool_calls".into(), Value::Array(chunk_tool_calls));
        }
        let mut additional = Map::new();
        if let Some(fc) = &chunk.function_call {
            additional.insert(
                "function_call".into(),
                serde_json::to_value(fc).unwrap_or(Value::Null),
            );
        }
        if !additional.is_empty() {
            debug.insert("additional_kwargs".into(), Value::Object(additional));
        }
        payload.insert("debug".into(), Value::Object(debug));
    }

    Value::Object(payload)
}

/// `chat_model_end` payload: a JSON snapshot of the raw output plus any
/// tool calls it exposes.
fn chat_model_end_payload(output: &Value) -> Value {
    let mut payload = Map::new();
    payload.insert("raw_output".into(), output.clone());
    if let Some(tool_calls) = output.get("tool_calls").filter(|v| v.is_array()) {
        payload.insert("tool_calls".into(), tool_calls.clone());
    }
    Value::Object(payload)
}

/// `graph_end` payload: final content and tool calls when the output shape
/// exposes them, otherwise the raw output.
fn graph_end_payload(output: &Value) -> Value {
    let Some(obj) = output.as_object() else {
        return json!({ "output": output });
    };
    if obj.contains_key("content") || obj.contains_key("tool_calls") {
        let mut payload = Map::new();
        if let Some(content) = obj.get("content") {
            payload.insert("content".into(), content.clone());
        }
        if let Some(tool_calls) = obj.get("tool_calls") {
            payload.insert("tool_calls".into(), tool_calls.clone());
        }
        return Value::Object(payload);
    }
    json!({ "output": output })
}
