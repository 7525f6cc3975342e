//! Chunk event types for incremental model output
//!
//! One `ChunkEvent` is one observation from the streaming source. Providers
//! disagree about where tool-call information lives (a normalized
//! `tool_calls` list, a partial `tool_call_chunks` list, or a legacy
//! `additional_kwargs.function_call` object), so the event carries all three
//! and [`ChunkEvent::from_value`] performs the single tolerant conversion
//! from an untyped payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Text content of a chunk: either a plain string or a structured list of
/// content parts (only dict-shaped parts with a string `text` field
/// contribute to the delta).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChunkContent {
    /// Plain text delta
    Text(String),
    /// Structured list of content parts
    Parts(Vec<Value>),
}

/// Legacy function-call payload (`additional_kwargs.function_call` and the
/// nested `function` object of OpenAI-style tool calls).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFunctionCall {
    /// Call identifier, when the payload embeds one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Arguments: a (possibly partial) JSON string or a mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// One partial description of a tool invocation, as carried on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawToolCall {
    /// Explicit call identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Alternate identifier carrier used by some providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Call kind, defaults to "function" downstream when unspecified
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Tool name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Arguments: a (possibly partial) JSON string or a mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    /// Nested OpenAI-style function payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<RawFunctionCall>,
}

impl RawToolCall {
    /// Resolve the call identifier: explicit `id`, then `tool_call_id`, then
    /// the identifier embedded in the nested function payload.
    pub fn call_id(&self) -> Option<&str> {
        non_empty(self.id.as_deref())
            .or_else(|| non_empty(self.tool_call_id.as_deref()))
            .or_else(|| non_empty(self.function.as_ref().and_then(|f| f.id.as_deref())))
    }

    /// Effective tool name: the fragment's own `name`, else the nested
    /// function payload's.
    pub fn effective_name(&self) -> Option<&str> {
        non_empty(self.name.as_deref())
            .or_else(|| non_empty(self.function.as_ref().and_then(|f| f.name.as_deref())))
    }

    /// Effective argument value: the fragment's own `args`, else the nested
    /// function payload's `arguments`.
    pub fn effective_args(&self) -> Option<&Value> {
        self.args
            .as_ref()
            .or_else(|| self.function.as_ref().and_then(|f| f.arguments.as_ref()))
    }

    /// Project into the OpenAI-style wire shape used by client-facing
    /// streaming: `{"id", "type", "function": {"name", "arguments"}}`.
    pub fn to_wire_value(&self) -> Value {
        let arguments = match self.effective_args() {
            Some(Value::String(s)) => Value::String(s.clone()),
            Some(other) => Value::String(serde_json::to_string(other).unwrap_or_default()),
            None => Value::String(String::new()),
        };
        let mut function = Map::new();
        if let Some(name) = self.effective_name() {
            function.insert("name".into(), Value::String(name.to_string()));
        }
        function.insert("arguments".into(), arguments);

        let mut out = Map::new();
        if let Some(id) = self.call_id() {
            out.insert("id".into(), Value::String(id.to_string()));
        }
        out.insert(
            "type".into(),
            Value::String(self.kind.clone().unwrap_or_else(|| "function".into())),
        );
        out.insert("function".into(), Value::Object(function));
        Value::Object(out)
    }

    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            id: string_field(obj, "id"),
            tool_call_id: string_field(obj, "tool_call_id"),
            kind: string_field(obj, "type"),
            name: string_field(obj, "name"),
            args: obj
                .get("args")
                .or_else(|| obj.get("arguments"))
                .filter(|v| !v.is_null())
                .cloned(),
            function: obj.get("function").and_then(RawFunctionCall::from_value),
        })
    }
}

impl RawFunctionCall {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            id: string_field(obj, "id"),
            name: string_field(obj, "name"),
            arguments: obj.get("arguments").filter(|v| !v.is_null()).cloned(),
        })
    }

    /// View this legacy payload as a [`RawToolCall`] fragment so it can go
    /// through the same merge path as the other carriers.
    pub fn as_tool_call(&self) -> RawToolCall {
        RawToolCall {
            id: self.id.clone(),
            function: Some(self.clone()),
            ..Default::default()
        }
    }
}

/// One observation from the streaming source. Transient; folded into the
/// accumulator exactly once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkEvent {
    /// Text content delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ChunkContent>,
    /// Normalized tool-call carrier
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<RawToolCall>,
    /// Provider-specific partial-call carrier
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_call_chunks: Vec<RawToolCall>,
    /// Legacy function-call carrier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<RawFunctionCall>,
    /// Message identifier, when the source assigns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Sender name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Opaque response metadata
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub response_metadata: Map<String, Value>,
}

impl ChunkEvent {
    /// Convenience constructor for a plain text delta.
    pub fn text(delta: impl Into<String>) -> Self {
        Self {
            content: Some(ChunkContent::Text(delta.into())),
            ..Default::default()
        }
    }

    /// Convert an untyped provider payload into a `ChunkEvent`.
    ///
    /// This is the one boundary deserialization step: unknown fields are
    /// ignored, null values are dropped, and unrecognized shapes produce an
    /// empty event. Never fails.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let content = match obj.get("content") {
            Some(Value::String(s)) => Some(ChunkContent::Text(s.clone())),
            Some(Value::Array(parts)) => Some(ChunkContent::Parts(parts.clone())),
            _ => None,
        };

        let function_call = obj
            .get("additional_kwargs")
            .and_then(Value::as_object)
            .and_then(|kw| kw.get("function_call"))
            .or_else(|| obj.get("function_call"))
            .and_then(RawFunctionCall::from_value);

        Self {
            content,
            tool_calls: tool_call_list(obj.get("tool_calls")),
            tool_call_chunks: tool_call_list(obj.get("tool_call_chunks")),
            function_call,
            id: string_field(obj, "id"),
            name: string_field(obj, "name"),
            response_metadata: obj
                .get("response_metadata")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Extract the text delta carried by this chunk.
    ///
    /// A plain string is used as-is; a structured list concatenates the
    /// `text` field of every dict-shaped part; anything else yields an
    /// empty delta.
    pub fn text_delta(&self) -> String {
        match &self.content {
            Some(ChunkContent::Text(s)) => s.clone(),
            Some(ChunkContent::Parts(parts)) => parts
                .iter()
                .filter_map(|part| part.as_object())
                .filter_map(|part| part.get("text"))
                .filter_map(Value::as_str)
                .collect(),
            None => String::new(),
        }
    }

    /// All tool-call fragments on this chunk, in carrier order:
    /// `tool_calls`, then `tool_call_chunks`, then the legacy function call.
    pub fn fragments(&self) -> Vec<RawToolCall> {
        let mut out: Vec<RawToolCall> =
            self.tool_calls.iter().chain(&self.tool_call_chunks).cloned().collect();
        if let Some(fc) = &self.function_call {
            out.push(fc.as_tool_call());
        }
        out
    }
}

fn tool_call_list(value: Option<&Value>) -> Vec<RawToolCall> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(RawToolCall::from_value).collect())
        .unwrap_or_default()
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
