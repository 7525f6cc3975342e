//! Finalized message types
//!
//! Terminal output of a streaming turn: plain text content, an ordered list
//! of completed tool calls, and a non-fatal issues channel describing any
//! degraded or defaulted behavior.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A completed tool invocation reconstructed from streamed fragments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Call identifier (explicit or synthetic)
    pub id: String,
    /// Tool name; `None` when the stream never supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Call kind, "function" unless the stream said otherwise
    #[serde(rename = "type")]
    pub kind: String,
    /// Parsed arguments; empty when arguments never parsed
    pub args: Map<String, Value>,
    /// Wire-format argument string for the `function.arguments` field;
    /// the literal `"{}"` when arguments never parsed
    pub raw_args: String,
}

impl ToolCallRecord {
    /// OpenAI-style wire projection:
    /// `{"id", "type", "function": {"name", "arguments"}}`.
    pub fn to_wire_value(&self) -> Value {
        let mut function = Map::new();
        if let Some(name) = &self.name {
            function.insert("name".into(), Value::String(name.clone()));
        }
        function.insert("arguments".into(), Value::String(self.raw_args.clone()));

        let mut out = Map::new();
        out.insert("id".into(), Value::String(self.id.clone()));
        out.insert("type".into(), Value::String(self.kind.clone()));
        out.insert("function".into(), Value::Object(function));
        Value::Object(out)
    }
}

/// Non-fatal degradation observed while finalizing a streaming turn.
///
/// Issues are reported for observability; the affected call is still
/// emitted with best-effort defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum FinalizeIssue {
    /// Accumulated argument text never parsed as JSON
    InvalidJsonArguments {
        /// Identifier of the affected call
        call_id: String,
    },
    /// No name arrived on any fragment of the call
    MissingName {
        /// Identifier of the affected call
        call_id: String,
    },
    /// Arguments parsed to something other than a JSON object
    UnsupportedArgsType {
        /// Identifier of the affected call
        call_id: String,
    },
}

impl FinalizeIssue {
    /// The stable string code for this issue.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJsonArguments { .. } => "invalid_json_arguments",
            Self::MissingName { .. } => "missing_name",
            Self::UnsupportedArgsType { .. } => "unsupported_args_type",
        }
    }

    /// Identifier of the call the issue refers to.
    pub fn call_id(&self) -> &str {
        match self {
            Self::InvalidJsonArguments { call_id }
            | Self::MissingName { call_id }
            | Self::UnsupportedArgsType { call_id } => call_id,
        }
    }
}

/// The terminal output of one streaming turn.
///
/// Either a plain answer (text content, no tool calls) or a tool-call
/// message. Tool calls take precedence for routing, but accompanying text
/// is preserved rather than discarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalizedMessage {
    /// Concatenated text content (may be empty)
    pub content: String,
    /// Completed tool calls in first-insertion order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRecord>,
    /// Degradations observed during finalization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FinalizeIssue>,
    /// Last-seen response metadata, mapping values merged key-wise
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub response_metadata: Map<String, Value>,
    /// Last-seen message identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Last-seen sender name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FinalizedMessage {
    /// A plain-answer message with the given content.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Whether this message requests tool execution.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Whether the stream produced neither text nor tool calls.
    ///
    /// Empty output is a caller-policy condition, never an error here.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.tool_calls.is_empty()
    }
}
