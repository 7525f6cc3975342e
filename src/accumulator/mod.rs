//! Stream Accumulator
//!
//! Folds an ordered sequence of chunk events into one per-turn state:
//! a concatenated text buffer plus an insertion-ordered map of in-progress
//! tool-call fragments, with configurable buffer limits and overflow
//! handling. One accumulator per streaming turn; no sharing, no locking.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::types::{ChunkEvent, RawFunctionCall, RawToolCall};

/// Overflow handler callback type
///
/// Called when a buffer exceeds its configured limit.
/// Parameters: (buffer_name, attempted_size)
pub type OverflowHandler = Box<dyn Fn(&str, usize) + Send + Sync>;

/// Accumulator Configuration
///
/// Controls buffer limits and overflow behavior. Limits bound memory on
/// unbounded streams; truncation is reported, never fatal.
#[derive(Default)]
pub struct AccumulatorConfig {
    /// Maximum size for the content buffer (in bytes)
    pub max_content_buffer_size: Option<usize>,
    /// Maximum number of distinct tool calls to track
    pub max_tool_calls: Option<usize>,
    /// Maximum accumulated size for a single call's raw arguments (in bytes)
    pub max_tool_arguments_size: Option<usize>,
    /// Handler for buffer overflow
    pub overflow_handler: Option<OverflowHandler>,
}

impl std::fmt::Debug for AccumulatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccumulatorConfig")
            .field("max_content_buffer_size", &self.max_content_buffer_size)
            .field("max_tool_calls", &self.max_tool_calls)
            .field("max_tool_arguments_size", &self.max_tool_arguments_size)
            .field("has_overflow_handler", &self.overflow_handler.is_some())
            .finish()
    }
}

impl AccumulatorConfig {
    /// Configuration with reasonable limits for service use.
    pub fn with_limits() -> Self {
        Self {
            max_content_buffer_size: Some(10 * 1024 * 1024),
            max_tool_calls: Some(100),
            max_tool_arguments_size: None,
            overflow_handler: None,
        }
    }
}

/// Argument accumulation for one tool call.
///
/// Mapping-valued fragments shallow-merge into `map` (later keys win).
/// String-valued fragments append to `raw`; each append attempts a parse of
/// the full concatenation, and a successful object parse is folded into
/// `map` so partial JSON resolves as soon as it completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgsBuffer {
    map: Option<Map<String, Value>>,
    raw: String,
}

impl ArgsBuffer {
    /// Mapping assembled so far, if any fragment (or a completed raw parse)
    /// produced one.
    pub fn map(&self) -> Option<&Map<String, Value>> {
        self.map.as_ref()
    }

    /// Raw string concatenation of all string-valued fragments.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether no argument data has arrived at all.
    pub fn is_empty(&self) -> bool {
        self.map.is_none() && self.raw.is_empty()
    }

    fn merge_map(&mut self, incoming: &Map<String, Value>) {
        self.map
            .get_or_insert_with(Map::new)
            .extend(incoming.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    fn push_raw(&mut self, fragment: &str) {
        self.raw.push_str(fragment);
        if let Ok(Value::Object(parsed)) = serde_json::from_str::<Value>(&self.raw) {
            self.merge_map(&parsed);
        }
    }
}

/// In-progress reconstruction of one tool call, keyed by identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallFragment {
    /// Call identifier (explicit or synthetic `call_<n>`)
    pub id: String,
    /// Call kind; "function" unless a fragment said otherwise
    pub kind: String,
    /// Last non-empty name seen
    pub name: Option<String>,
    /// Accumulated arguments
    pub args: ArgsBuffer,
    /// Normalized copy of the last nested function payload, kept for
    /// compatibility with legacy consumers
    pub function: Option<RawFunctionCall>,
}

impl ToolCallFragment {
    fn new(id: String) -> Self {
        Self {
            id,
            kind: "function".into(),
            name: None,
            args: ArgsBuffer::default(),
            function: None,
        }
    }
}

/// Per-turn accumulated state.
///
/// Created at the start of a streaming turn, mutated once per chunk,
/// consumed exactly once by finalization.
#[derive(Debug, Default)]
pub struct AccumulatedState {
    /// Append-only text buffer
    pub content: String,
    tool_calls: HashMap<String, ToolCallFragment>,
    tool_call_order: Vec<String>,
    /// Last-seen response metadata; mapping values merged key-wise,
    /// scalars last-write-wins
    pub response_metadata: Map<String, Value>,
    /// Last-seen message identifier
    pub last_id: Option<String>,
    /// Last-seen sender name
    pub last_name: Option<String>,
}

impl AccumulatedState {
    /// Tool-call fragments in first-insertion order.
    pub fn fragments(&self) -> impl Iterator<Item = &ToolCallFragment> {
        self.tool_call_order
            .iter()
            .filter_map(|id| self.tool_calls.get(id))
    }

    /// Number of distinct tool calls tracked so far.
    pub fn tool_call_count(&self) -> usize {
        self.tool_call_order.len()
    }
}

/// Stream Accumulator
///
/// Consumes chunk events one at a time and incrementally builds the
/// accumulated state. Malformed or uninformative chunks degrade gracefully;
/// ingestion never fails.
pub struct StreamAccumulator {
    state: AccumulatedState,
    config: AccumulatorConfig,
}

impl Default for StreamAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAccumulator {
    /// Create an accumulator with no buffer limits.
    pub fn new() -> Self {
        Self::with_config(AccumulatorConfig::default())
    }

    /// Create an accumulator with the given configuration.
    pub fn with_config(config: AccumulatorConfig) -> Self {
        Self {
            state: AccumulatedState::default(),
            config,
        }
    }

    /// Current accumulated state.
    pub fn state(&self) -> &AccumulatedState {
        &self.state
    }

    /// Consume the accumulator and return the accumulated state.
    pub fn into_state(self) -> AccumulatedState {
        self.state
    }

    /// Finalize the current state into a complete message.
    ///
    /// Non-consuming and idempotent: the same state finalizes to the same
    /// message every time.
    pub fn finalize(&self) -> crate::types::FinalizedMessage {
        crate::finalize::finalize_state(&self.state)
    }

    /// Fold one chunk event into the accumulated state.
    pub fn ingest(&mut self, chunk: &ChunkEvent) {
        let delta = chunk.text_delta();
        let fragments = chunk.fragments();
        let informative = !delta.is_empty() || !fragments.is_empty();

        if !delta.is_empty() {
            self.append_content(&delta);
        }
        for fragment in &fragments {
            self.merge_fragment(fragment);
        }

        for (key, value) in &chunk.response_metadata {
            match (self.state.response_metadata.get_mut(key), value) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    existing.extend(incoming.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                _ => {
                    self.state.response_metadata.insert(key.clone(), value.clone());
                }
            }
        }
        if let Some(id) = &chunk.id {
            self.state.last_id = Some(id.clone());
        }
        if let Some(name) = &chunk.name {
            self.state.last_name = Some(name.clone());
        }

        if !informative {
            tracing::debug!("chunk carried neither text nor tool-call information");
        }
    }

    fn append_content(&mut self, delta: &str) {
        if let Some(max_size) = self.config.max_content_buffer_size {
            let new_size = self.state.content.len() + delta.len();
            if new_size > max_size {
                if let Some(handler) = &self.config.overflow_handler {
                    (handler)("content_buffer", new_size);
                }
                tracing::warn!(
                    attempted = new_size,
                    limit = max_size,
                    "content buffer limit reached, truncating delta"
                );
                let available = max_size.saturating_sub(self.state.content.len());
                if available > 0 {
                    let truncated: String = delta.chars().take(available).collect();
                    self.state.content.push_str(&truncated);
                }
                return;
            }
        }
        self.state.content.push_str(delta);
    }

    fn merge_fragment(&mut self, fragment: &RawToolCall) {
        // Explicit id, then tool_call_id, then the nested function payload's
        // id; only a fragment with none of these gets a synthetic slot.
        let call_id = match fragment.call_id() {
            Some(id) => id.to_string(),
            None => format!("call_{}", self.state.tool_call_order.len()),
        };

        let is_new = !self.state.tool_calls.contains_key(&call_id);
        if is_new {
            if let Some(max_tool_calls) = self.config.max_tool_calls
                && self.state.tool_calls.len() >= max_tool_calls
            {
                if let Some(handler) = &self.config.overflow_handler {
                    (handler)("tool_calls", self.state.tool_calls.len() + 1);
                }
                tracing::warn!(
                    limit = max_tool_calls,
                    "tool call limit reached, dropping fragment"
                );
                return;
            }
            self.state.tool_call_order.push(call_id.clone());
        }

        let max_args = self.config.max_tool_arguments_size;
        let mut overflow: Option<usize> = None;
        let record = self
            .state
            .tool_calls
            .entry(call_id.clone())
            .or_insert_with(|| ToolCallFragment::new(call_id.clone()));

        if let Some(kind) = &fragment.kind
            && !kind.is_empty()
        {
            record.kind = kind.clone();
        }
        if let Some(name) = fragment.effective_name() {
            record.name = Some(name.to_string());
        }

        match fragment.effective_args() {
            Some(Value::Object(map)) => record.args.merge_map(map),
            Some(Value::String(s)) => {
                if let Some(limit) = max_args {
                    let new_size = record.args.raw().len() + s.len();
                    if new_size > limit {
                        overflow = Some(new_size);
                        let available = limit.saturating_sub(record.args.raw().len());
                        if available > 0 {
                            let truncated: String = s.chars().take(available).collect();
                            record.args.push_raw(&truncated);
                        }
                    } else {
                        record.args.push_raw(s);
                    }
                } else {
                    record.args.push_raw(s);
                }
            }
            _ => {}
        }

        if let Some(function) = &fragment.function {
            record.function = Some(function.clone());
        }

        if let Some(attempted) = overflow {
            if let Some(handler) = &self.config.overflow_handler {
                (handler)("tool_arguments", attempted);
            }
            tracing::warn!(
                call_id = %call_id,
                attempted,
                "tool argument buffer limit reached, truncating"
            );
        }
    }
}
