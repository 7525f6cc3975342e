//! Finalization
//!
//! Converts accumulated per-turn state into a complete message. Reads the
//! state immutably, so finalizing twice yields identical results. Argument
//! problems downgrade to defaults and are reported through the issues list;
//! this path never fails.

use serde_json::{Map, Value};

use crate::accumulator::{AccumulatedState, ToolCallFragment};
use crate::types::{FinalizeIssue, FinalizedMessage, ToolCallRecord};

/// Wire-format fallback when arguments never parsed.
const EMPTY_ARGS: &str = "{}";

/// Convert accumulated state into a finalized message.
///
/// Tool calls are emitted in first-insertion order. A message with tool
/// calls keeps any accompanying text content; downstream routing decides on
/// tool-call presence alone. Empty output (no text, no calls) returns an
/// empty message and logs a diagnostic, leaving the policy to the caller.
pub fn finalize_state(state: &AccumulatedState) -> FinalizedMessage {
    let mut tool_calls = Vec::new();
    let mut issues = Vec::new();

    for fragment in state.fragments() {
        tool_calls.push(finalize_fragment(fragment, &mut issues));
    }

    if state.content.is_empty() && tool_calls.is_empty() {
        tracing::warn!("model stream produced neither text nor tool calls");
    }

    FinalizedMessage {
        content: state.content.clone(),
        tool_calls,
        issues,
        response_metadata: state.response_metadata.clone(),
        id: state.last_id.clone(),
        name: state.last_name.clone(),
    }
}

fn finalize_fragment(
    fragment: &ToolCallFragment,
    issues: &mut Vec<FinalizeIssue>,
) -> ToolCallRecord {
    let name = fragment
        .function
        .as_ref()
        .and_then(|f| f.name.clone())
        .filter(|n| !n.is_empty())
        .or_else(|| fragment.name.clone());
    if name.is_none() {
        issues.push(FinalizeIssue::MissingName {
            call_id: fragment.id.clone(),
        });
    }

    let (args, raw_args) = finalize_args(fragment, issues);

    ToolCallRecord {
        id: fragment.id.clone(),
        name,
        kind: fragment.kind.clone(),
        args,
        raw_args,
    }
}

fn finalize_args(
    fragment: &ToolCallFragment,
    issues: &mut Vec<FinalizeIssue>,
) -> (Map<String, Value>, String) {
    let raw = fragment.args.raw();

    // One last parse of the raw concatenation; string-sourced arguments keep
    // the original text as the wire form.
    if !raw.is_empty() {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(parsed)) => {
                let mut args = fragment.args.map().cloned().unwrap_or_default();
                args.extend(parsed);
                return (args, raw.to_string());
            }
            Ok(_) => {
                if let Some(map) = fragment.args.map() {
                    return (map.clone(), serialize_map(map));
                }
                issues.push(FinalizeIssue::UnsupportedArgsType {
                    call_id: fragment.id.clone(),
                });
                return (Map::new(), EMPTY_ARGS.to_string());
            }
            Err(_) => {
                if let Some(map) = fragment.args.map() {
                    return (map.clone(), serialize_map(map));
                }
                issues.push(FinalizeIssue::InvalidJsonArguments {
                    call_id: fragment.id.clone(),
                });
                return (Map::new(), EMPTY_ARGS.to_string());
            }
        }
    }

    match fragment.args.map() {
        Some(map) => (map.clone(), serialize_map(map)),
        None => (Map::new(), EMPTY_ARGS.to_string()),
    }
}

fn serialize_map(map: &Map<String, Value>) -> String {
    serde_json::to_string(&Value::Object(map.clone())).unwrap_or_else(|_| EMPTY_ARGS.to_string())
}
