//! Forced-text protocol parser
//!
//! Fallback tool-calling grammar for gateways that cannot reliably emit
//! structured tool-call fields. The model is prompted to answer in one of
//! two textual shapes:
//!
//! ```text
//! Final Answer: <text>
//! ```
//!
//! ```text
//! Action: <tool-name>
//! Action Input: <json-or-text>
//! ```
//!
//! Matching is case-insensitive and whitespace-tolerant; `Final Answer:`
//! wins when both markers appear. Anything else falls back to a plain
//! answer with the full raw text. Parsing never fails.

use regex::Regex;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::types::{FinalizedMessage, ToolCallRecord};

lazy_static::lazy_static! {
    static ref FINAL_ANSWER: Regex = Regex::new(r"(?is)final\s+answer\s*:\s*(.*)").unwrap();
    static ref ACTION: Regex = Regex::new(r"(?i)action\s*:\s*([^\n]+)").unwrap();
    static ref ACTION_INPUT: Regex = Regex::new(r"(?is)action\s+input\s*:\s*(.*)").unwrap();
}

/// Parse raw model text according to the forced-text grammar.
pub fn parse_forced_text(text: &str) -> FinalizedMessage {
    if let Some(caps) = FINAL_ANSWER.captures(text) {
        let answer = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        return FinalizedMessage::plain(answer.trim());
    }

    let action = ACTION
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim());
    let input = ACTION_INPUT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim());

    if let (Some(name), Some(input)) = (action, input)
        && !name.is_empty()
    {
        let args = best_effort_args(input);
        let raw_args =
            serde_json::to_string(&Value::Object(args.clone())).unwrap_or_else(|_| "{}".into());
        return FinalizedMessage {
            tool_calls: vec![ToolCallRecord {
                id: format!("call_{}", Uuid::new_v4().simple()),
                name: Some(name.to_string()),
                kind: "function".into(),
                args,
                raw_args,
            }],
            ..Default::default()
        };
    }

    FinalizedMessage::plain(text.trim())
}

/// Best-effort conversion of the `Action Input:` payload into a JSON object.
///
/// Strips surrounding code fences, truncates `{...}` payloads to the last
/// closing brace to discard trailing prose, and wraps anything that still
/// does not parse as `{"input": <text>}`.
fn best_effort_args(input: &str) -> Map<String, Value> {
    let stripped = strip_code_fences(input);
    let candidate = if stripped.starts_with('{') {
        match stripped.rfind('}') {
            Some(end) => &stripped[..=end],
            None => stripped,
        }
    } else {
        stripped
    };

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
        return map;
    }

    let mut wrapped = Map::new();
    wrapped.insert("input".into(), Value::String(stripped.to_string()));
    wrapped
}

fn strip_code_fences(input: &str) -> &str {
    let trimmed = input.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the opening fence line (which may carry a language tag).
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}
