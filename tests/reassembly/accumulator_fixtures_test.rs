//! Fixture-driven accumulation tests: full chunk sequences through ingest
//! and finalization.

#[path = "../support/chunk_fixture.rs"]
mod support;

use serde_json::json;

#[test]
fn split_openai_tool_call_reassembles() {
    let values = support::load_jsonl_fixture("tests/fixtures/openai_split_tool_call.jsonl")
        .expect("fixture present");
    let message = support::finalize_values(&values);

    assert_eq!(message.tool_calls.len(), 1);
    let call = &message.tool_calls[0];
    assert_eq!(call.id, "call_w1");
    assert_eq!(call.name.as_deref(), Some("get_weather"));
    assert_eq!(call.args["city"], json!("Madrid"));
    assert_eq!(call.args["units"], json!("metric"));
    assert_eq!(call.raw_args, "{\"city\": \"Madrid\", \"units\": \"metric\"}");
    assert!(message.issues.is_empty());

    assert_eq!(message.id.as_deref(), Some("msg_w1"));
    assert_eq!(message.response_metadata["finish_reason"], json!("tool_calls"));
}

#[test]
fn mixed_text_and_tools_preserves_both() {
    let values = support::load_jsonl_fixture("tests/fixtures/mixed_text_and_tools.jsonl")
        .expect("fixture present");
    let message = support::finalize_values(&values);

    assert_eq!(message.content, "Let me check the weather.");
    assert!(message.has_tool_calls());
    let call = &message.tool_calls[0];
    assert_eq!(call.args["city"], json!("Madrid"));
    assert_eq!(call.args["units"], json!("metric"));

    // Mapping-valued metadata merges key-wise across chunks
    let usage = &message.response_metadata["usage"];
    assert_eq!(usage["input_tokens"], json!(12));
    assert_eq!(usage["output_tokens"], json!(7));
    assert_eq!(message.id.as_deref(), Some("msg_42"));
}

#[test]
fn legacy_function_call_is_reconstructed() {
    let values = support::load_jsonl_fixture("tests/fixtures/legacy_function_call.jsonl")
        .expect("fixture present");
    let message = support::finalize_values(&values);

    assert_eq!(message.tool_calls.len(), 1);
    let call = &message.tool_calls[0];
    assert_eq!(call.id, "call_0");
    assert_eq!(call.name.as_deref(), Some("lookup"));
    assert_eq!(call.args["id"], json!(42));
}

#[test]
fn text_only_stream_concatenates_exactly() {
    let values = vec![
        json!({"content": "The "}),
        json!({"content": "sky "}),
        json!({"content": [{"type": "text", "text": "is "}]}),
        json!({"content": "blue."}),
    ];
    let message = support::finalize_values(&values);
    assert_eq!(message.content, "The sky is blue.");
    assert!(message.tool_calls.is_empty());
}

#[test]
fn unparseable_arguments_surface_issue_not_error() {
    let values = vec![json!({
        "tool_call_chunks": [{"id": "c1", "name": "broken", "args": "{not json"}]
    })];
    let message = support::finalize_values(&values);

    let call = &message.tool_calls[0];
    assert_eq!(call.raw_args, "{}");
    assert!(call.args.is_empty());
    assert_eq!(message.issues.len(), 1);
    assert_eq!(message.issues[0].code(), "invalid_json_arguments");
    assert_eq!(message.issues[0].call_id(), "c1");
}

#[test]
fn identifierless_fragments_stay_separate() {
    let values = vec![
        json!({"tool_call_chunks": [{"name": "first", "args": "{\"a\": 1}"}]}),
        json!({"tool_call_chunks": [{"name": "second", "args": "{\"b\": 2}"}]}),
    ];
    let message = support::finalize_values(&values);

    assert_eq!(message.tool_calls.len(), 2);
    assert_eq!(message.tool_calls[0].id, "call_0");
    assert_eq!(message.tool_calls[1].id, "call_1");
    assert_eq!(message.tool_calls[0].name.as_deref(), Some("first"));
    assert_eq!(message.tool_calls[1].name.as_deref(), Some("second"));
}

#[test]
fn empty_sequence_finalizes_to_empty_message() {
    let message = support::finalize_values(&[]);
    assert!(message.is_empty());
    assert!(message.issues.is_empty());
}
