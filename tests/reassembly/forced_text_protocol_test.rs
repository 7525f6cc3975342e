//! End-to-end forced-text grammar tests: raw model text in, finalized
//! message and routing decision out.

use restitch::{RouteDecision, parse_forced_text, route_after_model};
use serde_json::json;

#[test]
fn final_answer_routes_to_end() {
    let message = parse_forced_text("Final Answer: The sky is blue.");
    assert_eq!(message.content, "The sky is blue.");
    assert!(message.tool_calls.is_empty());
    assert_eq!(route_after_model(&message), RouteDecision::End);
}

#[test]
fn action_pair_routes_to_tools() {
    let message = parse_forced_text("Action: get_weather\nAction Input: {\"city\": \"Madrid\"}");
    assert_eq!(message.tool_calls.len(), 1);
    let call = &message.tool_calls[0];
    assert_eq!(call.name.as_deref(), Some("get_weather"));
    assert_eq!(call.args["city"], json!("Madrid"));
    assert!(call.id.starts_with("call_"));
    assert_eq!(route_after_model(&message), RouteDecision::Tools);
}

#[test]
fn unmarked_text_passes_through_verbatim() {
    let message = parse_forced_text("I don't know.");
    assert_eq!(message.content, "I don't know.");
    assert!(message.tool_calls.is_empty());
    assert_eq!(route_after_model(&message), RouteDecision::End);
}

#[test]
fn final_answer_takes_precedence_over_action_pair() {
    let text = "Action: get_weather\nAction Input: {\"city\": \"Madrid\"}\nFinal Answer: 21C";
    let message = parse_forced_text(text);
    assert_eq!(message.content, "21C");
    assert!(message.tool_calls.is_empty());
}

#[test]
fn fenced_action_input_parses_as_json() {
    let text = "Action: search\nAction Input: ```json\n{\"query\": \"rust streams\"}\n```";
    let message = parse_forced_text(text);
    assert_eq!(message.tool_calls[0].args["query"], json!("rust streams"));
}

#[test]
fn trailing_prose_after_closing_brace_is_dropped() {
    let text = "Action: search\nAction Input: {\"query\": \"rust\"} -- hope that helps!";
    let message = parse_forced_text(text);
    let call = &message.tool_calls[0];
    assert_eq!(call.args["query"], json!("rust"));
    assert!(call.args.get("input").is_none());
}

#[test]
fn free_text_input_is_wrapped_under_input_key() {
    let message = parse_forced_text("Action: summarize\nAction Input: the last three messages");
    let call = &message.tool_calls[0];
    assert_eq!(call.name.as_deref(), Some("summarize"));
    assert_eq!(call.args["input"], json!("the last three messages"));
}

#[test]
fn action_without_input_is_plain_text() {
    let message = parse_forced_text("Action: get_weather");
    assert!(message.tool_calls.is_empty());
    assert_eq!(message.content, "Action: get_weather");
}

#[test]
fn parsed_call_serializes_to_wire_shape() {
    let message = parse_forced_text("Action: lookup\nAction Input: {\"id\": 42}");
    let wire = message.tool_calls[0].to_wire_value();
    assert_eq!(wire["type"], json!("function"));
    assert_eq!(wire["function"]["name"], json!("lookup"));
    let args: serde_json::Value =
        serde_json::from_str(wire["function"]["arguments"].as_str().expect("string args"))
            .expect("arguments round-trip");
    assert_eq!(args["id"], json!(42));
}
