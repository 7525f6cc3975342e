//! Wire-envelope integration tests: full agent runs projected into
//! newline-delimited JSON, parsed back line by line.

use futures_util::{StreamExt, stream};
use restitch::{
    AgentEvent, ChunkEvent, RestitchError, encode_agent_events, to_wire, wire_line,
};
use serde_json::{Value, json};

async fn collect_parsed(
    run_id: Option<String>,
    events: Vec<std::result::Result<AgentEvent, RestitchError>>,
) -> Vec<Value> {
    encode_agent_events(run_id, stream::iter(events))
        .map(|line| {
            let line = line.expect("line encodes");
            assert!(line.ends_with('\n'));
            serde_json::from_str(line.trim_end()).expect("line is JSON")
        })
        .collect()
        .await
}

#[tokio::test]
async fn full_run_produces_one_line_per_event() {
    let chunk = ChunkEvent::from_value(&json!({
        "content": "",
        "tool_call_chunks": [{"id": "call_1", "name": "get_weather", "args": "{\"city\": \"Madrid\"}"}]
    }));
    let events = vec![
        Ok(AgentEvent::NodeStart {
            node: "call_model".into(),
            run_id: Some("run-1".into()),
        }),
        Ok(AgentEvent::Token {
            node: Some("call_model".into()),
            run_id: Some("run-1".into()),
            chunk,
        }),
        Ok(AgentEvent::ChatModelEnd {
            node: Some("call_model".into()),
            run_id: Some("run-1".into()),
            output: json!({"content": "", "tool_calls": [{"id": "call_1"}]}),
        }),
        Ok(AgentEvent::ToolStart {
            name: "get_weather".into(),
            run_id: Some("run-1".into()),
            input: json!({"city": "Madrid"}),
        }),
        Ok(AgentEvent::ToolEnd {
            name: "get_weather".into(),
            run_id: Some("run-1".into()),
            output: json!({"temp_c": 21}),
        }),
        Ok(AgentEvent::NodeEnd {
            node: "call_model".into(),
            run_id: Some("run-1".into()),
        }),
        Ok(AgentEvent::GraphEnd {
            run_id: Some("run-1".into()),
            output: json!({"content": "21C in Madrid", "tool_calls": []}),
        }),
    ];

    let parsed = collect_parsed(Some("run-1".into()), events).await;

    let kinds: Vec<&str> = parsed
        .iter()
        .map(|line| line["type"].as_str().expect("type"))
        .collect();
    assert_eq!(
        kinds,
        [
            "info",
            "node_start",
            "token",
            "chat_model_end",
            "tool_start",
            "tool_end",
            "node_end",
            "graph_end",
        ]
    );

    assert_eq!(parsed[0]["data"]["message"], "stream_started");
    assert_eq!(parsed[0]["data"]["data"]["run_id"], "run-1");

    let token = &parsed[2];
    assert_eq!(token["node"], "call_model");
    assert_eq!(token["run_id"], "run-1");
    assert_eq!(token["data"]["delta"], "");
    assert_eq!(
        token["data"]["tool_calls_delta"][0]["function"]["name"],
        "get_weather"
    );
    assert_eq!(
        token["data"]["debug"]["chunk_tool_calls"][0]["id"],
        "call_1"
    );

    assert_eq!(parsed[3]["data"]["raw_output"]["tool_calls"][0]["id"], "call_1");
    assert_eq!(parsed[4]["data"]["input"]["city"], "Madrid");
    assert_eq!(parsed[5]["data"]["output"]["temp_c"], 21);
    assert_eq!(parsed[7]["data"]["content"], "21C in Madrid");

    for line in &parsed {
        assert!(line["ts"].as_f64().expect("ts is a number") > 0.0);
    }
}

#[tokio::test]
async fn transport_error_terminates_with_error_line() {
    let events = vec![
        Ok(AgentEvent::Token {
            node: None,
            run_id: None,
            chunk: ChunkEvent::text("partial"),
        }),
        Err(RestitchError::Stream("upstream disconnected".into())),
        Ok(AgentEvent::GraphEnd {
            run_id: None,
            output: json!(null),
        }),
    ];

    let parsed = collect_parsed(None, events).await;

    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed[1]["type"], "token");
    assert_eq!(parsed[2]["type"], "error");
    assert!(
        parsed[2]["data"]["message"]
            .as_str()
            .expect("message")
            .contains("upstream disconnected")
    );
}

#[tokio::test]
async fn empty_event_stream_still_announces_start() {
    let parsed = collect_parsed(None, Vec::new()).await;
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0]["type"], "info");
    assert_eq!(parsed[0]["data"]["data"]["run_id"], Value::Null);
}

#[test]
fn envelope_round_trips_through_a_line() {
    let envelope = to_wire(&AgentEvent::Info {
        message: "stream_started".into(),
        data: json!({"run_id": "run-9"}),
    });
    let line = wire_line(&envelope).expect("encodes");
    let parsed: Value = serde_json::from_str(line.trim_end()).expect("parses");
    assert_eq!(parsed["type"], "info");
    assert_eq!(parsed["run_id"], Value::Null);
    assert_eq!(parsed["node"], Value::Null);
    assert_eq!(parsed["data"]["data"]["run_id"], "run-9");
}
