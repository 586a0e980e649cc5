//! Full path: config, degraded backend, scripted model HTTP service.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use gantry::config::GantryConfig;
use gantry::orchestrator::Orchestrator;
use gantry::tools::SessionMode;

/// First round-trip asks for a tool, the follow-up (recognizable by the
/// tool_result in its history) gets the final text.
fn scripted_model(request: &Request) -> ResponseTemplate {
    let body: serde_json::Value = request.body_json().unwrap_or_else(|_| json!({}));
    let has_tool_result = body["messages"]
        .as_array()
        .map(|messages| {
            messages.iter().any(|message| {
                message["content"]
                    .as_array()
                    .map(|blocks| blocks.iter().any(|block| block["type"] == "tool_result"))
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false);

    if has_tool_result {
        ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "The box is in the document."}],
            "stop_reason": "end_turn"
        }))
    } else {
        ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "text", "text": "Let me create that."},
                {"type": "tool_use", "id": "toolu_e2e", "name": "create_object",
                 "input": {"type": "box"}}
            ],
            "stop_reason": "tool_use"
        }))
    }
}

#[tokio::test]
async fn offline_run_completes_against_snapshots() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(scripted_model)
        .expect(2)
        .mount(&server)
        .await;

    let config = GantryConfig::default()
        .with_api_key("test-key")
        .with_base_url(server.uri())
        .with_offline(true);

    let mut orchestrator = Orchestrator::connect(&config).await.unwrap();
    assert_eq!(orchestrator.mode(), SessionMode::Degraded);

    let report = orchestrator.run("put a box in the document").await.unwrap();
    orchestrator.shutdown().await.unwrap();

    assert_eq!(report.mode, SessionMode::Degraded);
    assert_eq!(report.turns, 2);
    assert_eq!(report.tool_calls, 1);

    // Emission order: model text, trace line, final text.
    let lines: Vec<&str> = report.text.lines().collect();
    assert_eq!(lines[0], "Let me create that.");
    assert!(lines[1].starts_with("[Calling tool create_object with args"));
    assert_eq!(lines[2], "The box is in the document.");

    // The recorded snapshot result reaches the model sanitized.
    let requests = server.received_requests().await.unwrap();
    let follow_up: serde_json::Value = requests[1].body_json().unwrap();
    let follow_up_text = follow_up.to_string();
    assert!(follow_up_text.contains("tool_result"));
    assert!(!follow_up_text.contains("annotations"));
}

#[tokio::test]
async fn missing_api_key_fails_before_any_model_call() {
    let config = GantryConfig::default().with_offline(true);
    let err = Orchestrator::connect(&config)
        .await
        .err()
        .expect("no API key configured");
    assert!(matches!(err, gantry::error::GantryError::Authentication(_)));
}
