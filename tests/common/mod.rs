//! Shared test doubles for integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use gantry::error::GantryError;
use gantry::protocol::wire::{CallToolResult, ToolDescriptor};
use gantry::provider::{ModelProvider, ModelRequest, ModelResponse, StopReason};
use gantry::tools::{SessionMode, ToolBackend};
use gantry::types::ContentBlock;

/// Provider fed from a script of canned responses.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ModelResponse, GantryError>>>,
    pub requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<ModelResponse, GantryError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse, GantryError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GantryError::ModelService("provider script exhausted".into())))
    }
}

/// Provider that requests the same tool forever.
pub struct RelentlessProvider {
    pub calls: Arc<AtomicUsize>,
}

impl RelentlessProvider {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ModelProvider for RelentlessProvider {
    fn provider_name(&self) -> &str {
        "relentless"
    }

    async fn complete(&self, _request: &ModelRequest) -> Result<ModelResponse, GantryError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(tool_use_response(
            &format!("toolu_{n}"),
            "get_document_info",
            json!({}),
        ))
    }
}

/// Backend over a fixed tool listing and a queue of invocation results.
pub struct FixtureBackend {
    pub tools: Vec<ToolDescriptor>,
    pub results: Mutex<VecDeque<Result<CallToolResult, GantryError>>>,
    pub invocations: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    pub mode: SessionMode,
}

impl FixtureBackend {
    pub fn new(results: Vec<Result<CallToolResult, GantryError>>) -> Self {
        Self {
            tools: vec![
                descriptor("create_object", "Create a geometry object"),
                descriptor("get_document_info", "Describe the open document"),
            ],
            results: Mutex::new(results.into()),
            invocations: Arc::new(Mutex::new(Vec::new())),
            mode: SessionMode::Live,
        }
    }
}

#[async_trait]
impl ToolBackend for FixtureBackend {
    fn mode(&self) -> SessionMode {
        self.mode
    }

    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, GantryError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, GantryError> {
        self.invocations
            .lock()
            .unwrap()
            .push((name.to_string(), arguments));
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GantryError::Connection("backend script exhausted".into())))
    }

    async fn shutdown(&mut self) -> Result<(), GantryError> {
        Ok(())
    }
}

/// Backend that answers every invocation with the same result.
pub struct EndlessBackend {
    result: CallToolResult,
    pub invocations: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

impl EndlessBackend {
    pub fn new(result: CallToolResult) -> Self {
        Self {
            result,
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ToolBackend for EndlessBackend {
    fn mode(&self) -> SessionMode {
        SessionMode::Live
    }

    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, GantryError> {
        Ok(vec![descriptor("get_document_info", "Describe the document")])
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, GantryError> {
        self.invocations
            .lock()
            .unwrap()
            .push((name.to_string(), arguments));
        Ok(self.result.clone())
    }

    async fn shutdown(&mut self) -> Result<(), GantryError> {
        Ok(())
    }
}

pub fn descriptor(name: &str, description: &str) -> ToolDescriptor {
    ToolDescriptor {
        name: name.into(),
        description: Some(description.into()),
        input_schema: json!({"type": "object", "properties": {}}),
    }
}

pub fn text_response(text: &str) -> ModelResponse {
    ModelResponse {
        content: vec![ContentBlock::Text { text: text.into() }],
        stop_reason: Some(StopReason::EndTurn),
    }
}

pub fn tool_use_response(id: &str, name: &str, input: serde_json::Value) -> ModelResponse {
    ModelResponse {
        content: vec![ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }],
        stop_reason: Some(StopReason::ToolUse),
    }
}

pub fn text_result(text: &str) -> CallToolResult {
    CallToolResult {
        content: vec![json!({"type": "text", "text": text})],
        is_error: false,
    }
}
