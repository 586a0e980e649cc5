//! Anthropic Messages API provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::GantryConfig;
use crate::error::GantryError;

use super::http::{anthropic_headers, shared_client, status_to_error};
use super::{ModelProvider, ModelRequest, ModelResponse, StopReason};
use crate::types::ContentBlock;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    pub fn from_config(config: &GantryConfig) -> Result<Self, GantryError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GantryError::Authentication("Missing ANTHROPIC_API_KEY".into()))?;
        Ok(Self::new(api_key, config.base_url.clone()))
    }

    fn build_request_body(&self, request: &ModelRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "messages": request.messages,
        });

        if !request.tools.is_empty() {
            // Tool serializes as {name, description, input_schema}, which is
            // exactly the shape the API takes.
            body["tools"] = serde_json::json!(request.tools);
        }

        body
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse, GantryError> {
        let body = self.build_request_body(request);
        let url = format!("{}/messages", self.base_url);

        debug!(model = %request.model, messages = request.messages.len(), "model request");

        let resp = shared_client()
            .post(&url)
            .headers(anthropic_headers(&self.api_key, API_VERSION))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: MessagesResponse = resp
            .json()
            .await
            .map_err(|e| GantryError::ModelService(format!("malformed model response: {e}")))?;

        let mut content = Vec::new();
        for block in data.content {
            match block.kind.as_str() {
                "text" => {
                    let text = block.text.ok_or_else(|| {
                        GantryError::ModelService("text block without text".into())
                    })?;
                    content.push(ContentBlock::Text { text });
                }
                "tool_use" => {
                    let (id, name, input) = match (block.id, block.name, block.input) {
                        (Some(id), Some(name), Some(input)) => (id, name, input),
                        _ => {
                            return Err(GantryError::ModelService(
                                "tool_use block missing id, name or input".into(),
                            ))
                        }
                    };
                    content.push(ContentBlock::ToolUse { id, name, input });
                }
                // Other block kinds (e.g. thinking) carry nothing the loop
                // acts on.
                _ => {}
            }
        }

        let stop_reason = match data.stop_reason.as_deref() {
            Some("end_turn") => Some(StopReason::EndTurn),
            Some("max_tokens") => Some(StopReason::MaxTokens),
            Some("tool_use") => Some(StopReason::ToolUse),
            _ => None,
        };

        Ok(ModelResponse {
            content,
            stop_reason,
        })
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}
