//! Model provider trait and the request/response types it exchanges.

pub mod anthropic;
pub mod http;

pub use anthropic::AnthropicProvider;

use async_trait::async_trait;

use crate::error::GantryError;
use crate::types::{ContentBlock, Message, Tool};

/// A request sent to the model service.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<Tool>,
    pub max_tokens: u32,
    pub model: String,
}

/// A model response: an ordered sequence of content blocks.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<StopReason>,
}

impl ModelResponse {
    /// The tool use blocks, in emission order.
    pub fn tool_uses(&self) -> Vec<(&str, &str, &serde_json::Value)> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    Some((id.as_str(), name.as_str(), input))
                }
                _ => None,
            })
            .collect()
    }
}

/// Why the model stopped emitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
}

/// The model service, reduced to a single request/response operation.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name, for diagnostics.
    fn provider_name(&self) -> &str;

    /// Send the conversation and tool definitions, get back content blocks.
    async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse, GantryError>;
}
