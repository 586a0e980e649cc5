//! The conversation orchestrator: the multi-turn tool-use loop.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::GantryConfig;
use crate::error::GantryError;
use crate::provider::{AnthropicProvider, ModelProvider, ModelRequest};
use crate::tools::{connect_or_fallback, SessionMode, ToolBackend, ToolInvoker, ToolRegistry};
use crate::types::{ContentBlock, Message, ToolInvocationResult};
use crate::util::retry::RetryPolicy;

/// One piece of the running output, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputSegment {
    /// Text the model produced.
    Text(String),
    /// A human-readable trace of one tool invocation.
    ToolTrace { name: String, args: String },
}

impl OutputSegment {
    fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::ToolTrace { name, args } => {
                format!("[Calling tool {name} with args {args}]")
            }
        }
    }
}

/// Read-only projection of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    /// All text contributions and trace lines, in emission order.
    pub text: String,
    pub segments: Vec<OutputSegment>,
    /// The full conversation as it was sent to the model.
    pub transcript: Vec<Message>,
    /// Model round-trips used.
    pub turns: usize,
    /// Tool invocations performed.
    pub tool_calls: usize,
    pub mode: SessionMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// The final model answer: the last text the model emitted, if any.
    pub fn last_answer(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|segment| match segment {
            OutputSegment::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

fn render_segments(segments: &[OutputSegment]) -> String {
    segments
        .iter()
        .map(OutputSegment::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drives the conversation loop: model request, tool dispatch, repeat.
///
/// Owns its backend exclusively; a second concurrent conversation gets its
/// own orchestrator and its own tool-process connection.
pub struct Orchestrator {
    provider: Box<dyn ModelProvider>,
    backend: Box<dyn ToolBackend>,
    registry: ToolRegistry,
    model: String,
    max_tokens: u32,
    max_turns: usize,
    retry: RetryPolicy,
}

impl Orchestrator {
    /// Connect per configuration: Anthropic provider plus a live or
    /// degraded tool backend.
    pub async fn connect(config: &GantryConfig) -> Result<Self, GantryError> {
        let provider = Box::new(AnthropicProvider::from_config(config)?);
        let backend = connect_or_fallback(config).await?;
        Ok(Self::new(provider, backend, config))
    }

    /// Assemble from parts. Used directly by tests and embedders.
    pub fn new(
        provider: Box<dyn ModelProvider>,
        backend: Box<dyn ToolBackend>,
        config: &GantryConfig,
    ) -> Self {
        Self {
            provider,
            backend,
            registry: ToolRegistry::new(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            max_turns: config.max_turns,
            retry: RetryPolicy::default(),
        }
    }

    /// Which path tool access is served from.
    pub fn mode(&self) -> SessionMode {
        self.backend.mode()
    }

    /// Process a query and return the accumulated output text.
    pub async fn process_query(&mut self, query: &str) -> Result<String, GantryError> {
        self.run(query).await.map(|report| report.text)
    }

    /// Process a query and return the full run report.
    pub async fn run(&mut self, query: &str) -> Result<RunReport, GantryError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        self.registry.refresh(self.backend.as_mut()).await?;
        debug!(run_id = %run_id, tools = self.registry.tools().len(), "run start");

        // History is owned by this run alone and only ever appended to.
        let mut history: Vec<Message> = vec![Message::user(query)];
        let mut segments: Vec<OutputSegment> = Vec::new();
        let mut tool_calls = 0usize;
        let mut turns = 0usize;

        loop {
            if turns >= self.max_turns {
                return Err(GantryError::TurnLimitExceeded {
                    turns,
                    partial_output: render_segments(&segments),
                });
            }
            turns += 1;

            let request = ModelRequest {
                messages: history.clone(),
                tools: self.registry.tools().to_vec(),
                max_tokens: self.max_tokens,
                model: self.model.clone(),
            };
            let response = self
                .retry
                .execute(|| self.provider.complete(&request))
                .await?;

            for block in &response.content {
                if let ContentBlock::Text { text } = block {
                    if !text.is_empty() {
                        segments.push(OutputSegment::Text(text.clone()));
                    }
                }
            }

            let tool_uses: Vec<(String, String, serde_json::Value)> = response
                .tool_uses()
                .into_iter()
                .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
                .collect();

            // No tool use means the model is done; a zero-block response
            // lands here too, contributing nothing.
            if tool_uses.is_empty() {
                break;
            }

            history.push(Message::assistant(response.content.clone()));

            // Tool calls of one turn run one at a time, in emission order;
            // each result is appended before the next tool is invoked.
            for (id, name, input) in tool_uses {
                let args = serde_json::to_string(&input)?;
                info!(tool = %name, "invoking tool");
                segments.push(OutputSegment::ToolTrace {
                    name: name.clone(),
                    args,
                });

                let invocation =
                    match ToolInvoker::invoke(self.backend.as_mut(), &name, input).await {
                        Ok(result) => result,
                        // Tool-level rejections are folded back into the
                        // conversation so the model can adapt.
                        Err(GantryError::ToolExecution { message, .. }) => ToolInvocationResult {
                            content: vec![serde_json::json!({
                                "type": "text",
                                "text": message,
                            })],
                            is_error: true,
                        },
                        Err(err) => return Err(err),
                    };

                tool_calls += 1;
                let is_error = invocation.is_error;
                history.push(Message::tool_result(
                    id,
                    invocation.into_content_value(),
                    is_error,
                ));
            }
        }

        debug!(run_id = %run_id, turns, tool_calls, "run complete");
        Ok(RunReport {
            run_id,
            text: render_segments(&segments),
            segments,
            transcript: history,
            turns,
            tool_calls,
            mode: self.backend.mode(),
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Release the tool backend's resources.
    pub async fn shutdown(&mut self) -> Result<(), GantryError> {
        self.backend.shutdown().await
    }
}
