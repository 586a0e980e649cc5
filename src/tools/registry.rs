//! Tool registry: the model-facing view of the advertised tool set.

use tracing::warn;

use crate::error::GantryError;
use crate::protocol::wire::ToolDescriptor;
use crate::types::Tool;

use super::backend::{SessionMode, ToolBackend};

/// Cache of the last successful tool listing.
///
/// The set is replaced wholesale on every successful refresh, never merged
/// incrementally. A failed refresh keeps the last known-good snapshot.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    origin: Option<SessionMode>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the current listing from the backend.
    ///
    /// On failure with a previous listing in hand, the stale set is kept
    /// and returned; with nothing cached the error propagates.
    pub async fn refresh(&mut self, backend: &mut dyn ToolBackend) -> Result<&[Tool], GantryError> {
        match backend.list_tools().await {
            Ok(descriptors) => {
                self.tools = descriptors.into_iter().map(tool_from_descriptor).collect();
                self.origin = Some(backend.mode());
                Ok(&self.tools)
            }
            Err(err) if !self.tools.is_empty() => {
                warn!(error = %err, "tool listing failed; keeping last known-good registry");
                Ok(&self.tools)
            }
            Err(err) => Err(err),
        }
    }

    /// The cached tool set in model-facing shape.
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Where the cached set came from, if a refresh has succeeded.
    pub fn origin(&self) -> Option<SessionMode> {
        self.origin
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|tool| tool.name == name)
    }
}

fn tool_from_descriptor(descriptor: ToolDescriptor) -> Tool {
    Tool {
        name: descriptor.name,
        description: descriptor.description.unwrap_or_default(),
        input_schema: descriptor.input_schema,
    }
}
