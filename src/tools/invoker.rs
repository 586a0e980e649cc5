//! Tool invocation with mandatory result sanitation.

use crate::error::GantryError;
use crate::types::ToolInvocationResult;

use super::backend::ToolBackend;
use super::sanitize::strip_annotations;

/// Dispatches a single tool call and normalizes the result.
pub struct ToolInvoker;

impl ToolInvoker {
    /// Invoke the named tool and strip annotations from every result item
    /// before it can reach the conversation.
    pub async fn invoke(
        backend: &mut dyn ToolBackend,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolInvocationResult, GantryError> {
        let raw = backend.call_tool(name, arguments).await?;
        Ok(ToolInvocationResult {
            content: raw.content.into_iter().map(strip_annotations).collect(),
            is_error: raw.is_error,
        })
    }
}
