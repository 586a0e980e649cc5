//! Core types for gantry.

pub mod message;

pub use message::*;

use serde::{Deserialize, Serialize};

/// A tool advertised by the connected process, in the model-facing shape:
/// name, description, and input schema, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// A normalized tool invocation outcome, after sanitation.
///
/// `is_error` results are folded into the conversation like any other so
/// the model gets a chance to recover; they are not local failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocationResult {
    pub content: Vec<serde_json::Value>,
    pub is_error: bool,
}

impl ToolInvocationResult {
    /// Render the content items as a single JSON value for a result block.
    pub fn into_content_value(self) -> serde_json::Value {
        serde_json::Value::Array(self.content)
    }
}
