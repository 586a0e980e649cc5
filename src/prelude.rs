//! Convenience re-exports for common use.

pub use crate::config::{GantryConfig, ServerConfig};
pub use crate::error::{GantryError, Result};
pub use crate::orchestrator::{Orchestrator, OutputSegment, RunReport};
pub use crate::protocol::{ProtocolSession, SessionState};
pub use crate::provider::{ModelProvider, ModelRequest, ModelResponse};
pub use crate::tools::{SessionMode, ToolBackend, ToolInvoker, ToolRegistry};
pub use crate::types::{ContentBlock, Message, Role, Tool, ToolInvocationResult};
