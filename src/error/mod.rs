//! Error types for gantry.

use thiserror::Error;

/// Primary error type for all gantry operations.
#[derive(Error, Debug)]
pub enum GantryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The tool process is unreachable, the handshake failed, or the
    /// protocol exchange broke down (malformed frames, id mismatch, EOF).
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Model service error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The model request succeeded at the HTTP layer but the response
    /// content could not be interpreted.
    #[error("Model service error: {0}")]
    ModelService(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// The tool process rejected or failed a tool invocation. Folded back
    /// into the conversation as an error result, not surfaced to the caller.
    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The orchestration loop guard tripped. Carries whatever output had
    /// been accumulated so the caller never sees a silent empty result.
    #[error("Turn limit exceeded after {turns} turns")]
    TurnLimitExceeded { turns: usize, partial_output: String },
}

/// Coarse classification used by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Connection,
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Serialization,
    Server,
    Api,
    ToolExecution,
    Unknown,
}

impl GantryError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Connection(_) => ErrorCategory::Connection,
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::ToolExecution { .. } => ErrorCategory::ToolExecution,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GantryError>;
