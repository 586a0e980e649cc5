//! Environment-driven configuration.

use std::path::PathBuf;
use std::time::Duration;

/// How to launch the tool-providing process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub command: String,
    pub args: Vec<String>,
}

impl ServerConfig {
    /// Parse a whitespace-separated command line, e.g. `"python server.py"`.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let command = parts.next()?;
        Some(Self {
            command,
            args: parts.collect(),
        })
    }
}

/// Configuration for an orchestration run.
///
/// Resolution order: explicit setters > environment (`.env` supported) >
/// built-in defaults.
#[derive(Debug, Clone)]
pub struct GantryConfig {
    /// API key for the model service.
    pub api_key: Option<String>,
    /// Base URL override for the model service.
    pub base_url: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Output-token budget per model request.
    pub max_tokens: u32,
    /// Upper bound on model round-trips per run.
    pub max_turns: usize,
    /// Timeout for a single protocol request/response exchange.
    pub protocol_timeout: Duration,
    /// Tool server launch configuration; `None` means snapshot-only.
    pub server: Option<ServerConfig>,
    /// Substitute recorded snapshots when the live connection fails.
    pub allow_snapshot_fallback: bool,
    /// Skip the live connection entirely and run from snapshots.
    pub offline: bool,
    /// Override path for the tool-listing snapshot.
    pub tools_snapshot_path: Option<PathBuf>,
    /// Override path for the tool-invocation snapshot.
    pub call_snapshot_path: Option<PathBuf>,
}

impl Default for GantryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 1024,
            max_turns: 16,
            protocol_timeout: Duration::from_secs(60),
            server: None,
            allow_snapshot_fallback: true,
            offline: false,
            tools_snapshot_path: None,
            call_snapshot_path: None,
        }
    }
}

impl GantryConfig {
    /// Load from environment variables (ANTHROPIC_API_KEY, GANTRY_*).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::default();

        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("ANTHROPIC_BASE_URL") {
            config.base_url = Some(url);
        }
        if let Ok(model) = std::env::var("GANTRY_MODEL") {
            config.model = model;
        }
        if let Ok(raw) = std::env::var("GANTRY_MAX_TOKENS") {
            if let Ok(value) = raw.parse() {
                config.max_tokens = value;
            }
        }
        if let Ok(raw) = std::env::var("GANTRY_MAX_TURNS") {
            if let Ok(value) = raw.parse() {
                config.max_turns = value;
            }
        }
        if let Ok(raw) = std::env::var("GANTRY_PROTOCOL_TIMEOUT_MS") {
            if let Ok(value) = raw.parse() {
                config.protocol_timeout = Duration::from_millis(value);
            }
        }
        if let Ok(raw) = std::env::var("GANTRY_SERVER_CMD") {
            config.server = ServerConfig::parse(&raw);
        }
        if let Ok(raw) = std::env::var("GANTRY_OFFLINE") {
            config.offline = raw == "1" || raw.eq_ignore_ascii_case("true");
        }
        if let Ok(raw) = std::env::var("GANTRY_SNAPSHOT_FALLBACK") {
            config.allow_snapshot_fallback = raw != "0" && !raw.eq_ignore_ascii_case("false");
        }
        if let Ok(path) = std::env::var("GANTRY_TOOLS_SNAPSHOT") {
            config.tools_snapshot_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("GANTRY_CALL_SNAPSHOT") {
            config.call_snapshot_path = Some(PathBuf::from(path));
        }

        config
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = Some(server);
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }
}
