//! Protocol session: lifecycle and request/response correlation.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::error::GantryError;
use crate::util::timeout::with_timeout;

use super::transport::{StdioTransport, Transport};
use super::wire::{
    self, CallToolResult, IncomingFrame, InitializeResult, ListToolsResult, RpcError, ServerInfo,
    ToolDescriptor,
};

/// Connection lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Ready,
    Busy,
}

/// A live connection to the tool-providing process.
///
/// Owns exactly one transport (and through it one child process); never
/// shared between concurrent orchestration runs. Exactly one request is in
/// flight at a time.
pub struct ProtocolSession {
    transport: Box<dyn Transport>,
    state: SessionState,
    next_id: u64,
    timeout: Duration,
    server_info: Option<ServerInfo>,
}

impl ProtocolSession {
    /// Create a session over an already-open transport. The initialize
    /// handshake still has to be performed before any tool call.
    pub fn new(transport: Box<dyn Transport>, timeout: Duration) -> Self {
        Self {
            transport,
            state: SessionState::Disconnected,
            next_id: 1,
            timeout,
            server_info: None,
        }
    }

    /// Spawn the configured server process and perform the handshake.
    pub async fn connect(server: &ServerConfig, timeout: Duration) -> Result<Self, GantryError> {
        let transport = StdioTransport::spawn(&server.command, &server.args)?;
        let mut session = Self::new(Box::new(transport), timeout);
        session.initialize().await?;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Info reported by the server during the handshake.
    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server_info.as_ref()
    }

    /// Perform the initialize handshake. Must complete before `list_tools`
    /// or `call_tool` is permitted.
    pub async fn initialize(&mut self) -> Result<(), GantryError> {
        if self.state != SessionState::Disconnected {
            return Err(GantryError::InvalidState(
                "session is already initialized".into(),
            ));
        }
        self.state = SessionState::Connecting;

        let id = self.take_id();
        let outcome = self.exchange(id, wire::initialize_request(id)).await;
        let result = match outcome {
            Ok(Ok(value)) => value,
            Ok(Err(rpc)) => {
                self.fail().await;
                return Err(connection_error("initialize rejected", &rpc));
            }
            Err(err) => {
                self.fail().await;
                return Err(err);
            }
        };

        let init: InitializeResult = match serde_json::from_value(result) {
            Ok(init) => init,
            Err(e) => {
                self.fail().await;
                return Err(GantryError::Connection(format!(
                    "malformed initialize response: {e}"
                )));
            }
        };
        debug!(
            protocol = %init.protocol_version,
            server = init.server_info.as_ref().map(|s| s.name.as_str()),
            "handshake complete"
        );
        self.server_info = init.server_info;

        if let Err(err) = self.transport.send(wire::initialized_notification()).await {
            self.fail().await;
            return Err(err);
        }
        self.state = SessionState::Ready;
        Ok(())
    }

    /// List the tools the connected process advertises.
    pub async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, GantryError> {
        self.ensure_ready()?;
        let payload = self
            .roundtrip("tools/list", serde_json::json!({}))
            .await?
            .map_err(|rpc| connection_error("tools/list failed", &rpc))?;

        let listed: ListToolsResult = serde_json::from_value(payload).map_err(|e| {
            GantryError::Connection(format!("malformed tool listing: {e}"))
        })?;
        Ok(listed.tools)
    }

    /// Execute a tool on the connected process.
    ///
    /// A result with `is_error: true` is returned as `Ok`; only rejections
    /// reported through the protocol error channel (unknown tool, argument
    /// validation, internal failure) become `ToolExecution` errors.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, GantryError> {
        self.ensure_ready()?;
        let params = serde_json::json!({
            "name": name,
            "arguments": arguments,
        });
        let payload = self
            .roundtrip("tools/call", params)
            .await?
            .map_err(|rpc| GantryError::ToolExecution {
                tool_name: name.to_string(),
                message: rpc.message,
            })?;

        serde_json::from_value(payload).map_err(|e| {
            GantryError::Connection(format!("malformed tool result: {e}"))
        })
    }

    /// Tear the session down, releasing the child process.
    pub async fn shutdown(&mut self) -> Result<(), GantryError> {
        self.state = SessionState::Disconnected;
        self.transport.close().await
    }

    fn ensure_ready(&self) -> Result<(), GantryError> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Disconnected => Err(GantryError::InvalidState(
                "session is not connected; initialize first".into(),
            )),
            SessionState::Connecting => Err(GantryError::InvalidState(
                "session handshake has not completed".into(),
            )),
            SessionState::Busy => Err(GantryError::InvalidState(
                "a request is already in flight".into(),
            )),
        }
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// One request/response exchange. Transport-level failures poison the
    /// session; a server-reported RPC error leaves it usable.
    async fn roundtrip(
        &mut self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Result<serde_json::Value, RpcError>, GantryError> {
        let id = self.take_id();
        self.state = SessionState::Busy;
        let outcome = self.exchange(id, wire::request(id, method, params)).await;
        match outcome {
            Ok(result) => {
                self.state = SessionState::Ready;
                Ok(result)
            }
            Err(err) => {
                self.fail().await;
                Err(err)
            }
        }
    }

    async fn exchange(
        &mut self,
        id: u64,
        frame: serde_json::Value,
    ) -> Result<Result<serde_json::Value, RpcError>, GantryError> {
        self.transport.send(frame).await?;

        loop {
            let raw = with_timeout(self.timeout, self.transport.receive()).await?;
            let incoming: IncomingFrame = serde_json::from_value(raw).map_err(|e| {
                GantryError::Connection(format!("unrecognized frame from tool process: {e}"))
            })?;

            // Server-initiated notifications (logging, progress) may
            // interleave with the response; they are not ours to answer.
            if incoming.is_server_initiated() {
                debug!(method = incoming.method.as_deref(), "skipping server frame");
                continue;
            }

            let matches_id = incoming
                .id
                .as_ref()
                .and_then(|v| v.as_u64())
                .map(|v| v == id)
                .unwrap_or(false);
            if !matches_id {
                return Err(GantryError::Connection(format!(
                    "response id mismatch: expected {id}, got {:?}",
                    incoming.id
                )));
            }

            if let Some(error) = incoming.error {
                return Ok(Err(error));
            }
            return Ok(Ok(incoming.result.unwrap_or(serde_json::Value::Null)));
        }
    }

    async fn fail(&mut self) {
        self.state = SessionState::Disconnected;
        if let Err(err) = self.transport.close().await {
            warn!(error = %err, "transport close failed during teardown");
        }
    }
}

fn connection_error(context: &str, rpc: &RpcError) -> GantryError {
    GantryError::Connection(format!("{context}: RPC error {}: {}", rpc.code, rpc.message))
}
