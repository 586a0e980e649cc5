//! Tool-access backends: live protocol session or recorded snapshots.
//!
//! The two paths implement one trait, selected at connect time by
//! configuration; call sites never branch on the mode themselves.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::GantryConfig;
use crate::error::GantryError;
use crate::protocol::session::ProtocolSession;
use crate::protocol::snapshot::SnapshotStore;
use crate::protocol::wire::{CallToolResult, ToolDescriptor};

/// Which path a session is serving from. Observable so callers and tests
/// can assert whether a result is live or recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Live,
    Degraded,
}

/// Access to the tool surface of the connected (or recorded) process.
#[async_trait]
pub trait ToolBackend: Send {
    fn mode(&self) -> SessionMode;

    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, GantryError>;

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, GantryError>;

    /// Release the underlying resources, if any.
    async fn shutdown(&mut self) -> Result<(), GantryError>;
}

/// Backend over a live protocol session.
pub struct LiveBackend {
    session: ProtocolSession,
}

impl LiveBackend {
    pub fn new(session: ProtocolSession) -> Self {
        Self { session }
    }

    /// Spawn and handshake with the configured server.
    pub async fn connect(config: &GantryConfig) -> Result<Self, GantryError> {
        let server = config.server.as_ref().ok_or_else(|| {
            GantryError::Configuration("no tool server configured".into())
        })?;
        let session = ProtocolSession::connect(server, config.protocol_timeout).await?;
        Ok(Self::new(session))
    }
}

#[async_trait]
impl ToolBackend for LiveBackend {
    fn mode(&self) -> SessionMode {
        SessionMode::Live
    }

    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, GantryError> {
        self.session.list_tools().await
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, GantryError> {
        self.session.call_tool(name, arguments).await
    }

    async fn shutdown(&mut self) -> Result<(), GantryError> {
        self.session.shutdown().await
    }
}

/// Backend serving recorded snapshots, for demos and offline use.
pub struct SnapshotBackend {
    store: SnapshotStore,
}

impl SnapshotBackend {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }

    pub fn from_config(config: &GantryConfig) -> Result<Self, GantryError> {
        Ok(Self::new(SnapshotStore::load(config)?))
    }
}

#[async_trait]
impl ToolBackend for SnapshotBackend {
    fn mode(&self) -> SessionMode {
        SessionMode::Degraded
    }

    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, GantryError> {
        Ok(self.store.tools().to_vec())
    }

    async fn call_tool(
        &mut self,
        name: &str,
        _arguments: serde_json::Value,
    ) -> Result<CallToolResult, GantryError> {
        // Parity with the live path: tools the listing does not advertise
        // are rejected the same way a server would reject them.
        if !self.store.has_tool(name) {
            return Err(GantryError::ToolExecution {
                tool_name: name.to_string(),
                message: "unknown tool in recorded snapshot".into(),
            });
        }
        Ok(self.store.call_result())
    }

    async fn shutdown(&mut self) -> Result<(), GantryError> {
        Ok(())
    }
}

/// Select a backend per configuration: live when possible, snapshots when
/// configured offline or as fallback after a failed connection.
pub async fn connect_or_fallback(
    config: &GantryConfig,
) -> Result<Box<dyn ToolBackend>, GantryError> {
    if config.offline {
        info!("offline mode configured; serving recorded snapshots");
        return Ok(Box::new(SnapshotBackend::from_config(config)?));
    }

    match config.server {
        Some(_) => match LiveBackend::connect(config).await {
            Ok(backend) => Ok(Box::new(backend)),
            Err(err) if config.allow_snapshot_fallback => {
                warn!(error = %err, "tool server unreachable; degrading to recorded snapshots");
                Ok(Box::new(SnapshotBackend::from_config(config)?))
            }
            Err(err) => Err(err),
        },
        None if config.allow_snapshot_fallback => {
            info!("no tool server configured; serving recorded snapshots");
            Ok(Box::new(SnapshotBackend::from_config(config)?))
        }
        None => Err(GantryError::Configuration(
            "no tool server configured and snapshot fallback disabled".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use serde_json::json;

    #[tokio::test]
    async fn snapshot_backend_reports_degraded_mode() {
        let mut backend = SnapshotBackend::from_config(&GantryConfig::default()).unwrap();
        assert_eq!(backend.mode(), SessionMode::Degraded);

        let tools = backend.list_tools().await.unwrap();
        assert!(tools.iter().any(|tool| tool.name == "create_object"));
    }

    #[tokio::test]
    async fn snapshot_backend_rejects_unknown_tools() {
        let mut backend = SnapshotBackend::from_config(&GantryConfig::default()).unwrap();
        let err = backend
            .call_tool("bend_spoon", json!({}))
            .await
            .expect_err("unadvertised tool should be rejected");
        assert!(matches!(err, GantryError::ToolExecution { tool_name, .. } if tool_name == "bend_spoon"));
    }

    #[tokio::test]
    async fn unreachable_server_degrades_when_fallback_allowed() {
        let config = GantryConfig::default().with_server(ServerConfig {
            command: "gantry-no-such-server-binary".into(),
            args: Vec::new(),
        });
        let backend = connect_or_fallback(&config).await.unwrap();
        assert_eq!(backend.mode(), SessionMode::Degraded);
    }

    #[tokio::test]
    async fn unreachable_server_fails_when_fallback_disabled() {
        let mut config = GantryConfig::default().with_server(ServerConfig {
            command: "gantry-no-such-server-binary".into(),
            args: Vec::new(),
        });
        config.allow_snapshot_fallback = false;
        let err = connect_or_fallback(&config)
            .await
            .err()
            .expect("no fallback allowed");
        assert!(matches!(err, GantryError::Connection(_)));
    }

    #[tokio::test]
    async fn no_server_and_no_fallback_is_a_configuration_error() {
        let mut config = GantryConfig::default();
        config.allow_snapshot_fallback = false;
        let err = connect_or_fallback(&config)
            .await
            .err()
            .expect("nothing to serve from");
        assert!(matches!(err, GantryError::Configuration(_)));
    }
}
