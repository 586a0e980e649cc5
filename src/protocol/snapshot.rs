//! Recorded protocol responses for degraded (offline) operation.
//!
//! The embedded snapshots mirror the live protocol's response shapes
//! exactly; file overrides let a deployment record fresher ones.

use std::path::Path;

use crate::config::GantryConfig;
use crate::error::GantryError;

use super::wire::{CallToolResult, ListToolsResult, ToolDescriptor};

const TOOLS_SNAPSHOT: &str = include_str!("../../data/tools_snapshot.json");
const CALL_SNAPSHOT: &str = include_str!("../../data/call_snapshot.json");

/// Previously recorded `tools/list` and `tools/call` responses.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    tools: Vec<ToolDescriptor>,
    call: CallToolResult,
}

impl SnapshotStore {
    /// Load snapshots: configured file overrides first, embedded defaults
    /// otherwise.
    pub fn load(config: &GantryConfig) -> Result<Self, GantryError> {
        let tools = match &config.tools_snapshot_path {
            Some(path) => parse_tools(&read_snapshot(path)?)?,
            None => parse_tools(TOOLS_SNAPSHOT)?,
        };
        let call = match &config.call_snapshot_path {
            Some(path) => parse_call(&read_snapshot(path)?)?,
            None => parse_call(CALL_SNAPSHOT)?,
        };
        Ok(Self { tools, call })
    }

    /// The recorded tool listing.
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// The recorded invocation result, served for any known tool.
    pub fn call_result(&self) -> CallToolResult {
        self.call.clone()
    }

    /// Whether the recorded listing advertises the named tool.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|tool| tool.name == name)
    }
}

fn read_snapshot(path: &Path) -> Result<String, GantryError> {
    std::fs::read_to_string(path).map_err(|e| {
        GantryError::Configuration(format!("cannot read snapshot {}: {e}", path.display()))
    })
}

fn parse_tools(raw: &str) -> Result<Vec<ToolDescriptor>, GantryError> {
    let listed: ListToolsResult = serde_json::from_str(raw)
        .map_err(|e| GantryError::Configuration(format!("malformed tools snapshot: {e}")))?;
    Ok(listed.tools)
}

fn parse_call(raw: &str) -> Result<CallToolResult, GantryError> {
    serde_json::from_str(raw)
        .map_err(|e| GantryError::Configuration(format!("malformed call snapshot: {e}")))
}
