//! Wire transport for the tool-process protocol.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::error::GantryError;

/// Transport carrying newline-delimited JSON frames.
#[async_trait]
pub trait Transport: Send {
    /// Send a single JSON frame.
    async fn send(&mut self, message: serde_json::Value) -> Result<(), GantryError>;

    /// Receive the next JSON frame.
    async fn receive(&mut self) -> Result<serde_json::Value, GantryError>;

    /// Close the transport, releasing the underlying resources.
    async fn close(&mut self) -> Result<(), GantryError>;
}

/// Stdio transport that owns the spawned tool-server process.
///
/// The child is spawned with `kill_on_drop` so the process is released on
/// every exit path, including panics and cancelled calls.
pub struct StdioTransport {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    closed: bool,
}

impl StdioTransport {
    /// Spawn the tool server and attach to its stdio.
    pub fn spawn(command: &str, args: &[String]) -> Result<Self, GantryError> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GantryError::Connection(format!("failed to spawn {command}: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GantryError::Connection("tool process stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GantryError::Connection("tool process stdout unavailable".into()))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            closed: false,
        })
    }

    fn ensure_open(&self) -> Result<(), GantryError> {
        if self.closed {
            return Err(GantryError::Connection("transport closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn send(&mut self, message: serde_json::Value) -> Result<(), GantryError> {
        self.ensure_open()?;
        let mut line = serde_json::to_string(&message)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await.map_err(|e| {
            self.closed = true;
            GantryError::Connection(format!("write to tool process failed: {e}"))
        })?;
        self.stdin.flush().await.map_err(|e| {
            self.closed = true;
            GantryError::Connection(format!("flush to tool process failed: {e}"))
        })?;
        Ok(())
    }

    async fn receive(&mut self) -> Result<serde_json::Value, GantryError> {
        self.ensure_open()?;
        let mut line = String::new();
        loop {
            line.clear();
            let read = self.stdout.read_line(&mut line).await.map_err(|e| {
                self.closed = true;
                GantryError::Connection(format!("read from tool process failed: {e}"))
            })?;
            if read == 0 {
                self.closed = true;
                return Err(GantryError::Connection(
                    "tool process closed the connection".into(),
                ));
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return serde_json::from_str(trimmed).map_err(|e| {
                GantryError::Connection(format!("malformed frame from tool process: {e}"))
            });
        }
    }

    async fn close(&mut self) -> Result<(), GantryError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // EOF on stdin lets a well-behaved server exit on its own; escalate
        // to a kill if it does not.
        let _ = self.stdin.shutdown().await;
        match tokio::time::timeout(Duration::from_secs(2), self.child.wait()).await {
            Ok(_) => {}
            Err(_) => {
                let _ = self.child.start_kill();
            }
        }
        Ok(())
    }
}
