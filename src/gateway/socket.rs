//! Unix socket transport to the host process.
//!
//! One request per connection: the request JSON is written, the write side
//! is shut down, and the response JSON is read until the host closes.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use crate::config::default_socket_path;
use crate::types::{CommandArgs, InvokeRequest, InvokeResponse};

use super::command::Command;
use super::error::{BackendError, InvokeError};
use super::invoker::Invoker;

/// Maximum response size in bytes (4MB)
const MAX_RESPONSE_SIZE: u64 = 4 * 1024 * 1024;

// ============================================================================
// SocketInvoker
// ============================================================================

/// Invokes host commands over a Unix domain socket.
#[derive(Debug, Clone)]
pub struct SocketInvoker {
    /// Socket path
    socket_path: PathBuf,
}

impl SocketInvoker {
    /// Creates an invoker for the default socket path.
    pub fn new() -> Result<Self> {
        Ok(Self {
            socket_path: default_socket_path()?,
        })
    }

    /// Creates an invoker for a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Sends a single request to the host.
    async fn send_request(&self, request: &InvokeRequest) -> Result<InvokeResponse, InvokeError> {
        let mut stream = UnixStream::connect(&self.socket_path).await.map_err(|e| {
            InvokeError::Connection(format!(
                "Cannot reach host at {}: {}",
                self.socket_path.display(),
                e
            ))
        })?;

        let request_json =
            serde_json::to_vec(request).map_err(|e| InvokeError::Serialization(e.to_string()))?;

        stream
            .write_all(&request_json)
            .await
            .map_err(|e| InvokeError::Connection(format!("Failed to send request: {e}")))?;
        stream
            .flush()
            .await
            .map_err(|e| InvokeError::Connection(format!("Failed to flush request: {e}")))?;

        // Shutdown write side to signal end of request
        stream
            .shutdown()
            .await
            .map_err(|e| InvokeError::Connection(format!("Failed to shut down write side: {e}")))?;

        let mut buffer = Vec::new();
        (&mut stream)
            .take(MAX_RESPONSE_SIZE)
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| InvokeError::Connection(format!("Failed to read response: {e}")))?;

        if buffer.is_empty() {
            return Err(InvokeError::Connection(
                "Host closed the connection without a response".to_string(),
            ));
        }

        serde_json::from_slice(&buffer).map_err(|e| InvokeError::Serialization(e.to_string()))
    }
}

impl Invoker for SocketInvoker {
    async fn invoke(&self, command: Command, args: CommandArgs) -> Result<Value, InvokeError> {
        let request = InvokeRequest::new(command.name(), args);
        tracing::debug!(id = %request.id, command = command.name(), "Invoking host command");

        let response = self.send_request(&request).await?;

        if response.is_error() {
            return Err(BackendError {
                message: response.message,
                code: response.code,
            }
            .into());
        }

        Ok(response.data.unwrap_or(Value::Null))
    }
}

// ============================================================================
// Tests
// ============================================================================
