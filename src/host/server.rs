//! Unix socket server for the host process.
//!
//! Each connection carries exactly one request and one response.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::{timeout, Duration};

use crate::types::{ErrorCode, InvokeRequest, InvokeResponse};

use super::handler::{dispatch, HostHandler};

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (64KB)
const MAX_REQUEST_SIZE: u64 = 65536;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// First pause after a failed accept, doubled per consecutive failure
const ACCEPT_BACKOFF_MS: u64 = 50;

/// Upper bound for the accept backoff
const MAX_ACCEPT_BACKOFF_MS: u64 = 2000;

/// Pause before retrying after `consecutive_failures` failed accepts.
fn accept_backoff(consecutive_failures: u32) -> Duration {
    let factor = 1u64 << consecutive_failures.saturating_sub(1).min(16);
    Duration::from_millis((ACCEPT_BACKOFF_MS * factor).min(MAX_ACCEPT_BACKOFF_MS))
}

// ============================================================================
// HostError
// ============================================================================

/// Host socket error types.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,

    /// The client closed the connection without sending anything
    #[error("Connection closed by client")]
    EmptyRequest,
}

// ============================================================================
// HostServer
// ============================================================================

/// Unix domain socket server that dispatches gateway commands.
pub struct HostServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl HostServer {
    /// Binds a server to `socket_path`.
    ///
    /// A stale socket file is removed and the parent directory is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        tracing::info!(path = %socket_path.display(), "Host listening");

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Reads one request; the client signals its end by shutting down writes.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<InvokeRequest> {
        let mut buffer = Vec::new();

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            (&mut *stream)
                .take(MAX_REQUEST_SIZE + 1)
                .read_to_end(&mut buffer),
        )
        .await;

        match read_result {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(HostError::ReadError(e.to_string()).into()),
            Err(_) => return Err(HostError::Timeout.into()),
        }

        if buffer.is_empty() {
            return Err(HostError::EmptyRequest.into());
        }
        if buffer.len() as u64 > MAX_REQUEST_SIZE {
            return Err(HostError::RequestTooLarge.into());
        }

        let request: InvokeRequest =
            serde_json::from_slice(&buffer).context("Failed to deserialize request")?;

        Ok(request)
    }

    /// Writes one response.
    pub async fn send_response(stream: &mut UnixStream, response: &InvokeResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Accepts one connection and answers its request.
    ///
    /// Unreadable requests are answered with an error response.
    pub async fn serve_one<H: HostHandler>(&self, handler: &H) -> Result<()> {
        let stream = self.accept().await?;
        Self::serve_stream(stream, handler).await
    }

    /// Answers the single request carried by `stream`.
    pub async fn serve_stream<H: HostHandler>(mut stream: UnixStream, handler: &H) -> Result<()> {
        let response = match Self::receive_request(&mut stream).await {
            Ok(request) => dispatch(handler, request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected request");
                InvokeResponse::error(
                    format!("Invalid request: {e}"),
                    Some(ErrorCode::BackendFailure),
                )
            }
        };

        Self::send_response(&mut stream, &response).await
    }

    /// Serves connections one after another until the task is dropped.
    ///
    /// Repeated accept failures back off before retrying.
    pub async fn run<H: HostHandler>(&self, handler: &H) -> Result<()> {
        let mut failures: u32 = 0;
        loop {
            let stream = match self.accept().await {
                Ok(stream) => {
                    failures = 0;
                    stream
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    let pause = accept_backoff(failures);
                    tracing::warn!(error = %e, retry_in_ms = pause.as_millis() as u64, "Accept failed");
                    tokio::time::sleep(pause).await;
                    continue;
                }
            };

            if let Err(e) = Self::serve_stream(stream, handler).await {
                tracing::warn!(error = %e, "Connection failed");
            }
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for HostServer {
    fn drop(&mut self) {
        // Clean up socket file on drop
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// Tests
// ============================================================================
