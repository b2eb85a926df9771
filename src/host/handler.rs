//! Command dispatch on the host side.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::gateway::{BackendError, Command};
use crate::types::{CommandArgs, ErrorCode, InvokeRequest, InvokeResponse};

/// Executes gateway commands inside the host process.
pub trait HostHandler {
    /// Runs one command.
    ///
    /// # Errors
    ///
    /// Returns the error text (and optional code) reported back to the gateway.
    async fn handle(&self, command: Command, args: CommandArgs) -> Result<Value, BackendError>;
}

/// Turns a request into a response using `handler`.
///
/// Unknown command names and handler failures become error responses.
pub async fn dispatch<H: HostHandler>(handler: &H, request: InvokeRequest) -> InvokeResponse {
    let command = match request.command.parse::<Command>() {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!(id = %request.id, "{}", e);
            return InvokeResponse::error(e.to_string(), Some(ErrorCode::BackendFailure));
        }
    };

    tracing::debug!(id = %request.id, command = command.name(), "Handling command");

    match handler.handle(command, request.args).await {
        Ok(data) => InvokeResponse::success(data),
        Err(err) => {
            tracing::debug!(id = %request.id, command = command.name(), error = %err, "Command failed");
            InvokeResponse::error(err.message, err.code)
        }
    }
}

/// Reads argument `key`; a missing key reads as `null`.
pub fn arg<T: DeserializeOwned>(args: &CommandArgs, key: &str) -> Result<T, BackendError> {
    let value = args.get(key).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|e| BackendError::new(format!("Invalid argument `{key}`: {e}")))
}

/// Serializes a command result.
pub fn to_json<T: Serialize>(value: T) -> Result<Value, BackendError> {
    serde_json::to_value(value)
        .map_err(|e| BackendError::new(format!("Failed to serialize result: {e}")))
}
