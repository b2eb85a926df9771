//! The seam between the gateway and the host process.

use serde_json::Value;

use crate::types::CommandArgs;

use super::command::Command;
use super::error::InvokeError;

/// Issues one named command to the host and returns its raw result.
///
/// Implementations perform a single round-trip: no retries, no caching.
pub trait Invoker {
    /// Runs `command` with `args` on the host.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::Backend`] when the host reports a failure,
    /// and the other variants when the host cannot be reached.
    async fn invoke(&self, command: Command, args: CommandArgs) -> Result<Value, InvokeError>;
}

impl<I: Invoker> Invoker for &I {
    async fn invoke(&self, command: Command, args: CommandArgs) -> Result<Value, InvokeError> {
        (**self).invoke(command, args).await
    }
}

impl<I: Invoker> Invoker for std::sync::Arc<I> {
    async fn invoke(&self, command: Command, args: CommandArgs) -> Result<Value, InvokeError> {
        (**self).invoke(command, args).await
    }
}
