//! Per-command error policies.

use super::command::Command;
use super::error::GatewayError;

/// How the gateway treats a failed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Best-effort side channel: log and carry on, even on auth failures.
    FireAndForget,
    /// Read: auth failures become `AuthRequired`, others yield the empty value.
    Degrade,
    /// Mutation: auth failures become `AuthRequired`, others are re-signaled.
    Propagate,
    /// Any failure yields the default value.
    DegradeAlways,
}

impl ErrorPolicy {
    /// Applies the policy to the outcome of `command`.
    ///
    /// Every failure is logged before it is translated or suppressed.
    pub fn resolve<T: Default>(
        self,
        command: Command,
        result: Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let auth = err.is_auth_failure();
        if auth {
            tracing::warn!(command = command.name(), error = %err, "Failed to {}", command.action());
        } else {
            tracing::error!(command = command.name(), error = %err, "Failed to {}", command.action());
        }

        match self {
            ErrorPolicy::FireAndForget | ErrorPolicy::DegradeAlways => Ok(T::default()),
            ErrorPolicy::Degrade if auth => Err(GatewayError::AuthRequired),
            ErrorPolicy::Degrade => Ok(T::default()),
            ErrorPolicy::Propagate if auth => Err(GatewayError::AuthRequired),
            ErrorPolicy::Propagate => Err(err),
        }
    }
}
