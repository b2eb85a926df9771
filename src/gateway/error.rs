//! Gateway error types.
//!
//! Failures are split into two buckets: authentication failures, which
//! always reach the caller as [`GatewayError::AuthRequired`], and
//! everything else, which each command's policy either swallows, degrades
//! or re-signals.

use thiserror::Error;

use crate::types::ErrorCode;

/// Substring that marks an authentication failure in host error text.
pub const NOT_AUTHENTICATED: &str = "Not authenticated";

/// An error value reported by the host for a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    /// Error text as produced by the host
    pub message: String,
    /// Structured classification, when the host provides one
    pub code: Option<ErrorCode>,
}

impl BackendError {
    /// Creates an error from host text alone.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Creates an authentication failure.
    pub fn not_authenticated(detail: impl AsRef<str>) -> Self {
        Self {
            message: format!("{}: {}", NOT_AUTHENTICATED, detail.as_ref()),
            code: Some(ErrorCode::NotAuthenticated),
        }
    }

    /// Returns true if the host reported missing or invalid credentials.
    pub fn is_auth_failure(&self) -> bool {
        self.code == Some(ErrorCode::NotAuthenticated) || self.message.contains(NOT_AUTHENTICATED)
    }
}

/// Errors from a single round-trip to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// The host ran the command and reported a failure
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The host could not be reached or the connection broke
    #[error("Connection error: {0}")]
    Connection(String),

    /// The request or response could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl InvokeError {
    /// Returns true if this is an authentication failure from the host.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Backend(err) if err.is_auth_failure())
    }
}

/// Errors surfaced by [`Gateway`](super::Gateway) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The caller must (re)authenticate before retrying
    #[error("AUTH_REQUIRED")]
    AuthRequired,

    /// The original failure, passed through unchanged
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    /// The host answered with a value of the wrong shape
    #[error("Unexpected response for {command}: {reason}")]
    Decode {
        command: &'static str,
        reason: String,
    },
}

impl GatewayError {
    /// Returns true if this error is, or should become, `AuthRequired`.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::AuthRequired => true,
            Self::Invoke(err) => err.is_auth_failure(),
            Self::Decode { .. } => false,
        }
    }
}
