//! Timetrack library
//!
//! Client-side plumbing for a time-tracking app whose data lives in a
//! separate host process:
//! - `gateway`: typed async façade over the host commands with a uniform
//!   error-translation policy
//! - `host`: reference host serving those commands from the widget API
//! - `types`: data model and the wire envelope
//! - `config`: endpoint selection and host settings
//! - `cli`: command parsing and display utilities

pub mod cli;
pub mod config;
pub mod gateway;
pub mod host;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Client, CommandArgs, ErrorCode, InvokeRequest, InvokeResponse, Project, TimeEntry,
    UpdateEntryData, UserSettings,
};

pub use config::{BuildMode, Endpoints, HostConfig};

pub use gateway::{
    BackendError, Command, ErrorPolicy, Gateway, GatewayError, InvokeError, Invoker,
    MockInvoker, SocketInvoker,
};

pub use host::{ApiHost, HostHandler, HostServer, LogNotifier, Notifier, ToggleOutcome, WidgetApi};
