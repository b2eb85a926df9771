//! Reference host process.
//!
//! Answers gateway commands over a Unix socket:
//!
//! - `server`: socket listener, one request per connection
//! - `handler`: command dispatch seam
//! - `backend`: handler backed by the widget REST API
//! - `api`: widget REST client
//! - `tray`: tray text and synced timer state
//! - `notify`: desktop notification seam

pub mod api;
pub mod backend;
pub mod handler;
pub mod notify;
pub mod server;
pub mod tray;

pub use api::{ApiError, WidgetApi};
pub use backend::{ApiHost, ToggleOutcome};
pub use handler::{dispatch, HostHandler};
pub use notify::{LogNotifier, MockNotifier, Notifier, NotifyError};
pub use server::{HostError, HostServer};
pub use tray::TrayState;
