//! Backend gateway.
//!
//! A stateless façade that exposes one typed async method per host
//! capability and applies a uniform error-translation policy:
//!
//! - `command`: the host command catalogue and each command's policy
//! - `policy`: swallow / degrade / propagate rules
//! - `error`: authentication classification and error types
//! - `invoker`: the transport seam to the host process
//! - `socket`: Unix socket transport
//! - `mock`: scriptable invoker for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use timetrack::gateway::{Gateway, GatewayError, SocketInvoker};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let gateway = Gateway::new(SocketInvoker::new()?);
//!
//! match gateway.start_timer(5, Some("writing docs")).await {
//!     Ok(Some(entry)) => println!("started #{}", entry.id),
//!     Ok(None) => println!("host returned no entry"),
//!     Err(GatewayError::AuthRequired) => println!("please sign in"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod error;
pub mod invoker;
pub mod mock;
pub mod policy;
pub mod socket;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::types::{Client, CommandArgs, Project, TimeEntry, UpdateEntryData, UserSettings};

pub use command::{Command, UnknownCommand};
pub use error::{BackendError, GatewayError, InvokeError, NOT_AUTHENTICATED};
pub use invoker::Invoker;
pub use mock::MockInvoker;
pub use policy::ErrorPolicy;
pub use socket::SocketInvoker;

// ============================================================================
// Gateway
// ============================================================================

/// Typed client for the host process.
///
/// Holds no state besides its invoker; every method is one round-trip.
#[derive(Debug, Clone)]
pub struct Gateway<I> {
    invoker: I,
}

impl<I: Invoker> Gateway<I> {
    /// Creates a gateway over the given transport.
    pub fn new(invoker: I) -> Self {
        Self { invoker }
    }

    /// Returns the underlying invoker.
    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    // ------------------------------------------------------------------------
    // Fire-and-forget
    // ------------------------------------------------------------------------

    /// Updates the tray tooltip for the running state.
    pub async fn update_tray_status(&self, is_running: bool, project_name: Option<&str>) {
        let args = args(json!({
            "isRunning": is_running,
            "projectName": non_empty(project_name),
        }));
        self.fire(Command::UpdateTrayStatus, args).await;
    }

    /// Shows the elapsed time in the tray, truncated to whole seconds.
    pub async fn update_tray_timer(&self, elapsed_seconds: f64) {
        let args = args(json!({ "elapsedSeconds": whole_seconds(elapsed_seconds) }));
        self.fire(Command::UpdateTrayTimer, args).await;
    }

    /// Removes the elapsed time from the tray.
    pub async fn clear_tray_timer(&self) {
        self.fire(Command::ClearTrayTimer, CommandArgs::new()).await;
    }

    /// Hands the current timer and a fallback project to the host.
    pub async fn sync_timer_state(&self, timer: Option<&TimeEntry>, first_project_id: Option<u64>) {
        let args = args(json!({
            "timer": timer,
            "firstProjectId": first_project_id,
        }));
        self.fire(Command::SyncTimerState, args).await;
    }

    /// Asks the host to show a desktop notification.
    pub async fn show_notification(&self, title: &str, body: &str) {
        let args = args(json!({ "title": title, "body": body }));
        self.fire(Command::ShowNotification, args).await;
    }

    // ------------------------------------------------------------------------
    // Timer
    // ------------------------------------------------------------------------

    /// Returns the running timer, if any.
    ///
    /// # Errors
    ///
    /// Only [`GatewayError::AuthRequired`]; other failures yield `None`.
    pub async fn get_active_timer(&self) -> Result<Option<TimeEntry>, GatewayError> {
        self.call(Command::GetActiveTimer, CommandArgs::new()).await
    }

    /// Starts a timer on a project.
    ///
    /// # Errors
    ///
    /// [`GatewayError::AuthRequired`], or the original failure.
    pub async fn start_timer(
        &self,
        project_id: u64,
        description: Option<&str>,
    ) -> Result<Option<TimeEntry>, GatewayError> {
        let args = args(json!({
            "projectId": project_id,
            "description": non_empty(description),
        }));
        self.call(Command::StartTimer, args).await
    }

    /// Stops a timer.
    ///
    /// # Errors
    ///
    /// [`GatewayError::AuthRequired`], or the original failure.
    pub async fn stop_timer(&self, timer_id: u64) -> Result<Option<TimeEntry>, GatewayError> {
        self.call(Command::StopTimer, args(json!({ "timerId": timer_id })))
            .await
    }

    /// Restarts a stopped timer.
    ///
    /// # Errors
    ///
    /// [`GatewayError::AuthRequired`], or the original failure.
    pub async fn restart_timer(&self, timer_id: u64) -> Result<Option<TimeEntry>, GatewayError> {
        self.call(Command::RestartTimer, args(json!({ "timerId": timer_id })))
            .await
    }

    // ------------------------------------------------------------------------
    // Entries
    // ------------------------------------------------------------------------

    /// Deletes a time entry.
    ///
    /// # Errors
    ///
    /// [`GatewayError::AuthRequired`], or the original failure.
    pub async fn delete_entry(&self, entry_id: u64) -> Result<(), GatewayError> {
        let command = Command::DeleteEntry;
        let result = self
            .run(command, args(json!({ "entryId": entry_id })))
            .await
            .map(drop);
        command.policy().resolve(command, result)
    }

    /// Edits a time entry.
    ///
    /// # Errors
    ///
    /// [`GatewayError::AuthRequired`], or the original failure.
    pub async fn update_entry(
        &self,
        entry_id: u64,
        data: &UpdateEntryData,
    ) -> Result<Option<TimeEntry>, GatewayError> {
        let args = args(json!({ "entryId": entry_id, "data": data }));
        self.call(Command::UpdateEntry, args).await
    }

    /// Lists recent time entries.
    ///
    /// # Errors
    ///
    /// Only [`GatewayError::AuthRequired`]; other failures yield an empty list.
    pub async fn get_time_entries(&self) -> Result<Vec<TimeEntry>, GatewayError> {
        self.call(Command::GetTimeEntries, CommandArgs::new()).await
    }

    // ------------------------------------------------------------------------
    // Projects and clients
    // ------------------------------------------------------------------------

    /// Lists recently used projects.
    ///
    /// # Errors
    ///
    /// Only [`GatewayError::AuthRequired`]; other failures yield an empty list.
    pub async fn get_recent_projects(&self) -> Result<Vec<Project>, GatewayError> {
        self.call(Command::GetRecentProjects, CommandArgs::new()).await
    }

    /// Lists clients.
    ///
    /// # Errors
    ///
    /// Only [`GatewayError::AuthRequired`]; other failures yield an empty list.
    pub async fn get_clients(&self) -> Result<Vec<Client>, GatewayError> {
        self.call(Command::GetClients, CommandArgs::new()).await
    }

    /// Lists the projects of one client.
    ///
    /// # Errors
    ///
    /// Only [`GatewayError::AuthRequired`]; other failures yield an empty list.
    pub async fn get_client_projects(&self, client_id: u64) -> Result<Vec<Project>, GatewayError> {
        self.call(Command::GetClientProjects, args(json!({ "clientId": client_id })))
            .await
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    /// Returns user settings; any failure yields empty settings.
    pub async fn get_settings(&self) -> UserSettings {
        self.call(Command::GetSettings, CommandArgs::new())
            .await
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    async fn run(&self, command: Command, args: CommandArgs) -> Result<Value, GatewayError> {
        Ok(self.invoker.invoke(command, args).await?)
    }

    /// Invokes, decodes and applies the command's policy.
    async fn call<T>(&self, command: Command, args: CommandArgs) -> Result<T, GatewayError>
    where
        T: DeserializeOwned + Default,
    {
        let result = match self.run(command, args).await {
            Ok(value) => decode(command, value),
            Err(err) => Err(err),
        };
        command.policy().resolve(command, result)
    }

    /// Invokes a command whose failures never reach the caller.
    async fn fire(&self, command: Command, args: CommandArgs) {
        let result = self.run(command, args).await.map(drop);
        // FireAndForget always resolves to Ok
        let _ = command.policy().resolve(command, result);
    }
}

fn decode<T: DeserializeOwned>(command: Command, value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| GatewayError::Decode {
        command: command.name(),
        reason: e.to_string(),
    })
}

fn args(value: Value) -> CommandArgs {
    match value {
        Value::Object(map) => map,
        _ => CommandArgs::new(),
    }
}

/// Empty strings are sent as null.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Truncates toward zero; non-finite input becomes 0.
fn whole_seconds(elapsed: f64) -> i64 {
    if elapsed.is_finite() {
        elapsed.trunc() as i64
    } else {
        0
    }
}

// ============================================================================
// Tests
// ============================================================================
