//! Reference host backed by the widget REST API.
//!
//! `timetrack host` calls [`ApiHost::toggle_timer`] on SIGUSR1.

use serde_json::Value;

use crate::config::HostConfig;
use crate::gateway::{BackendError, Command};
use crate::types::{CommandArgs, TimeEntry, UpdateEntryData};

use super::api::{ApiError, WidgetApi};
use super::handler::{arg, to_json, HostHandler};
use super::notify::Notifier;
use super::tray::TrayState;

/// Result of toggling the timer from the global shortcut.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    /// The running timer was stopped.
    Stopped(TimeEntry),
    /// A timer was started on the first known project.
    Started(TimeEntry),
    /// Nothing was running and no project is known yet.
    NoProject,
}

/// Formats a duration in minutes as `Xh Ym` or `Ym`.
pub fn format_duration(minutes: Option<f64>) -> String {
    let Some(minutes) = minutes else {
        return String::new();
    };
    let total = if minutes.is_finite() { minutes.max(0.0) as u64 } else { 0 };
    let (hours, minutes) = (total / 60, total % 60);
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Host that serves gateway commands from the widget API.
pub struct ApiHost<N> {
    api: WidgetApi,
    tray: TrayState,
    notifier: N,
}

impl<N: Notifier> ApiHost<N> {
    pub fn new(api: WidgetApi, notifier: N) -> Self {
        Self {
            api,
            tray: TrayState::new(),
            notifier,
        }
    }

    /// Builds a host talking to the widget API of `config.endpoints`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &HostConfig, notifier: N) -> Result<Self, ApiError> {
        let api = WidgetApi::new(&config.endpoints, config.widget_secret.clone())?;
        Ok(Self::new(api, notifier))
    }

    pub fn api(&self) -> &WidgetApi {
        &self.api
    }

    pub fn tray(&self) -> &TrayState {
        &self.tray
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Stops the synced timer, or starts one on the first known project.
    ///
    /// Notification failures are logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns the API error if stopping or starting fails.
    pub async fn toggle_timer(&self) -> Result<ToggleOutcome, ApiError> {
        if let Some(timer) = self.tray.active_timer() {
            let stopped = self.api.stop_timer(timer.id).await?;
            self.tray.set_active_timer(None);
            self.tray.clear_timer();
            self.tray.set_status(false, None);

            let project = stopped.project_name().unwrap_or("Timer");
            let body = format!("{} - {}", project, format_duration(stopped.duration_minutes));
            self.notify("Timer Stopped", &body);

            tracing::info!(timer_id = stopped.id, "Timer stopped via shortcut");
            return Ok(ToggleOutcome::Stopped(stopped));
        }

        let Some(project_id) = self.tray.first_project_id() else {
            tracing::info!("No project known, nothing to start");
            return Ok(ToggleOutcome::NoProject);
        };

        let started = self.api.start_timer(project_id, None).await?;
        self.tray.set_active_timer(Some(started.clone()));

        let name = started
            .project
            .as_ref()
            .map(|p| p.display_name())
            .unwrap_or_else(|| "Project".to_string());
        self.tray.set_status(true, Some(&name));
        self.notify("Timer Started", &name);

        tracing::info!(timer_id = started.id, project_id, "Timer started via shortcut");
        Ok(ToggleOutcome::Started(started))
    }

    fn notify(&self, title: &str, body: &str) {
        if let Err(e) = self.notifier.notify(title, body) {
            tracing::warn!(error = %e, title, "Notification failed");
        }
    }
}

impl<N: Notifier> HostHandler for ApiHost<N> {
    async fn handle(&self, command: Command, args: CommandArgs) -> Result<Value, BackendError> {
        match command {
            Command::UpdateTrayStatus => {
                let is_running: bool = arg(&args, "isRunning")?;
                let project_name: Option<String> = arg(&args, "projectName")?;
                self.tray.set_status(is_running, project_name.as_deref());
                Ok(Value::Null)
            }
            Command::UpdateTrayTimer => {
                let elapsed: i64 = arg(&args, "elapsedSeconds")?;
                self.tray.set_elapsed(elapsed);
                Ok(Value::Null)
            }
            Command::ClearTrayTimer => {
                self.tray.clear_timer();
                Ok(Value::Null)
            }
            Command::SyncTimerState => {
                let timer: Option<TimeEntry> = arg(&args, "timer")?;
                let first_project_id: Option<u64> = arg(&args, "firstProjectId")?;
                self.tray.sync(timer, first_project_id);
                Ok(Value::Null)
            }
            Command::ShowNotification => {
                let title: String = arg(&args, "title")?;
                let body: String = arg(&args, "body")?;
                self.notifier
                    .notify(&title, &body)
                    .map_err(|e| BackendError::new(e.to_string()))?;
                Ok(Value::Null)
            }
            Command::GetActiveTimer => to_json(self.api.active_timer().await?),
            Command::StartTimer => {
                let project_id: u64 = arg(&args, "projectId")?;
                let description: Option<String> = arg(&args, "description")?;
                to_json(self.api.start_timer(project_id, description.as_deref()).await?)
            }
            Command::StopTimer => {
                let timer_id: u64 = arg(&args, "timerId")?;
                to_json(self.api.stop_timer(timer_id).await?)
            }
            Command::RestartTimer => {
                let timer_id: u64 = arg(&args, "timerId")?;
                to_json(self.api.restart_timer(timer_id).await?)
            }
            Command::DeleteEntry => {
                let entry_id: u64 = arg(&args, "entryId")?;
                self.api.delete_entry(entry_id).await?;
                Ok(Value::Null)
            }
            Command::UpdateEntry => {
                let entry_id: u64 = arg(&args, "entryId")?;
                let data: UpdateEntryData = arg(&args, "data")?;
                to_json(self.api.update_entry(entry_id, &data).await?)
            }
            Command::GetTimeEntries => to_json(self.api.time_entries().await?),
            Command::GetRecentProjects => to_json(self.api.recent_projects().await?),
            Command::GetClients => to_json(self.api.clients().await?),
            Command::GetClientProjects => {
                let client_id: u64 = arg(&args, "clientId")?;
                to_json(self.api.client_projects(client_id).await?)
            }
            Command::GetSettings => to_json(self.api.settings().await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::notify::MockNotifier;
    use serde_json::json;

    fn host() -> ApiHost<MockNotifier> {
        // Nothing listens here; tests below never reach the network
        let api = WidgetApi::with_base_url("http://127.0.0.1:9/widget", None).unwrap();
        ApiHost::new(api, MockNotifier::new())
    }

    fn args(value: Value) -> CommandArgs {
        match value {
            Value::Object(map) => map,
            _ => CommandArgs::new(),
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(None), "");
        assert_eq!(format_duration(Some(45.9)), "45m");
        assert_eq!(format_duration(Some(125.0)), "2h 5m");
        assert_eq!(format_duration(Some(-3.0)), "0m");
    }

    #[tokio::test]
    async fn test_tray_commands_update_state() {
        let host = host();

        host.handle(
            Command::UpdateTrayStatus,
            args(json!({"isRunning": true, "projectName": "Website"})),
        )
        .await
        .unwrap();
        assert_eq!(host.tray().tooltip(), "Timetrack - Website (Running)");

        host.handle(Command::UpdateTrayTimer, args(json!({"elapsedSeconds": 75})))
            .await
            .unwrap();
        assert_eq!(host.tray().title().as_deref(), Some("01:15"));

        host.handle(Command::ClearTrayTimer, CommandArgs::new())
            .await
            .unwrap();
        assert_eq!(host.tray().title(), None);
    }

    #[tokio::test]
    async fn test_sync_timer_state() {
        let host = host();
        host.handle(
            Command::SyncTimerState,
            args(json!({
                "timer": {"id": 8, "project_id": 2, "started_at": "2026-10-17T09:00:00Z"},
                "firstProjectId": 2
            })),
        )
        .await
        .unwrap();

        assert_eq!(host.tray().active_timer().map(|t| t.id), Some(8));
        assert_eq!(host.tray().first_project_id(), Some(2));
    }

    #[tokio::test]
    async fn test_show_notification() {
        let host = host();
        host.handle(
            Command::ShowNotification,
            args(json!({"title": "Hi", "body": "there"})),
        )
        .await
        .unwrap();
        assert_eq!(
            host.notifier().sent(),
            vec![("Hi".to_string(), "there".to_string())]
        );

        host.notifier().set_should_fail(true);
        let err = host
            .handle(
                Command::ShowNotification,
                args(json!({"title": "Hi", "body": "there"})),
            )
            .await
            .unwrap_err();
        assert!(err.message.contains("Mock failure"));
    }

    #[tokio::test]
    async fn test_missing_argument_is_rejected() {
        let err = host()
            .handle(Command::StopTimer, CommandArgs::new())
            .await
            .unwrap_err();
        assert!(err.message.starts_with("Invalid argument `timerId`"));
    }

    #[tokio::test]
    async fn test_toggle_without_project() {
        let host = host();
        let outcome = host.toggle_timer().await.unwrap();
        assert_eq!(outcome, ToggleOutcome::NoProject);
        assert!(host.notifier().sent().is_empty());
    }
}
