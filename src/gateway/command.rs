//! Host command catalogue.
//!
//! Every command the host understands, its wire name, and the error
//! policy the gateway applies to it.

use std::fmt;
use std::str::FromStr;

use super::policy::ErrorPolicy;

/// A named host command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    UpdateTrayStatus,
    UpdateTrayTimer,
    ClearTrayTimer,
    SyncTimerState,
    ShowNotification,
    GetActiveTimer,
    StartTimer,
    StopTimer,
    GetRecentProjects,
    GetTimeEntries,
    RestartTimer,
    DeleteEntry,
    GetClients,
    GetClientProjects,
    UpdateEntry,
    GetSettings,
}

impl Command {
    /// All commands, in catalogue order.
    pub const ALL: [Command; 16] = [
        Command::UpdateTrayStatus,
        Command::UpdateTrayTimer,
        Command::ClearTrayTimer,
        Command::SyncTimerState,
        Command::ShowNotification,
        Command::GetActiveTimer,
        Command::StartTimer,
        Command::StopTimer,
        Command::GetRecentProjects,
        Command::GetTimeEntries,
        Command::RestartTimer,
        Command::DeleteEntry,
        Command::GetClients,
        Command::GetClientProjects,
        Command::UpdateEntry,
        Command::GetSettings,
    ];

    /// Returns the wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::UpdateTrayStatus => "update_tray_status",
            Command::UpdateTrayTimer => "update_tray_timer",
            Command::ClearTrayTimer => "clear_tray_timer",
            Command::SyncTimerState => "sync_timer_state",
            Command::ShowNotification => "show_notification",
            Command::GetActiveTimer => "get_active_timer",
            Command::StartTimer => "start_timer",
            Command::StopTimer => "stop_timer",
            Command::GetRecentProjects => "get_recent_projects",
            Command::GetTimeEntries => "get_time_entries",
            Command::RestartTimer => "restart_timer",
            Command::DeleteEntry => "delete_entry",
            Command::GetClients => "get_clients",
            Command::GetClientProjects => "get_client_projects",
            Command::UpdateEntry => "update_entry",
            Command::GetSettings => "get_settings",
        }
    }

    /// Returns how failures of this command are handled.
    pub fn policy(&self) -> ErrorPolicy {
        match self {
            Command::UpdateTrayStatus
            | Command::UpdateTrayTimer
            | Command::ClearTrayTimer
            | Command::SyncTimerState
            | Command::ShowNotification => ErrorPolicy::FireAndForget,

            Command::GetActiveTimer
            | Command::GetRecentProjects
            | Command::GetTimeEntries
            | Command::GetClients
            | Command::GetClientProjects => ErrorPolicy::Degrade,

            Command::StartTimer
            | Command::StopTimer
            | Command::RestartTimer
            | Command::DeleteEntry
            | Command::UpdateEntry => ErrorPolicy::Propagate,

            Command::GetSettings => ErrorPolicy::DegradeAlways,
        }
    }

    /// Human-readable action used in failure logs.
    pub fn action(&self) -> &'static str {
        match self {
            Command::UpdateTrayStatus => "update tray status",
            Command::UpdateTrayTimer => "update tray timer",
            Command::ClearTrayTimer => "clear tray timer",
            Command::SyncTimerState => "sync timer state",
            Command::ShowNotification => "show notification",
            Command::GetActiveTimer => "get active timer",
            Command::StartTimer => "start timer",
            Command::StopTimer => "stop timer",
            Command::GetRecentProjects => "get recent projects",
            Command::GetTimeEntries => "get time entries",
            Command::RestartTimer => "restart timer",
            Command::DeleteEntry => "delete entry",
            Command::GetClients => "get clients",
            Command::GetClientProjects => "get client projects",
            Command::UpdateEntry => "update entry",
            Command::GetSettings => "get settings",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for unrecognised command names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .iter()
            .copied()
            .find(|command| command.name() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}
