//! Tray bookkeeping for the host.
//!
//! Tracks the text the tray should show and the timer state the global
//! shortcut acts on. Drawing the tray image is left to the platform shell.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::TimeEntry;

/// Application name used in tooltips.
pub const APP_NAME: &str = "Timetrack";

/// Formats elapsed time as `MM:SS`, or `HH:MM:SS` from one hour on.
pub fn format_elapsed(elapsed_seconds: i64) -> String {
    let total = elapsed_seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Tooltip for the given running state.
pub fn tooltip_text(is_running: bool, project_name: Option<&str>) -> String {
    match (is_running, project_name) {
        (true, Some(name)) => format!("{} - {} (Running)", APP_NAME, name),
        (true, None) => format!("{} - Timer Running", APP_NAME),
        (false, _) => format!("{} - No active timer", APP_NAME),
    }
}

#[derive(Debug)]
struct TrayInner {
    tooltip: String,
    title: Option<String>,
    last_timer_text: Option<String>,
    active_timer: Option<TimeEntry>,
    first_project_id: Option<u64>,
}

/// Shared tray state.
#[derive(Debug)]
pub struct TrayState {
    inner: Mutex<TrayInner>,
}

impl TrayState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TrayInner {
                tooltip: format!("{} - Time Tracking", APP_NAME),
                title: None,
                last_timer_text: None,
                active_timer: None,
                first_project_id: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrayInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Updates the tooltip; a stopped timer also clears the title.
    pub fn set_status(&self, is_running: bool, project_name: Option<&str>) {
        let mut inner = self.lock();
        inner.tooltip = tooltip_text(is_running, project_name);
        if !is_running {
            inner.title = None;
            inner.last_timer_text = None;
        }
        tracing::debug!(tooltip = %inner.tooltip, "Tray status updated");
    }

    /// Shows the elapsed time. Returns false if the text did not change.
    pub fn set_elapsed(&self, elapsed_seconds: i64) -> bool {
        let text = format_elapsed(elapsed_seconds);
        let mut inner = self.lock();
        if inner.last_timer_text.as_deref() == Some(text.as_str()) {
            return false;
        }
        inner.last_timer_text = Some(text.clone());
        inner.title = Some(text);
        true
    }

    /// Removes the elapsed time from the tray.
    pub fn clear_timer(&self) {
        let mut inner = self.lock();
        inner.last_timer_text = None;
        inner.title = None;
    }

    /// Stores the frontend's view of the timer.
    ///
    /// A missing `first_project_id` keeps the previously stored one.
    pub fn sync(&self, timer: Option<TimeEntry>, first_project_id: Option<u64>) {
        let mut inner = self.lock();
        inner.active_timer = timer;
        if first_project_id.is_some() {
            inner.first_project_id = first_project_id;
        }
    }

    pub fn set_active_timer(&self, timer: Option<TimeEntry>) {
        self.lock().active_timer = timer;
    }

    pub fn active_timer(&self) -> Option<TimeEntry> {
        self.lock().active_timer.clone()
    }

    pub fn first_project_id(&self) -> Option<u64> {
        self.lock().first_project_id
    }

    pub fn tooltip(&self) -> String {
        self.lock().tooltip.clone()
    }

    /// Text shown next to the tray icon, if any.
    pub fn title(&self) -> Option<String> {
        self.lock().title.clone()
    }
}

impl Default for TrayState {
    fn default() -> Self {
        Self::new()
    }
}
