//! Display utilities for the timetrack CLI.
//!
//! Rendering is split into `format_*` functions returning strings, so the
//! output can be tested, and `show_*` wrappers that print them.

use chrono::{DateTime, FixedOffset, Utc};

use crate::config::Endpoints;
use crate::gateway::GatewayError;
use crate::host::tray::format_elapsed;
use crate::types::{Client, Project, TimeEntry, UserSettings};

/// Printed when the host reports a missing session.
pub const SIGN_IN_HINT: &str = "Not signed in. Sign in through the timetrack app and try again.";

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// One line per entry: id, state, project and description.
    pub fn format_entry(entry: &TimeEntry, now: DateTime<FixedOffset>) -> String {
        let project = entry
            .project
            .as_ref()
            .map(Project::display_name)
            .unwrap_or_else(|| format!("project #{}", entry.project_id));

        let state = if entry.is_running() {
            let elapsed = entry.elapsed_seconds(now).unwrap_or(0);
            format!("running {}", format_elapsed(elapsed as i64))
        } else {
            match entry.duration_minutes {
                Some(minutes) => format!("{:.0}m", minutes.max(0.0)),
                None => "stopped".to_string(),
            }
        };

        let mut line = format!("#{:<6} {:<14} {}", entry.id, state, project);
        if let Some(description) = entry.description.as_deref().filter(|d| !d.is_empty()) {
            line.push_str(&format!(" | {}", description));
        }
        if entry.is_billable {
            line.push_str(" $");
        }
        line
    }

    pub fn format_project(project: &Project) -> String {
        format!("#{:<6} {}", project.id, project.display_name())
    }

    pub fn format_client(client: &Client) -> String {
        match client.hourly_rate {
            Some(rate) => format!("#{:<6} {} ({:.2}/h)", client.id, client.name, rate),
            None => format!("#{:<6} {}", client.id, client.name),
        }
    }

    pub fn format_endpoints(endpoints: &Endpoints) -> String {
        format!(
            "api: {}\nws:  {}\nweb: {}",
            endpoints.api_base_url, endpoints.ws_url, endpoints.web_app_url
        )
    }

    /// Shows the running timer.
    pub fn show_status(timer: Option<&TimeEntry>) {
        match timer {
            Some(entry) => println!("{}", Self::format_entry(entry, now())),
            None => println!("No active timer"),
        }
    }

    /// Shows an entry returned by a mutation, or a fallback message.
    pub fn show_entry_result(action: &str, entry: Option<&TimeEntry>) {
        match entry {
            Some(entry) => println!("{}: {}", action, Self::format_entry(entry, now())),
            None => println!("{}", action),
        }
    }

    pub fn show_entries(entries: &[TimeEntry]) {
        let now = now();
        for entry in entries {
            println!("{}", Self::format_entry(entry, now));
        }
    }

    pub fn show_projects(projects: &[Project]) {
        for project in projects {
            println!("{}", Self::format_project(project));
        }
    }

    pub fn show_clients(clients: &[Client]) {
        for client in clients {
            println!("{}", Self::format_client(client));
        }
    }

    pub fn show_settings(settings: &UserSettings) {
        println!(
            "show_live_revenue: {}",
            if settings.shows_live_revenue() { "on" } else { "off" }
        );
    }

    pub fn show_endpoints(endpoints: &Endpoints) {
        println!("{}", Self::format_endpoints(endpoints));
    }

    /// Shows a gateway error; a missing session gets the sign-in hint.
    pub fn show_gateway_error(err: &GatewayError) {
        if err.is_auth_failure() {
            eprintln!("{}", SIGN_IN_HINT);
        } else {
            Self::show_error(&err.to_string());
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn entry() -> TimeEntry {
        TimeEntry {
            id: 12,
            project_id: 3,
            project: Some(Project {
                id: 3,
                name: "Website".to_string(),
                client: Some(Client {
                    id: 1,
                    name: "Acme".to_string(),
                    hourly_rate: None,
                }),
            }),
            description: Some("landing page".to_string()),
            started_at: "2026-10-17T09:00:00Z".to_string(),
            stopped_at: None,
            resumed_at: None,
            duration_minutes: None,
            is_billable: false,
        }
    }

    #[test]
    fn test_format_running_entry() {
        let line = Display::format_entry(&entry(), at("2026-10-17T09:01:05Z"));
        assert!(line.starts_with("#12"));
        assert!(line.contains("running 01:05"));
        assert!(line.contains("Acme - Website"));
        assert!(line.ends_with("| landing page"));
    }

    #[test]
    fn test_format_stopped_entry() {
        let mut entry = entry();
        entry.project = None;
        entry.description = Some(String::new());
        entry.stopped_at = Some("2026-10-17T10:00:00Z".to_string());
        entry.duration_minutes = Some(60.0);
        entry.is_billable = true;

        let line = Display::format_entry(&entry, at("2026-10-17T11:00:00Z"));
        assert!(line.contains("60m"));
        assert!(line.contains("project #3"));
        assert!(!line.contains('|'));
        assert!(line.ends_with(" $"));
    }

    #[test]
    fn test_format_client_with_rate() {
        let client = Client {
            id: 4,
            name: "Acme".to_string(),
            hourly_rate: Some(85.5),
        };
        assert_eq!(Display::format_client(&client), "#4      Acme (85.50/h)");
    }

    #[test]
    fn test_format_endpoints() {
        let text = Display::format_endpoints(&Endpoints::production());
        assert!(text.contains("https://getfreshtracks.com/api"));
        assert!(text.contains("wss://getfreshtracks.com"));
    }
}
