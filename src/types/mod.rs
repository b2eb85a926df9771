//! Core data types for the time tracker.
//!
//! This module defines the data structures used for:
//! - Clients, projects and time entries exchanged with the host
//! - User settings
//! - Host request/response serialization

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ============================================================================
// Client
// ============================================================================

/// A billable client that owns projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Identifier assigned by the backend
    #[serde(default)]
    pub id: u64,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Hourly rate, if the client has one
    #[serde(default, deserialize_with = "deserialize_lenient_rate")]
    pub hourly_rate: Option<f64>,
}

/// Accepts a rate as a number, a numeric string, or null.
///
/// Anything that cannot be read as a number becomes `None` instead of an error.
fn deserialize_lenient_rate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    })
}

// ============================================================================
// Project
// ============================================================================

/// A project that time can be tracked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Identifier assigned by the backend
    pub id: u64,
    /// Display name
    pub name: String,
    /// Client the project belongs to (informational join)
    #[serde(default)]
    pub client: Option<Client>,
}

impl Project {
    /// Returns "Client - Project", or just the project name without a client.
    pub fn display_name(&self) -> String {
        match &self.client {
            Some(client) => format!("{} - {}", client.name, self.name),
            None => self.name.clone(),
        }
    }
}

// ============================================================================
// TimeEntry
// ============================================================================

/// A tracked span of time. An entry without `stopped_at` is a running timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Identifier assigned by the backend
    pub id: u64,
    /// Owning project id
    pub project_id: u64,
    /// Resolved project, when the backend includes it
    #[serde(default)]
    pub project: Option<Project>,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Start instant (RFC 3339 with offset)
    pub started_at: String,
    /// Stop instant; `None` while running
    #[serde(default)]
    pub stopped_at: Option<String>,
    /// Instant of the last resume
    #[serde(default)]
    pub resumed_at: Option<String>,
    /// Duration computed by the backend
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    /// Whether the entry is billable
    #[serde(default)]
    pub is_billable: bool,
}

impl TimeEntry {
    /// Returns true if the entry is a running timer.
    pub fn is_running(&self) -> bool {
        self.stopped_at.is_none()
    }

    /// Returns the project name, if the project was resolved.
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }

    /// Parses `started_at`. Returns `None` for unparseable timestamps.
    pub fn started_at_time(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.started_at).ok()
    }

    /// Whole seconds between `started_at` and `now`, clamped at zero.
    pub fn elapsed_seconds(&self, now: DateTime<FixedOffset>) -> Option<u64> {
        let started = self.started_at_time()?;
        Some((now - started).num_seconds().max(0) as u64)
    }
}

// ============================================================================
// UserSettings
// ============================================================================

/// Sparse user preferences; absent flags mean "off".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Show revenue accumulating while a timer runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_live_revenue: Option<bool>,
}

impl UserSettings {
    /// Returns the live-revenue flag with its default applied.
    pub fn shows_live_revenue(&self) -> bool {
        self.show_live_revenue.unwrap_or(false)
    }
}

// ============================================================================
// UpdateEntryData
// ============================================================================

/// Editable fields of a time entry. Id and duration are derived by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEntryData {
    pub project_id: u64,
    pub description: Option<String>,
    pub started_at: String,
    pub stopped_at: Option<String>,
    pub is_billable: bool,
}

// ============================================================================
// Host Envelope
// ============================================================================

/// Key-value argument bag sent with every command.
pub type CommandArgs = serde_json::Map<String, Value>;

/// Machine-readable error classification attached by hosts that support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The host has no valid credentials for the backend
    NotAuthenticated,
    /// Any other host-side failure
    BackendFailure,
}

/// Request from the gateway to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// Correlation id for logs
    pub id: Uuid,
    /// Command name (e.g. `start_timer`)
    pub command: String,
    /// Command arguments
    #[serde(default)]
    pub args: CommandArgs,
}

impl InvokeRequest {
    /// Creates a request with a fresh id.
    pub fn new(command: impl Into<String>, args: CommandArgs) -> Self {
        Self {
            id: Uuid::new_v4(),
            command: command.into(),
            args,
        }
    }
}

/// Response from the host to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message (the error text on failure)
    #[serde(default)]
    pub message: String,
    /// Structured error classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// Command result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl InvokeResponse {
    /// Creates a success response.
    pub fn success(data: Value) -> Self {
        Self {
            status: "success".to_string(),
            message: String::new(),
            code: None,
            data: Some(data),
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>, code: Option<ErrorCode>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            code,
            data: None,
        }
    }

    /// Returns true for error responses.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry_json() -> Value {
        json!({
            "id": 17,
            "project_id": 5,
            "project": {
                "id": 5,
                "name": "Website",
                "client": { "id": 2, "name": "Acme", "hourly_rate": "85.50" }
            },
            "description": "writing docs",
            "started_at": "2026-10-17T09:00:00+02:00",
            "stopped_at": null,
            "resumed_at": null,
            "duration_minutes": null,
            "is_billable": true
        })
    }

    // ------------------------------------------------------------------------
    // Client Tests
    // ------------------------------------------------------------------------

    mod client_tests {
        use super::*;

        #[test]
        fn test_rate_as_number() {
            let client: Client =
                serde_json::from_value(json!({"id": 1, "name": "A", "hourly_rate": 120})).unwrap();
            assert_eq!(client.hourly_rate, Some(120.0));
        }

        #[test]
        fn test_rate_as_string() {
            let client: Client =
                serde_json::from_value(json!({"id": 1, "name": "A", "hourly_rate": " 99.5 "}))
                    .unwrap();
            assert_eq!(client.hourly_rate, Some(99.5));
        }

        #[test]
        fn test_rate_lenient_values() {
            for raw in [json!(null), json!(""), json!("null"), json!("abc"), json!(true)] {
                let client: Client =
                    serde_json::from_value(json!({"id": 1, "name": "A", "hourly_rate": raw}))
                        .unwrap();
                assert_eq!(client.hourly_rate, None);
            }
        }

        #[test]
        fn test_rate_missing() {
            let client: Client = serde_json::from_value(json!({"id": 1, "name": "A"})).unwrap();
            assert_eq!(client.hourly_rate, None);
        }
    }

    // ------------------------------------------------------------------------
    // Project Tests
    // ------------------------------------------------------------------------

    mod project_tests {
        use super::*;

        #[test]
        fn test_display_name_with_client() {
            let project = Project {
                id: 5,
                name: "Website".to_string(),
                client: Some(Client {
                    id: 2,
                    name: "Acme".to_string(),
                    hourly_rate: None,
                }),
            };
            assert_eq!(project.display_name(), "Acme - Website");
        }

        #[test]
        fn test_display_name_without_client() {
            let project = Project {
                id: 5,
                name: "Internal".to_string(),
                client: None,
            };
            assert_eq!(project.display_name(), "Internal");
        }
    }

    // ------------------------------------------------------------------------
    // TimeEntry Tests
    // ------------------------------------------------------------------------

    mod time_entry_tests {
        use super::*;

        #[test]
        fn test_deserialize_running_entry() {
            let entry: TimeEntry = serde_json::from_value(entry_json()).unwrap();
            assert_eq!(entry.id, 17);
            assert_eq!(entry.project_id, 5);
            assert!(entry.is_running());
            assert!(entry.is_billable);
            assert_eq!(entry.project_name(), Some("Website"));
            let client = entry.project.unwrap().client.unwrap();
            assert_eq!(client.hourly_rate, Some(85.5));
        }

        #[test]
        fn test_stopped_entry_is_not_running() {
            let mut value = entry_json();
            value["stopped_at"] = json!("2026-10-17T10:00:00+02:00");
            value["duration_minutes"] = json!(60.0);
            let entry: TimeEntry = serde_json::from_value(value).unwrap();
            assert!(!entry.is_running());
            assert_eq!(entry.duration_minutes, Some(60.0));
        }

        #[test]
        fn test_elapsed_seconds() {
            let entry: TimeEntry = serde_json::from_value(entry_json()).unwrap();
            let now = DateTime::parse_from_rfc3339("2026-10-17T07:01:30Z").unwrap();
            assert_eq!(entry.elapsed_seconds(now), Some(90));
        }

        #[test]
        fn test_elapsed_seconds_clamped() {
            let entry: TimeEntry = serde_json::from_value(entry_json()).unwrap();
            let now = DateTime::parse_from_rfc3339("2026-10-17T06:00:00Z").unwrap();
            assert_eq!(entry.elapsed_seconds(now), Some(0));
        }

        #[test]
        fn test_elapsed_seconds_bad_timestamp() {
            let mut value = entry_json();
            value["started_at"] = json!("yesterday");
            let entry: TimeEntry = serde_json::from_value(value).unwrap();
            let now = DateTime::parse_from_rfc3339("2026-10-17T06:00:00Z").unwrap();
            assert_eq!(entry.elapsed_seconds(now), None);
        }
    }

    // ------------------------------------------------------------------------
    // UserSettings Tests
    // ------------------------------------------------------------------------

    mod user_settings_tests {
        use super::*;

        #[test]
        fn test_empty_object() {
            let settings: UserSettings = serde_json::from_value(json!({})).unwrap();
            assert_eq!(settings, UserSettings::default());
            assert!(!settings.shows_live_revenue());
        }

        #[test]
        fn test_flag_set() {
            let settings: UserSettings =
                serde_json::from_value(json!({"show_live_revenue": true})).unwrap();
            assert!(settings.shows_live_revenue());
        }

        #[test]
        fn test_default_serializes_empty() {
            let json = serde_json::to_string(&UserSettings::default()).unwrap();
            assert_eq!(json, "{}");
        }
    }

    // ------------------------------------------------------------------------
    // Envelope Tests
    // ------------------------------------------------------------------------

    mod envelope_tests {
        use super::*;

        #[test]
        fn test_request_shape() {
            let mut args = CommandArgs::new();
            args.insert("timerId".to_string(), json!(3));
            let request = InvokeRequest::new("stop_timer", args);
            let value = serde_json::to_value(&request).unwrap();
            assert_eq!(value["command"], "stop_timer");
            assert_eq!(value["args"]["timerId"], 3);
            assert!(value["id"].is_string());
        }

        #[test]
        fn test_request_without_args() {
            let request: InvokeRequest = serde_json::from_value(json!({
                "id": "2f1c7f0e-8f0b-4a56-9b7d-2b8f3f0a9c11",
                "command": "get_clients"
            }))
            .unwrap();
            assert!(request.args.is_empty());
        }

        #[test]
        fn test_success_response() {
            let response = InvokeResponse::success(json!([1, 2]));
            assert!(!response.is_error());
            let json = serde_json::to_value(&response).unwrap();
            assert_eq!(json["status"], "success");
            assert!(json.get("code").is_none());
        }

        #[test]
        fn test_error_response_with_code() {
            let response =
                InvokeResponse::error("Not authenticated", Some(ErrorCode::NotAuthenticated));
            assert!(response.is_error());
            let json = serde_json::to_value(&response).unwrap();
            assert_eq!(json["code"], "not_authenticated");
            assert!(json.get("data").is_none());
        }
    }
}
