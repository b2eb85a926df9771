//! Command definitions for the timetrack CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{BuildMode, Endpoints};
use crate::types::UpdateEntryData;

// ============================================================================
// CLI Structure
// ============================================================================

/// Timetrack - time tracking from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "timetrack",
    version,
    about = "Time tracking client and host",
    long_about = "Talks to the timetrack host over a Unix socket.\n\
                  Run `timetrack host` to start the reference host backed by the widget API.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Host socket path (defaults to ~/.timetrack/host.sock)
    #[arg(long, global = true, env = "TIMETRACK_SOCKET")]
    pub socket: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the running timer
    Status,

    /// Start a timer on a project
    Start {
        /// Project id
        project_id: u64,

        /// What you are working on
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Stop a timer
    Stop {
        /// Timer id
        timer_id: u64,
    },

    /// Restart a stopped timer
    Restart {
        /// Timer id
        timer_id: u64,
    },

    /// Delete a time entry
    Delete {
        /// Entry id
        entry_id: u64,
    },

    /// Edit a time entry
    Edit(EditArgs),

    /// List recent time entries
    Entries,

    /// List recent projects
    Projects,

    /// List clients
    Clients,

    /// List the projects of a client
    ClientProjects {
        /// Client id
        client_id: u64,
    },

    /// Show user settings
    Settings,

    /// Show a desktop notification through the host
    Notify {
        /// Notification title
        title: String,
        /// Notification body
        body: String,
    },

    /// Run the reference host
    Host(HostArgs),

    /// Print the service endpoints
    Endpoints {
        /// Build mode (defaults to the mode of this binary)
        #[arg(long, value_enum)]
        mode: Option<BuildMode>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Edit Arguments
// ============================================================================

/// Arguments for the edit command
#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Entry id
    pub entry_id: u64,

    /// Project id
    #[arg(short, long)]
    pub project: u64,

    /// Start time (RFC 3339)
    #[arg(long, value_parser = validate_timestamp)]
    pub started_at: String,

    /// Stop time (RFC 3339)
    #[arg(long, value_parser = validate_timestamp)]
    pub stopped_at: Option<String>,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Mark the entry billable
    #[arg(short, long)]
    pub billable: bool,
}

impl EditArgs {
    pub fn to_update(&self) -> UpdateEntryData {
        UpdateEntryData {
            project_id: self.project,
            description: self.description.clone().filter(|d| !d.is_empty()),
            started_at: self.started_at.clone(),
            stopped_at: self.stopped_at.clone(),
            is_billable: self.billable,
        }
    }
}

// ============================================================================
// Host Arguments
// ============================================================================

/// Arguments for the host command
#[derive(Args, Debug, Clone)]
pub struct HostArgs {
    /// Build mode selecting the default endpoints
    #[arg(long, value_enum)]
    pub mode: Option<BuildMode>,

    /// Override the REST API base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Override the WebSocket URL
    #[arg(long)]
    pub ws_url: Option<String>,

    /// Override the web app URL
    #[arg(long)]
    pub web_url: Option<String>,

    /// Widget API secret
    #[arg(long, env = "TIMETRACK_WIDGET_SECRET", hide_env_values = true)]
    pub widget_secret: Option<String>,
}

impl HostArgs {
    /// Endpoints for the selected mode with any overrides applied.
    pub fn endpoints(&self) -> Endpoints {
        let mut endpoints = Endpoints::for_mode(self.mode.unwrap_or_else(BuildMode::current));
        if let Some(url) = &self.api_url {
            endpoints.api_base_url = url.clone();
        }
        if let Some(url) = &self.ws_url {
            endpoints.ws_url = url.clone();
        }
        if let Some(url) = &self.web_url {
            endpoints.web_app_url = url.clone();
        }
        endpoints
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates an RFC 3339 timestamp.
fn validate_timestamp(s: &str) -> Result<String, String> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|_| s.to_string())
        .map_err(|e| format!("invalid RFC 3339 timestamp: {e}"))
}

// ============================================================================
// Tests
// ============================================================================
