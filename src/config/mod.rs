//! Endpoint and host configuration.
//!
//! Configuration is an explicit value built at startup and passed down,
//! so tests can supply any endpoint triple.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default socket path, relative to the home directory
const DEFAULT_SOCKET_PATH: &str = ".timetrack/host.sock";

const DEV_API_BASE_URL: &str = "http://localhost:8000/api";
const DEV_WS_URL: &str = "ws://localhost:6001";
const DEV_WEB_APP_URL: &str = "http://localhost:3000";

const PROD_API_BASE_URL: &str = "https://getfreshtracks.com/api";
const PROD_WS_URL: &str = "wss://getfreshtracks.com";
const PROD_WEB_APP_URL: &str = "https://getfreshtracks.com";

// ============================================================================
// BuildMode
// ============================================================================

/// Which fixed endpoint set to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    /// Local development servers
    Development,
    /// Hosted production service
    Production,
}

impl BuildMode {
    /// Development for debug builds, production for release builds.
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            BuildMode::Development
        } else {
            BuildMode::Production
        }
    }
}

impl Default for BuildMode {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// Base URLs of the REST API, the WebSocket server and the companion web app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub api_base_url: String,
    pub ws_url: String,
    pub web_app_url: String,
}

impl Endpoints {
    /// Creates an arbitrary endpoint triple.
    pub fn new(
        api_base_url: impl Into<String>,
        ws_url: impl Into<String>,
        web_app_url: impl Into<String>,
    ) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ws_url: ws_url.into(),
            web_app_url: web_app_url.into(),
        }
    }

    /// Local development servers (ports 8000/6001/3000).
    pub fn development() -> Self {
        Self::new(DEV_API_BASE_URL, DEV_WS_URL, DEV_WEB_APP_URL)
    }

    /// Hosted production service.
    pub fn production() -> Self {
        Self::new(PROD_API_BASE_URL, PROD_WS_URL, PROD_WEB_APP_URL)
    }

    /// Returns the fixed endpoint set for a build mode.
    pub fn for_mode(mode: BuildMode) -> Self {
        match mode {
            BuildMode::Development => Self::development(),
            BuildMode::Production => Self::production(),
        }
    }

    /// Base URL of the widget API, under the REST API.
    pub fn widget_api_url(&self) -> String {
        format!("{}/widget", self.api_base_url.trim_end_matches('/'))
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::for_mode(BuildMode::current())
    }
}

// ============================================================================
// HostConfig
// ============================================================================

/// Settings for running the reference host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Unix socket the host listens on
    pub socket_path: PathBuf,
    /// Backend endpoints
    pub endpoints: Endpoints,
    /// Shared secret sent as `X-Widget-Secret`
    pub widget_secret: Option<String>,
}

impl HostConfig {
    /// Creates a configuration with the default socket path.
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        Ok(Self {
            socket_path: default_socket_path()?,
            endpoints,
            widget_secret: None,
        })
    }

    /// Overrides the socket path.
    #[must_use]
    pub fn with_socket_path(mut self, socket_path: PathBuf) -> Self {
        self.socket_path = socket_path;
        self
    }

    /// Sets the widget secret.
    #[must_use]
    pub fn with_widget_secret(mut self, secret: Option<String>) -> Self {
        self.widget_secret = secret;
        self
    }
}

/// Returns `~/.timetrack/host.sock`.
pub fn default_socket_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine the home directory")?;
    Ok(home.join(DEFAULT_SOCKET_PATH))
}
