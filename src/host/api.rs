//! REST client for the widget API.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::Endpoints;
use crate::gateway::BackendError;
use crate::types::{Client as TrackedClient, ErrorCode, Project, TimeEntry, UpdateEntryData, UserSettings};

/// Header carrying the widget secret.
pub const SECRET_HEADER: &str = "X-Widget-Secret";

/// Whole-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection establishment timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not authenticated: widget secret rejected")]
    Unauthorized,

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl From<ApiError> for BackendError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => BackendError::not_authenticated("widget secret rejected"),
            other => BackendError {
                message: other.to_string(),
                code: Some(ErrorCode::BackendFailure),
            },
        }
    }
}

#[derive(Serialize)]
struct StartTimerBody<'a> {
    project_id: u64,
    description: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct WidgetApi {
    client: Client,
    base_url: String,
    secret: Option<String>,
}

impl WidgetApi {
    /// Creates a client for the widget API under `endpoints.api_base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoints: &Endpoints, secret: Option<String>) -> Result<Self, ApiError> {
        Self::with_base_url(endpoints.widget_api_url(), secret)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        secret: Option<String>,
    ) -> Result<Self, ApiError> {
        Self::with_config(base_url, secret, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Creates a client with custom timeouts.
    ///
    /// A request that takes longer than `timeout` fails with [`ApiError::Http`].
    pub fn with_config(
        base_url: impl Into<String>,
        secret: Option<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn active_timer(&self) -> Result<Option<TimeEntry>, ApiError> {
        let response = self.request(Method::GET, "active-timer").send().await?;

        if response.status() == StatusCode::NOT_FOUND || response.status() == StatusCode::NO_CONTENT
        {
            return Ok(None);
        }
        let response = check(response).await?;

        // The API answers `null` when nothing is running
        let text = response.text().await?;
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }
        parse(trimmed).map(Some)
    }

    pub async fn start_timer(
        &self,
        project_id: u64,
        description: Option<&str>,
    ) -> Result<TimeEntry, ApiError> {
        let body = StartTimerBody {
            project_id,
            description,
        };
        self.fetch(self.request(Method::POST, "time-entries").json(&body))
            .await
    }

    pub async fn stop_timer(&self, timer_id: u64) -> Result<TimeEntry, ApiError> {
        let path = format!("time-entries/{}/stop", timer_id);
        self.fetch(self.request(Method::POST, &path)).await
    }

    pub async fn restart_timer(&self, timer_id: u64) -> Result<TimeEntry, ApiError> {
        let path = format!("time-entries/{}/restart", timer_id);
        self.fetch(self.request(Method::POST, &path)).await
    }

    pub async fn delete_entry(&self, entry_id: u64) -> Result<(), ApiError> {
        let path = format!("time-entries/{}", entry_id);
        let response = self.request(Method::DELETE, &path).send().await?;
        check(response).await?;
        Ok(())
    }

    pub async fn update_entry(
        &self,
        entry_id: u64,
        data: &UpdateEntryData,
    ) -> Result<TimeEntry, ApiError> {
        let path = format!("time-entries/{}", entry_id);
        self.fetch(self.request(Method::PUT, &path).json(data)).await
    }

    pub async fn time_entries(&self) -> Result<Vec<TimeEntry>, ApiError> {
        self.fetch(self.request(Method::GET, "time-entries")).await
    }

    pub async fn recent_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.fetch(self.request(Method::GET, "projects")).await
    }

    pub async fn clients(&self) -> Result<Vec<TrackedClient>, ApiError> {
        self.fetch(self.request(Method::GET, "clients")).await
    }

    pub async fn client_projects(&self, client_id: u64) -> Result<Vec<Project>, ApiError> {
        let path = format!("clients/{}/projects", client_id);
        self.fetch(self.request(Method::GET, &path)).await
    }

    /// Fetches settings. Only a rejected secret is an error; anything else
    /// falls back to default settings.
    pub async fn settings(&self) -> Result<UserSettings, ApiError> {
        let response = self.request(Method::GET, "settings").send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Settings unavailable, using defaults");
            return Ok(UserSettings::default());
        }

        Ok(response.json().await.unwrap_or_default())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.secret {
            Some(secret) => builder.header(SECRET_HEADER, secret),
            None => builder,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = check(builder.send().await?).await?;
        let text = response.text().await?;
        parse(&text)
    }
}

/// Maps 401 and other non-success statuses to errors.
async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

fn parse<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}
