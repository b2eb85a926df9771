//! Tests for the reference host against a fake widget API.
//!
//! The fake API is an axum router on a random local port:
//! - Requests without the right `X-Widget-Secret` get 401
//! - Stopping timer 999 fails with 422
//! - Settings always fail with 500
//! - Restarting a timer never answers

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use timetrack::config::{Endpoints, HostConfig};
use timetrack::gateway::{Gateway, GatewayError, InvokeError, SocketInvoker};
use timetrack::host::{ApiHost, HostServer, MockNotifier, ToggleOutcome, WidgetApi};

// ============================================================================
// Fake widget API
// ============================================================================

const SECRET: &str = "s3cret";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-widget-secret")
        .and_then(|v| v.to_str().ok())
        == Some(SECRET)
}

fn guarded(headers: &HeaderMap, body: Value) -> Response {
    if !authorized(headers) {
        return (StatusCode::UNAUTHORIZED, "invalid widget secret").into_response();
    }
    Json(body).into_response()
}

fn running_entry(project_id: u64) -> Value {
    json!({
        "id": 77,
        "project_id": project_id,
        "project": {"id": project_id, "name": "Website", "client": {"id": 1, "name": "Acme", "hourly_rate": 85}},
        "description": null,
        "started_at": "2026-10-17T09:00:00Z",
        "stopped_at": null
    })
}

fn stopped_entry(id: u64) -> Value {
    json!({
        "id": id,
        "project_id": 5,
        "project": {"id": 5, "name": "Website"},
        "started_at": "2026-10-17T09:00:00Z",
        "stopped_at": "2026-10-17T10:30:00Z",
        "duration_minutes": 90.0
    })
}

async fn active_timer(headers: HeaderMap) -> Response {
    guarded(&headers, Value::Null)
}

async fn start_timer(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let project_id = body.get("project_id").and_then(Value::as_u64).unwrap_or(0);
    guarded(&headers, running_entry(project_id))
}

async fn stop_timer(headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if id == 999 && authorized(&headers) {
        return (StatusCode::UNPROCESSABLE_ENTITY, "project archived").into_response();
    }
    guarded(&headers, stopped_entry(id))
}

async fn delete_entry(headers: HeaderMap, Path(_id): Path<u64>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn clients(headers: HeaderMap) -> Response {
    guarded(
        &headers,
        json!([{"id": 1, "name": "Acme", "hourly_rate": "85.50"}]),
    )
}

async fn client_projects(headers: HeaderMap, Path(id): Path<u64>) -> Response {
    guarded(
        &headers,
        json!([{"id": 5, "name": "Website", "client": {"id": id, "name": "Acme"}}]),
    )
}

async fn restart_timer() -> Response {
    tokio::time::sleep(Duration::from_secs(3600)).await;
    StatusCode::OK.into_response()
}

async fn settings() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn spawn_fake_api() -> SocketAddr {
    let app = Router::new()
        .route("/api/widget/active-timer", get(active_timer))
        .route("/api/widget/time-entries", post(start_timer))
        .route("/api/widget/time-entries/{id}/stop", post(stop_timer))
        .route("/api/widget/time-entries/{id}/restart", post(restart_timer))
        .route("/api/widget/time-entries/{id}", delete(delete_entry))
        .route("/api/widget/clients", get(clients))
        .route("/api/widget/clients/{id}/projects", get(client_projects))
        .route("/api/widget/settings", get(settings));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

// ============================================================================
// Test Helpers
// ============================================================================

fn create_temp_socket_path() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api_host_test.sock");
    // Keep the directory so it's not deleted
    std::mem::forget(dir);
    path
}

fn endpoints(addr: SocketAddr) -> Endpoints {
    Endpoints::new(
        format!("http://{}/api", addr),
        format!("ws://{}", addr),
        format!("http://{}", addr),
    )
}

async fn host_with_secret(secret: Option<&str>) -> ApiHost<MockNotifier> {
    let addr = spawn_fake_api().await;
    let api = WidgetApi::new(&endpoints(addr), secret.map(str::to_string)).unwrap();
    ApiHost::new(api, MockNotifier::new())
}

fn socket_pair() -> (HostServer, Gateway<SocketInvoker>) {
    let socket_path = create_temp_socket_path();
    let server = HostServer::new(&socket_path).unwrap();
    (server, Gateway::new(SocketInvoker::with_socket_path(socket_path)))
}

// ============================================================================
// Gateway through the host
// ============================================================================

#[tokio::test]
async fn test_reads_through_host() {
    let host = host_with_secret(Some(SECRET)).await;
    let (server, gateway) = socket_pair();

    let (_, timer) = tokio::join!(server.serve_one(&host), gateway.get_active_timer());
    assert_eq!(timer, Ok(None));

    let (_, clients) = tokio::join!(server.serve_one(&host), gateway.get_clients());
    let clients = clients.unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].hourly_rate, Some(85.5));

    let (_, projects) = tokio::join!(server.serve_one(&host), gateway.get_client_projects(1));
    assert_eq!(projects.unwrap()[0].display_name(), "Acme - Website");
}

#[tokio::test]
async fn test_mutations_through_host() {
    let host = host_with_secret(Some(SECRET)).await;
    let (server, gateway) = socket_pair();

    let (_, started) = tokio::join!(server.serve_one(&host), gateway.start_timer(5, None));
    assert_eq!(started.unwrap().map(|e| e.project_id), Some(5));

    let (_, stopped) = tokio::join!(server.serve_one(&host), gateway.stop_timer(77));
    assert_eq!(stopped.unwrap().and_then(|e| e.duration_minutes), Some(90.0));

    let (_, deleted) = tokio::join!(server.serve_one(&host), gateway.delete_entry(77));
    assert_eq!(deleted, Ok(()));
}

#[tokio::test]
async fn test_api_failure_propagates_on_mutation() {
    let host = host_with_secret(Some(SECRET)).await;
    let (server, gateway) = socket_pair();

    let (_, result) = tokio::join!(server.serve_one(&host), gateway.stop_timer(999));

    match result {
        Err(GatewayError::Invoke(InvokeError::Backend(err))) => {
            assert_eq!(err.message, "API error 422: project archived");
        }
        other => panic!("Expected backend error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_hung_api_call_times_out_and_host_keeps_serving() {
    let addr = spawn_fake_api().await;
    let api = WidgetApi::with_config(
        format!("http://{}/api/widget", addr),
        Some(SECRET.to_string()),
        Duration::from_millis(200),
        Duration::from_millis(200),
    )
    .unwrap();
    let host = ApiHost::new(api, MockNotifier::new());
    let (server, gateway) = socket_pair();

    let calls = async {
        let restarted = gateway.restart_timer(77).await;
        gateway.update_tray_timer(5.0).await;
        let clients = gateway.get_clients().await;
        (restarted, clients)
    };

    let (restarted, clients) = tokio::time::timeout(Duration::from_secs(10), async {
        tokio::select! {
            _ = server.run(&host) => panic!("run returned"),
            results = calls => results,
        }
    })
    .await
    .expect("host stalled behind a hung API call");

    match restarted {
        Err(GatewayError::Invoke(InvokeError::Backend(err))) => {
            assert!(err.message.starts_with("HTTP request failed"));
        }
        other => panic!("Expected backend error, got {:?}", other),
    }
    assert_eq!(host.tray().title().as_deref(), Some("00:05"));
    assert_eq!(clients.unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejected_secret_is_auth_required() {
    let host = host_with_secret(Some("wrong")).await;
    let (server, gateway) = socket_pair();

    let (_, timer) = tokio::join!(server.serve_one(&host), gateway.get_active_timer());
    assert_eq!(timer, Err(GatewayError::AuthRequired));

    let (_, started) = tokio::join!(server.serve_one(&host), gateway.start_timer(5, None));
    assert_eq!(started, Err(GatewayError::AuthRequired));

    let (_, settings) = tokio::join!(server.serve_one(&host), gateway.get_settings());
    assert!(!settings.shows_live_revenue());
}

#[tokio::test]
async fn test_settings_failure_degrades() {
    let host = host_with_secret(Some(SECRET)).await;

    let settings = host.api().settings().await.unwrap();
    assert_eq!(settings, Default::default());
}

// ============================================================================
// Global shortcut toggle
// ============================================================================

#[tokio::test]
async fn test_toggle_starts_then_stops() {
    let host = host_with_secret(Some(SECRET)).await;
    let (server, gateway) = socket_pair();

    // The frontend tells the host which project to fall back to
    let (served, ()) = tokio::join!(server.serve_one(&host), gateway.sync_timer_state(None, Some(5)));
    served.unwrap();

    let started = match host.toggle_timer().await.unwrap() {
        ToggleOutcome::Started(entry) => entry,
        other => panic!("Expected Started, got {:?}", other),
    };
    assert_eq!(started.id, 77);
    assert_eq!(host.tray().active_timer().map(|t| t.id), Some(77));
    assert_eq!(host.tray().tooltip(), "Timetrack - Acme - Website (Running)");

    let stopped = match host.toggle_timer().await.unwrap() {
        ToggleOutcome::Stopped(entry) => entry,
        other => panic!("Expected Stopped, got {:?}", other),
    };
    assert_eq!(stopped.id, 77);
    assert_eq!(host.tray().active_timer(), None);
    assert_eq!(host.tray().tooltip(), "Timetrack - No active timer");

    assert_eq!(
        host.notifier().sent(),
        vec![
            ("Timer Started".to_string(), "Acme - Website".to_string()),
            ("Timer Stopped".to_string(), "Website - 1h 30m".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_toggle_notification_failure_is_ignored() {
    let host = host_with_secret(Some(SECRET)).await;
    host.notifier().set_should_fail(true);
    host.tray().sync(None, Some(5));

    let outcome = host.toggle_timer().await.unwrap();

    assert!(matches!(outcome, ToggleOutcome::Started(_)));
    assert!(host.notifier().sent().is_empty());
}

#[tokio::test]
async fn test_toggle_with_rejected_secret() {
    let host = host_with_secret(None).await;
    host.tray().sync(None, Some(5));

    let err = host.toggle_timer().await.unwrap_err();

    assert!(err.to_string().contains("Not authenticated"));
    assert_eq!(host.tray().active_timer(), None);
}

#[tokio::test]
async fn test_from_config_uses_widget_url() {
    let config = HostConfig::new(Endpoints::production())
        .unwrap()
        .with_widget_secret(Some(SECRET.to_string()));
    let host = ApiHost::from_config(&config, MockNotifier::new()).unwrap();
    assert_eq!(host.api().base_url(), "https://getfreshtracks.com/api/widget");
}
