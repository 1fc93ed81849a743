//! HTTP façade for the orchestrator
//!
//! One-to-one mapping over the monitor and client operations: successes are
//! 200-class, operation failures 500-class with a short diagnostic, and an
//! unhealthy cached snapshot surfaces as 503 on the plain health read
//! (service-unavailable semantics, distinct from outright failures).

use crate::client::ConnectClient;
use crate::config::WardenConfig;
use crate::health::HealthSnapshot;
use crate::monitor::SharedMonitor;
use crate::sink_config::{SinkConnectorConfig, SinkFormat};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state for the API handlers
#[derive(Clone)]
pub struct ApiState {
    pub client: Arc<ConnectClient>,
    pub monitor: SharedMonitor,
    pub config: Arc<WardenConfig>,
}

/// Build the façade router
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/connect/health", get(get_health))
        .route("/api/connect/health/check", post(run_health_check))
        .route("/api/connect/connector/status", get(connector_status))
        .route("/api/connect/connector/metrics", get(connector_metrics))
        .route("/api/connect/connector/config", get(connector_config))
        .route("/api/connect/connector/create", post(create_connector))
        .route("/api/connect/connector", delete(delete_connector))
        .route("/api/connect/connector/pause", post(pause_connector))
        .route("/api/connect/connector/resume", post(resume_connector))
        .route("/api/connect/connector/restart", post(restart_connector))
        .route("/api/connect/connector/auto-restart", post(auto_restart))
        .route("/api/connect/connector/exists", get(connector_exists))
        .route("/api/connect/connectors", get(list_connectors))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the façade until the shutdown channel fires
pub async fn serve(
    state: ApiState,
    addr: SocketAddr,
    mut shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;
    Ok(())
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

/// Raw management-API body, passed through verbatim
fn passthrough(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

fn snapshot_response(snapshot: HealthSnapshot) -> Response {
    let status = if snapshot.is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let mut body = serde_json::to_value(&snapshot).unwrap_or_else(|_| json!({}));
    if let Some(object) = body.as_object_mut() {
        object.insert("lastChecked".to_string(), json!(snapshot.timestamp));
    }
    (status, Json(body)).into_response()
}

/// Cached health snapshot; 503 until the system is judged healthy
async fn get_health(State(state): State<ApiState>) -> Response {
    match state.monitor.cached() {
        Some(snapshot) => snapshot_response(snapshot),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "isHealthy": false,
                "issues": { "monitor": "no health check has completed yet" },
            })),
        )
            .into_response(),
    }
}

/// Run a check cycle synchronously and return its snapshot
async fn run_health_check(State(state): State<ApiState>) -> Response {
    snapshot_response(state.monitor.check_health().await)
}

async fn connector_status(State(state): State<ApiState>) -> Response {
    match state.client.status(state.monitor.connector_name()).await {
        Ok(body) => passthrough(body),
        Err(e) => internal_error(format!("failed to get connector status: {e}")),
    }
}

/// Summary metrics extracted from the status document
async fn connector_metrics(State(state): State<ApiState>) -> Response {
    let name = state.monitor.connector_name();
    let document = match state.client.status(name).await {
        Ok(body) => body,
        Err(e) => return internal_error(format!("failed to get connector metrics: {e}")),
    };

    let doc: Value = match serde_json::from_str(&document) {
        Ok(value) => value,
        Err(e) => return internal_error(format!("failed to parse metrics: {e}")),
    };

    let mut metrics = json!({
        "connectorName": name,
        "connectorState": doc.pointer("/connector/state").cloned().unwrap_or(Value::Null),
    });
    if let Some(task) = doc.pointer("/tasks/0") {
        metrics["taskId"] = task.get("id").cloned().unwrap_or(Value::Null);
        metrics["taskState"] = task.get("state").cloned().unwrap_or(Value::Null);
        metrics["workerId"] = task.get("worker_id").cloned().unwrap_or(Value::Null);
    }
    Json(metrics).into_response()
}

async fn connector_config(State(state): State<ApiState>) -> Response {
    let document = match state.client.config(state.monitor.connector_name()).await {
        Ok(body) => body,
        Err(e) => return internal_error(format!("failed to get connector config: {e}")),
    };
    match serde_json::from_str::<Value>(&document) {
        Ok(config) => Json(json!({ "config": config })).into_response(),
        Err(e) => internal_error(format!("failed to parse connector config: {e}")),
    }
}

#[derive(Debug, Deserialize)]
struct CreateParams {
    #[serde(default)]
    use_avro: bool,
}

async fn create_connector(
    State(state): State<ApiState>,
    Query(params): Query<CreateParams>,
) -> Response {
    let sink_config = SinkConnectorConfig::build(
        &state.config.connector,
        SinkFormat::from_use_avro(params.use_avro),
    );
    match state.client.create(&sink_config).await {
        Ok(body) => Json(json!({ "result": "connector created", "response": body })).into_response(),
        Err(e) => internal_error(format!("failed to create connector: {e}")),
    }
}

async fn delete_connector(State(state): State<ApiState>) -> Response {
    match state.client.delete(state.monitor.connector_name()).await {
        Ok(_) => Json(json!({ "result": "connector deleted" })).into_response(),
        Err(e) => internal_error(format!("failed to delete connector: {e}")),
    }
}

async fn pause_connector(State(state): State<ApiState>) -> Response {
    match state.client.pause(state.monitor.connector_name()).await {
        Ok(_) => Json(json!({ "result": "connector paused" })).into_response(),
        Err(e) => internal_error(format!("failed to pause connector: {e}")),
    }
}

async fn resume_connector(State(state): State<ApiState>) -> Response {
    match state.client.resume(state.monitor.connector_name()).await {
        Ok(_) => Json(json!({ "result": "connector resumed" })).into_response(),
        Err(e) => internal_error(format!("failed to resume connector: {e}")),
    }
}

async fn restart_connector(State(state): State<ApiState>) -> Response {
    match state.client.restart(state.monitor.connector_name()).await {
        Ok(_) => Json(json!({ "result": "connector restarted" })).into_response(),
        Err(e) => internal_error(format!("failed to restart connector: {e}")),
    }
}

/// Remediation trigger: restart only if the fresh health warrants it
async fn auto_restart(State(state): State<ApiState>) -> Response {
    match state.monitor.restart_if_needed().await {
        Ok(result) => Json(json!({ "result": result })).into_response(),
        Err(e) => internal_error(format!("failed to auto-restart connector: {e}")),
    }
}

async fn connector_exists(State(state): State<ApiState>) -> Response {
    let exists = state.client.exists(state.monitor.connector_name()).await;
    Json(json!({ "exists": exists })).into_response()
}

async fn list_connectors(State(state): State<ApiState>) -> Response {
    match state.client.list().await {
        Ok(body) => passthrough(body),
        Err(e) => internal_error(format!("failed to list connectors: {e}")),
    }
}
