//! In-process fake of the connector management REST API.
//!
//! Serves the same endpoint shapes the warden consumes, with switchable
//! reachability and status documents plus request counters so tests can
//! assert which operations were actually invoked.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use connect_warden::WardenConfig;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Mutable state behind the fake management API
pub struct FakeState {
    /// When false, `GET /` answers 503 while every other route stays up,
    /// letting tests verify the short-circuit without killing the server
    pub reachable: AtomicBool,
    /// Registered connectors: name -> stored config
    pub connectors: Mutex<HashMap<String, Value>>,
    /// Status document served for any connector, when present
    pub status_doc: Mutex<Option<Value>>,
    pub status_requests: AtomicUsize,
    pub create_requests: AtomicUsize,
    pub restart_requests: AtomicUsize,
}

impl FakeState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            reachable: AtomicBool::new(true),
            connectors: Mutex::new(HashMap::new()),
            status_doc: Mutex::new(None),
            status_requests: AtomicUsize::new(0),
            create_requests: AtomicUsize::new(0),
            restart_requests: AtomicUsize::new(0),
        })
    }

    pub fn set_status(&self, doc: Value) {
        *self.status_doc.lock() = Some(doc);
    }

    pub fn register_connector(&self, name: &str, config: Value) {
        self.connectors.lock().insert(name.to_string(), config);
    }

    pub fn stored_config(&self, name: &str) -> Option<Value> {
        self.connectors.lock().get(name).cloned()
    }

    pub fn restart_count(&self) -> usize {
        self.restart_requests.load(Ordering::SeqCst)
    }

    pub fn status_count(&self) -> usize {
        self.status_requests.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> usize {
        self.create_requests.load(Ordering::SeqCst)
    }
}

/// Status document for a connector whose task is running
pub fn running_status(name: &str) -> Value {
    json!({
        "name": name,
        "connector": { "state": "RUNNING", "worker_id": "worker-1:8083" },
        "tasks": [
            { "id": 0, "state": "RUNNING", "worker_id": "worker-1:8083" }
        ],
        "type": "sink",
    })
}

/// Status document for a connector whose task has failed with a trace
pub fn failed_task_status(name: &str, trace: &str) -> Value {
    json!({
        "name": name,
        "connector": { "state": "RUNNING", "worker_id": "worker-1:8083" },
        "tasks": [
            { "id": 0, "state": "FAILED", "worker_id": "worker-1:8083", "trace": trace }
        ],
        "type": "sink",
    })
}

/// Spawn the fake on an ephemeral port and return its base URL
pub async fn spawn_fake_connect(state: Arc<FakeState>) -> String {
    let app = Router::new()
        .route("/", get(root))
        .route("/connectors", get(list_connectors).post(create_connector))
        .route(
            "/connectors/{name}",
            get(get_connector).delete(delete_connector),
        )
        .route("/connectors/{name}/status", get(connector_status))
        .route("/connectors/{name}/config", get(connector_config))
        .route("/connectors/{name}/pause", put(pause_connector))
        .route("/connectors/{name}/resume", put(resume_connector))
        .route("/connectors/{name}/restart", post(restart_connector))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Warden configuration pointed at the fake, with short timeouts
pub fn test_config(base_url: &str) -> WardenConfig {
    let mut config = WardenConfig::default();
    config.connect.url = base_url.to_string();
    config.connect.connection_timeout_ms = 1_000;
    config.connect.request_timeout_ms = 2_000;
    config.monitor.check_interval_secs = 1;
    config
}

fn not_found(name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error_code": 404,
            "message": format!("Connector {name} not found"),
        })),
    )
        .into_response()
}

async fn root(State(state): State<Arc<FakeState>>) -> Response {
    if state.reachable.load(Ordering::SeqCst) {
        Json(json!({ "version": "4.0.0", "kafka_cluster_id": "fake-cluster" })).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "worker unavailable").into_response()
    }
}

async fn list_connectors(State(state): State<Arc<FakeState>>) -> Response {
    let names: Vec<String> = state.connectors.lock().keys().cloned().collect();
    Json(json!(names)).into_response()
}

async fn create_connector(
    State(state): State<Arc<FakeState>>,
    Json(body): Json<Value>,
) -> Response {
    state.create_requests.fetch_add(1, Ordering::SeqCst);

    let config = body.get("config").cloned().unwrap_or(Value::Null);
    let name = config
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error_code": 400, "message": "config must contain a name" })),
        )
            .into_response();
    }

    let mut connectors = state.connectors.lock();
    if connectors.contains_key(&name) {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "error_code": 409,
                "message": format!("Connector {name} already exists"),
            })),
        )
            .into_response();
    }
    connectors.insert(name.clone(), config.clone());

    (
        StatusCode::CREATED,
        Json(json!({ "name": name, "config": config, "tasks": [], "type": "sink" })),
    )
        .into_response()
}

async fn get_connector(
    State(state): State<Arc<FakeState>>,
    Path(name): Path<String>,
) -> Response {
    match state.connectors.lock().get(&name) {
        Some(config) => Json(json!({
            "name": name,
            "config": config,
            "tasks": [{ "connector": name, "task": 0 }],
            "type": "sink",
        }))
        .into_response(),
        None => not_found(&name),
    }
}

async fn delete_connector(
    State(state): State<Arc<FakeState>>,
    Path(name): Path<String>,
) -> Response {
    if state.connectors.lock().remove(&name).is_some() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(&name)
    }
}

async fn connector_status(
    State(state): State<Arc<FakeState>>,
    Path(name): Path<String>,
) -> Response {
    state.status_requests.fetch_add(1, Ordering::SeqCst);
    match state.status_doc.lock().clone() {
        Some(doc) => Json(doc).into_response(),
        None => not_found(&name),
    }
}

async fn connector_config(
    State(state): State<Arc<FakeState>>,
    Path(name): Path<String>,
) -> Response {
    match state.connectors.lock().get(&name) {
        Some(config) => Json(config.clone()).into_response(),
        None => not_found(&name),
    }
}

async fn pause_connector(
    State(state): State<Arc<FakeState>>,
    Path(name): Path<String>,
) -> Response {
    if state.connectors.lock().contains_key(&name) {
        StatusCode::ACCEPTED.into_response()
    } else {
        not_found(&name)
    }
}

async fn resume_connector(
    State(state): State<Arc<FakeState>>,
    Path(name): Path<String>,
) -> Response {
    if state.connectors.lock().contains_key(&name) {
        StatusCode::ACCEPTED.into_response()
    } else {
        not_found(&name)
    }
}

async fn restart_connector(
    State(state): State<Arc<FakeState>>,
    Path(_name): Path<String>,
) -> Response {
    state.restart_requests.fetch_add(1, Ordering::SeqCst);
    StatusCode::NO_CONTENT.into_response()
}
