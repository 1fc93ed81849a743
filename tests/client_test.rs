//! Management-API client contract against a fake server

mod common;

use common::{running_status, spawn_fake_connect, test_config, FakeState};
use connect_warden::{ConnectClient, SinkConnectorConfig, SinkFormat};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const CONNECTOR: &str = "hdfs-sink-connector";

async fn client_against(state: Arc<FakeState>) -> ConnectClient {
    let base_url = spawn_fake_connect(state).await;
    let config = test_config(&base_url);
    ConnectClient::new(&config.connect).unwrap()
}

#[tokio::test]
async fn server_reachable_follows_root_response() {
    let state = FakeState::new();
    let client = client_against(state.clone()).await;

    assert!(client.server_reachable().await);

    state.reachable.store(false, Ordering::SeqCst);
    assert!(!client.server_reachable().await);
}

#[tokio::test]
async fn exists_resolves_absence_to_false() {
    let state = FakeState::new();
    let client = client_against(state.clone()).await;

    assert!(!client.exists(CONNECTOR).await);

    state.register_connector(CONNECTOR, json!({ "name": CONNECTOR }));
    assert!(client.exists(CONNECTOR).await);
}

#[tokio::test]
async fn status_passes_remote_body_through_verbatim() {
    let state = FakeState::new();
    state.set_status(running_status(CONNECTOR));
    let client = client_against(state.clone()).await;

    let body = client.status(CONNECTOR).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed, running_status(CONNECTOR));
}

#[tokio::test]
async fn status_of_missing_connector_is_not_found() {
    let state = FakeState::new();
    let client = client_against(state.clone()).await;

    let err = client.status(CONNECTOR).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn create_stores_synthesized_config() {
    let state = FakeState::new();
    let client = client_against(state.clone()).await;
    let config = SinkConnectorConfig::build(&test_config("http://x").connector, SinkFormat::Json);

    let body = client.create(&config).await.unwrap();
    assert!(body.contains(CONNECTOR));

    let stored = state.stored_config(CONNECTOR).unwrap();
    assert_eq!(stored["topics"], json!("events"));
    assert_eq!(stored["flush.size"], json!(100));
}

#[tokio::test]
async fn create_conflict_embeds_remote_diagnostic() {
    let state = FakeState::new();
    state.register_connector(CONNECTOR, json!({ "name": CONNECTOR }));
    let client = client_against(state.clone()).await;
    let config = SinkConnectorConfig::build(&test_config("http://x").connector, SinkFormat::Json);

    let err = client.create(&config).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("409"));
    assert!(message.contains("already exists"));
}

#[tokio::test]
async fn lifecycle_verbs_round_trip() {
    let state = FakeState::new();
    state.register_connector(CONNECTOR, json!({ "name": CONNECTOR }));
    let client = client_against(state.clone()).await;

    client.pause(CONNECTOR).await.unwrap();
    client.resume(CONNECTOR).await.unwrap();
    client.restart(CONNECTOR).await.unwrap();
    assert_eq!(state.restart_count(), 1);

    client.delete(CONNECTOR).await.unwrap();
    assert!(!client.exists(CONNECTOR).await);

    let err = client.pause(CONNECTOR).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn list_returns_registered_names() {
    let state = FakeState::new();
    state.register_connector(CONNECTOR, json!({ "name": CONNECTOR }));
    let client = client_against(state.clone()).await;

    let body = client.list().await.unwrap();
    let names: Vec<String> = serde_json::from_str(&body).unwrap();
    assert_eq!(names, vec![CONNECTOR.to_string()]);
}
