//! Health model for the managed connector
//!
//! A snapshot is derived from scratch on every check cycle: the orchestrator
//! keeps no persistent state machine, so a restarted process has nothing to
//! reload. `evaluate` never fails past this boundary — a status document
//! that cannot be parsed is itself a health signal and becomes an
//! error-carrying record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The state string the management API reports for a running entity.
/// Matching is exact and case-sensitive.
pub const RUNNING_STATE: &str = "RUNNING";

const PAUSED_STATE: &str = "PAUSED";
const FAILED_STATE: &str = "FAILED";

/// Lifecycle state of the managed connector, inferred each cycle from the
/// raw status document (the management API has no such enum of its own)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectorState {
    /// Management API did not answer the status request
    NotReachable,
    /// Connector resource does not exist
    NotExists,
    /// Connector reported running but has no tasks assigned yet
    Creating,
    /// Connector and its task are running
    Running,
    /// Connector is running but its task is not
    Degraded,
    /// Connector is paused
    Paused,
    /// Connector has failed
    Failed,
    /// Status could not be interpreted
    Unknown,
}

impl std::fmt::Display for ConnectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectorState::NotReachable => write!(f, "NOT_REACHABLE"),
            ConnectorState::NotExists => write!(f, "NOT_EXISTS"),
            ConnectorState::Creating => write!(f, "CREATING"),
            ConnectorState::Running => write!(f, "RUNNING"),
            ConnectorState::Degraded => write!(f, "DEGRADED"),
            ConnectorState::Paused => write!(f, "PAUSED"),
            ConnectorState::Failed => write!(f, "FAILED"),
            ConnectorState::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Health of the managed connector, derived from one status document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorHealth {
    /// Inferred lifecycle state
    pub state: ConnectorState,
    /// Connector and its task are both running
    pub is_running: bool,
    /// Reported state of the first (and only) task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_state: Option<String>,
    /// First task reported `RUNNING`
    pub task_running: bool,
    /// Issue description when unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectorHealth {
    /// Health record for a connector whose status could not be obtained
    pub fn failure(state: ConnectorState, error: impl Into<String>) -> Self {
        Self {
            state,
            is_running: false,
            task_state: None,
            task_running: false,
            error: Some(error.into()),
        }
    }

    /// The connector needs remediation (issue present or not running)
    pub fn needs_restart(&self) -> bool {
        self.error.is_some() || !self.is_running
    }
}

/// Point-in-time health judgment, replaced wholesale in the cache each cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    /// When the check cycle ran
    pub timestamp: DateTime<Utc>,
    /// No subsystem reported an issue
    pub is_healthy: bool,
    /// Issue description per unhealthy subsystem ("server", "connector")
    pub issues: BTreeMap<String, String>,
    /// Connector health, absent when the server itself was down
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector: Option<ConnectorHealth>,
}

impl HealthSnapshot {
    /// Snapshot for a cycle that never reached the connector: the server
    /// itself was down or the cycle failed outright
    pub fn unhealthy(subsystem: &str, issue: impl Into<String>) -> Self {
        let mut issues = BTreeMap::new();
        issues.insert(subsystem.to_string(), issue.into());
        Self {
            timestamp: Utc::now(),
            is_healthy: false,
            issues,
            connector: None,
        }
    }

    /// Snapshot folding in a freshly evaluated connector health record
    pub fn from_connector(connector: ConnectorHealth) -> Self {
        let mut issues = BTreeMap::new();
        if let Some(error) = &connector.error {
            issues.insert("connector".to_string(), error.clone());
        }
        Self {
            timestamp: Utc::now(),
            is_healthy: issues.is_empty(),
            issues,
            connector: Some(connector),
        }
    }
}

/// Derive connector health from the raw status document.
///
/// Reads `connector.state` and `tasks[0].state`; the deployment pins
/// `tasks.max` to 1, so the first task is authoritative. An empty task list
/// is a failure condition, not an absent optional.
pub fn evaluate(document: &str) -> ConnectorHealth {
    let doc: Value = match serde_json::from_str(document) {
        Ok(value) => value,
        Err(e) => {
            return ConnectorHealth::failure(
                ConnectorState::Unknown,
                format!("failed to parse connector status: {e}"),
            );
        }
    };

    let connector_state = doc
        .pointer("/connector/state")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let tasks = doc.pointer("/tasks").and_then(Value::as_array);
    let first_task = tasks.and_then(|tasks| tasks.first());

    let Some(task) = first_task else {
        let state = match connector_state {
            RUNNING_STATE => ConnectorState::Creating,
            PAUSED_STATE => ConnectorState::Paused,
            FAILED_STATE => ConnectorState::Failed,
            _ => ConnectorState::Unknown,
        };
        return ConnectorHealth::failure(state, "no tasks found for connector");
    };

    let task_state = task
        .get("state")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let task_running = task_state == RUNNING_STATE;

    let error = if task_running {
        None
    } else {
        let trace = task.get("trace").and_then(Value::as_str).unwrap_or_default();
        Some(format!("task not running: {task_state}, trace: {trace}"))
    };

    let state = match connector_state {
        RUNNING_STATE if task_running => ConnectorState::Running,
        RUNNING_STATE => ConnectorState::Degraded,
        PAUSED_STATE => ConnectorState::Paused,
        FAILED_STATE => ConnectorState::Failed,
        _ => ConnectorState::Unknown,
    };

    ConnectorHealth {
        state,
        is_running: connector_state == RUNNING_STATE && task_running,
        task_state: Some(task_state),
        task_running,
        error,
    }
}
