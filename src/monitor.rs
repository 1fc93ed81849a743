//! Scheduled health monitoring and auto-remediation
//!
//! One `ConnectMonitor` owns the health cache and the check period. The
//! periodic tick and the on-demand trigger converge on `check_health`, so
//! both paths produce and store snapshots the same way. The cache is a
//! single cell replaced wholesale under a write lock; concurrent checks
//! race last-writer-wins, which is safe because health is a best-effort
//! read to begin with.

use crate::client::ConnectClient;
use crate::config::WardenConfig;
use crate::error::{ClientError, ClientResult};
use crate::health::{self, ConnectorHealth, ConnectorState, HealthSnapshot};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Shared handle to the connect monitor
pub type SharedMonitor = Arc<ConnectMonitor>;

/// Drives periodic health checks and holds the latest snapshot
pub struct ConnectMonitor {
    client: Arc<ConnectClient>,
    connector_name: String,
    check_interval: Duration,
    cache: RwLock<Option<HealthSnapshot>>,
}

impl ConnectMonitor {
    /// Create a new monitor for the configured connector
    pub fn new(client: Arc<ConnectClient>, config: &WardenConfig) -> Self {
        Self {
            client,
            connector_name: config.connector.name.clone(),
            check_interval: Duration::from_secs(config.monitor.check_interval_secs),
            cache: RwLock::new(None),
        }
    }

    /// Name of the managed connector
    pub fn connector_name(&self) -> &str {
        &self.connector_name
    }

    /// Configured check period
    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// Latest snapshot, if a check cycle has completed
    pub fn cached(&self) -> Option<HealthSnapshot> {
        self.cache.read().clone()
    }

    /// Whether the latest snapshot judged the system healthy.
    /// `false` until the first cycle completes.
    pub fn is_healthy(&self) -> bool {
        self.cache
            .read()
            .as_ref()
            .map(|snapshot| snapshot.is_healthy)
            .unwrap_or(false)
    }

    /// Run one health-check cycle and store the resulting snapshot.
    ///
    /// Server unreachable short-circuits: the connector status endpoint is
    /// not queried when the management API itself is down. The cache is set
    /// after every cycle, whatever the outcome.
    pub async fn check_health(&self) -> HealthSnapshot {
        let snapshot = if self.client.server_reachable().await {
            HealthSnapshot::from_connector(self.connector_health().await)
        } else {
            HealthSnapshot::unhealthy(
                "server",
                format!(
                    "management API not reachable at {}",
                    self.client.base_url()
                ),
            )
        };

        self.store(snapshot.clone());
        snapshot
    }

    /// Fetch and evaluate the connector's health right now.
    ///
    /// Read-only inspection never errors: client failures are downgraded to
    /// error-carrying health records per their cause.
    pub async fn connector_health(&self) -> ConnectorHealth {
        match self.client.status(&self.connector_name).await {
            Ok(document) => health::evaluate(&document),
            Err(e) if e.is_not_found() => ConnectorHealth::failure(
                ConnectorState::NotExists,
                format!("connector {} not found", self.connector_name),
            ),
            Err(e @ ClientError::Transport(_)) => ConnectorHealth::failure(
                ConnectorState::NotReachable,
                format!("failed to get connector status: {e}"),
            ),
            Err(e) => ConnectorHealth::failure(
                ConnectorState::Unknown,
                format!("failed to get connector status: {e}"),
            ),
        }
    }

    /// Restart the connector if its freshly computed health warrants it.
    ///
    /// Health is recomputed rather than read from the cache so the decision
    /// never acts on stale data. At most one restart per invocation; a
    /// failed restart call surfaces to the caller unchanged.
    pub async fn restart_if_needed(&self) -> ClientResult<String> {
        let connector = self.connector_health().await;
        if !connector.needs_restart() {
            return Ok("connector is healthy, no restart needed".to_string());
        }

        warn!(
            connector = %self.connector_name,
            state = %connector.state,
            error = connector.error.as_deref().unwrap_or_default(),
            "connector is not healthy, attempting restart"
        );
        let body = self.client.restart(&self.connector_name).await?;
        info!(connector = %self.connector_name, "connector restart completed");

        if body.is_empty() {
            Ok("connector restart requested".to_string())
        } else {
            Ok(body)
        }
    }

    /// Replace the cached snapshot (single assignment, last-writer-wins).
    /// Timestamps are clamped non-decreasing against the previous snapshot.
    fn store(&self, mut snapshot: HealthSnapshot) {
        let mut cache = self.cache.write();
        if let Some(previous) = cache.as_ref() {
            if snapshot.timestamp < previous.timestamp {
                snapshot.timestamp = previous.timestamp;
            }
        }
        *cache = Some(snapshot);
    }

    /// Run the periodic check loop until shutdown fires.
    ///
    /// The first tick runs immediately, giving the cache an initial value
    /// shortly after startup.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        info!(
            connector = %self.connector_name,
            interval_secs = self.check_interval.as_secs(),
            "starting health monitor"
        );

        let mut ticker = tokio::time::interval(self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snapshot = self.check_health().await;
                    if snapshot.is_healthy {
                        info!(connector = %self.connector_name, "health check passed");
                    } else {
                        warn!(
                            connector = %self.connector_name,
                            issues = ?snapshot.issues,
                            "health check failed"
                        );
                    }
                }
                _ = shutdown.recv() => {
                    info!("health monitor stopping");
                    break;
                }
            }
        }
    }
}
