//! Startup sequencing for the managed connector
//!
//! Runs once per process start, fire-and-forget: its outcome is logged,
//! never awaited by startup. A management API that is down at boot is a
//! normal condition — the sequence stops quietly and the remediation and
//! manual endpoints remain available.

use crate::client::ConnectClient;
use crate::config::WardenConfig;
use crate::sink_config::{SinkConnectorConfig, SinkFormat};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Ensure the connector exists: check reachability, then existence, then
/// create from the JSON-format configuration if absent.
///
/// No retries; a failed creation is terminal for this boot attempt.
pub async fn run(client: Arc<ConnectClient>, config: Arc<WardenConfig>) {
    info!("starting connector bootstrap");

    if !client.server_reachable().await {
        warn!(
            url = %client.base_url(),
            "management API not reachable, skipping connector bootstrap"
        );
        return;
    }

    let name = &config.connector.name;
    if client.exists(name).await {
        match client.status(name).await {
            Ok(status) => info!(connector = %name, %status, "connector already exists"),
            Err(e) => warn!(
                connector = %name,
                error = %e,
                "connector exists but status could not be fetched"
            ),
        }
        return;
    }

    info!(connector = %name, "connector does not exist, creating");
    let sink_config = SinkConnectorConfig::build(&config.connector, SinkFormat::Json);
    match client.create(&sink_config).await {
        Ok(body) => info!(connector = %name, response = %body, "connector created"),
        Err(e) => error!(connector = %name, error = %e, "failed to create connector"),
    }
}
