//! connect-warden - lifecycle orchestrator for a hosted HDFS sink connector
//!
//! # Architecture
//!
//! The connector itself runs inside an external connect cluster; the warden
//! owns its lifecycle from the outside, through the cluster's management
//! REST API.
//!
//! ```text
//! ┌──────────────┐  REST   ┌────────────────┐  drains   ┌─────────────┐
//! │    warden    │────────▶│ connect worker │──────────▶│ HDFS (time- │
//! │ (this crate) │         │ + sink task    │           │  bucketed)  │
//! └──────────────┘         └────────────────┘           └─────────────┘
//!        │ bootstrap: create-if-absent
//!        │ monitor:   poll status → snapshot → cache
//!        │ remediate: restart when unhealthy
//!        └ façade:    health / lifecycle endpoints
//! ```
//!
//! # Usage
//!
//! ```bash
//! # Run the orchestrator (bootstrap + monitor + API)
//! connect-warden -c warden.yaml
//!
//! # Validate configuration
//! connect-warden -c warden.yaml validate
//!
//! # One-shot connectivity / status checks
//! connect-warden -c warden.yaml check
//! connect-warden -c warden.yaml status
//! ```

pub mod api;
pub mod bootstrap;
pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod monitor;
pub mod sink_config;

// Re-export the core types at the crate root for ergonomic use
pub use client::{ConnectClient, MAX_RESPONSE_BYTES};
pub use config::WardenConfig;
pub use error::{ClientError, ClientResult, Result, WardenError};
pub use health::{evaluate, ConnectorHealth, ConnectorState, HealthSnapshot};
pub use monitor::{ConnectMonitor, SharedMonitor};
pub use sink_config::{SinkConnectorConfig, SinkFormat};
