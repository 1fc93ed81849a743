//! Configuration types for connect-warden
//!
//! Architecture:
//!   Warden → management REST API → hosted sink connector
//!
//! Settings are loaded from a YAML file with `${VAR}` / `${VAR:-default}`
//! environment expansion, and every field carries a serde default so a
//! minimal file (just `connect.url`) is enough to run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;

/// Pre-compiled regex for environment variable expansion
/// Pattern: ${VAR} or ${VAR:-default}
static ENV_VAR_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("env var regex pattern is invalid - this is a bug")
});

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WardenConfig {
    /// Management-API connection configuration
    #[serde(default)]
    pub connect: ConnectSettings,

    /// Desired configuration of the managed sink connector
    #[serde(default)]
    pub connector: ConnectorSettings,

    /// Health monitoring configuration
    #[serde(default)]
    pub monitor: MonitorSettings,

    /// HTTP API configuration
    #[serde(default)]
    pub api: ApiSettings,
}

/// Management-API connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectSettings {
    /// Base URL of the connector management REST API
    #[serde(default = "default_connect_url")]
    pub url: String,

    /// Connection timeout in milliseconds
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// Request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ConnectSettings {
    fn default() -> Self {
        Self {
            url: default_connect_url(),
            connection_timeout_ms: default_connection_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_connect_url() -> String {
    "http://localhost:8083".to_string()
}

fn default_connection_timeout_ms() -> u64 {
    10_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Desired configuration of the managed HDFS sink connector
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectorSettings {
    /// Connector name (the single managed connector resource)
    #[serde(default = "default_connector_name")]
    pub name: String,

    /// Comma-separated source topics the connector drains
    #[serde(default = "default_topics")]
    pub topics: String,

    /// HDFS namenode URI
    #[serde(default = "default_hdfs_url")]
    pub hdfs_url: String,

    /// Root directory for topic data in HDFS
    #[serde(default = "default_topics_dir")]
    pub topics_dir: String,

    /// Hadoop configuration directory on the connect workers
    #[serde(default = "default_hadoop_conf_dir")]
    pub hadoop_conf_dir: String,

    /// Records buffered per partition before a file is committed
    #[serde(default = "default_flush_size")]
    pub flush_size: u64,

    /// File rotation interval in milliseconds
    #[serde(default = "default_rotate_interval_ms")]
    pub rotate_interval_ms: u64,

    /// Time-bucket length for the time-based partitioner, in milliseconds
    #[serde(default = "default_partition_duration_ms")]
    pub partition_duration_ms: u64,

    /// Directory layout template for time-bucketed paths
    #[serde(default = "default_path_format")]
    pub path_format: String,

    /// Locale used by the partitioner when formatting paths
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Timezone used by the partitioner when bucketing records
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Schema registry URL, used by the Avro format variant
    #[serde(default = "default_schema_registry_url")]
    pub schema_registry_url: String,
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            name: default_connector_name(),
            topics: default_topics(),
            hdfs_url: default_hdfs_url(),
            topics_dir: default_topics_dir(),
            hadoop_conf_dir: default_hadoop_conf_dir(),
            flush_size: default_flush_size(),
            rotate_interval_ms: default_rotate_interval_ms(),
            partition_duration_ms: default_partition_duration_ms(),
            path_format: default_path_format(),
            locale: default_locale(),
            timezone: default_timezone(),
            schema_registry_url: default_schema_registry_url(),
        }
    }
}

fn default_connector_name() -> String {
    "hdfs-sink-connector".to_string()
}

fn default_topics() -> String {
    "events".to_string()
}

fn default_hdfs_url() -> String {
    "hdfs://localhost:9000".to_string()
}

fn default_topics_dir() -> String {
    "/data/topics".to_string()
}

fn default_hadoop_conf_dir() -> String {
    "/etc/hadoop/conf".to_string()
}

fn default_flush_size() -> u64 {
    100
}

fn default_rotate_interval_ms() -> u64 {
    60_000
}

fn default_partition_duration_ms() -> u64 {
    3_600_000 // hourly buckets
}

fn default_path_format() -> String {
    "'year'=YYYY/'month'=MM/'day'=dd/'hour'=HH".to_string()
}

fn default_locale() -> String {
    "US".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_schema_registry_url() -> String {
    "http://localhost:8081".to_string()
}

/// Health monitoring configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorSettings {
    /// Health check period in seconds
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

fn default_check_interval_secs() -> u64 {
    300 // 5 minutes
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    /// Bind address
    #[serde(default = "default_api_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

impl WardenConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        // Expand environment variables
        let expanded = Self::expand_env_vars(&content);

        let config: Self = serde_yaml::from_str(&expanded)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Expand environment variables in the format ${VAR} or ${VAR:-default}
    fn expand_env_vars(content: &str) -> String {
        ENV_VAR_REGEX
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                let default = caps.get(2).map(|m| m.as_str());

                std::env::var(var_name).unwrap_or_else(|_| default.unwrap_or("").to_string())
            })
            .to_string()
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.connect.url.is_empty() {
            anyhow::bail!("'connect.url' must not be empty");
        }
        if self.connector.name.is_empty() {
            anyhow::bail!("'connector.name' must not be empty");
        }
        if self.connector.topics.is_empty() {
            anyhow::bail!("'connector.topics' must have at least one topic");
        }
        if self.monitor.check_interval_secs == 0 {
            anyhow::bail!("'monitor.check_interval_secs' must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: WardenConfig = serde_yaml::from_str(
            r#"
connect:
  url: http://connect:8083
"#,
        )
        .unwrap();

        assert_eq!(config.connect.url, "http://connect:8083");
        assert_eq!(config.connect.request_timeout_ms, 30_000);
        assert_eq!(config.connector.name, "hdfs-sink-connector");
        assert_eq!(config.connector.flush_size, 100);
        assert_eq!(config.monitor.check_interval_secs, 300);
        assert_eq!(config.api.port, 8080);
    }

    #[test]
    fn test_env_var_expansion() {
        std::env::set_var("WARDEN_TEST_CONNECT_URL", "http://expanded:8083");
        let content = r#"
connect:
  url: ${WARDEN_TEST_CONNECT_URL}
connector:
  name: ${WARDEN_TEST_MISSING:-fallback-name}
"#;
        let expanded = WardenConfig::expand_env_vars(content);
        let config: WardenConfig = serde_yaml::from_str(&expanded).unwrap();

        assert_eq!(config.connect.url, "http://expanded:8083");
        assert_eq!(config.connector.name, "fallback-name");
    }

    #[test]
    fn test_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.yaml");
        std::fs::write(
            &path,
            r#"
connect:
  url: http://connect:8083
connector:
  name: audit-sink
  flush_size: 500
monitor:
  check_interval_secs: 60
"#,
        )
        .unwrap();

        let config = WardenConfig::from_file(&path).unwrap();
        assert_eq!(config.connector.name, "audit-sink");
        assert_eq!(config.connector.flush_size, 500);
        assert_eq!(config.monitor.check_interval_secs, 60);
    }

    #[test]
    fn test_validate_rejects_empty_topics() {
        let config = WardenConfig {
            connector: ConnectorSettings {
                topics: String::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = WardenConfig {
            monitor: MonitorSettings {
                check_interval_secs: 0,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
