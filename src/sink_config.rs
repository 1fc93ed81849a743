//! Desired-configuration synthesis for the managed HDFS sink connector
//!
//! Builds the setting map the management API stores for the connector.
//! The Avro variant is expressed as a patch over the JSON base: the two
//! formats share partitioning, rotation and flush settings and differ only
//! in the four codec keys, so patching keeps them from drifting apart.

use crate::config::ConnectorSettings;
use serde_json::{json, Map, Value};

const CONNECTOR_CLASS: &str = "io.confluent.connect.hdfs3.Hdfs3SinkConnector";
const PARTITIONER_CLASS: &str = "io.confluent.connect.hdfs3.partitioner.TimeBasedPartitioner";

const JSON_FORMAT_CLASS: &str = "io.confluent.connect.hdfs3.json.JsonFormat";
const JSON_VALUE_CONVERTER: &str = "org.apache.kafka.connect.json.JsonConverter";
const STRING_KEY_CONVERTER: &str = "org.apache.kafka.connect.storage.StringConverter";

const AVRO_FORMAT_CLASS: &str = "io.confluent.connect.hdfs3.avro.AvroFormat";
const AVRO_CONVERTER: &str = "io.confluent.connect.avro.AvroConverter";

/// Serialization variant for the sink connector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkFormat {
    /// Plain JSON records, schemaless
    Json,
    /// Avro records backed by a schema registry
    Avro,
}

impl SinkFormat {
    /// Select a format from the external `use_avro` flag
    pub fn from_use_avro(use_avro: bool) -> Self {
        if use_avro {
            SinkFormat::Avro
        } else {
            SinkFormat::Json
        }
    }
}

/// Desired configuration of the sink connector, as sent to the management API
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConnectorConfig(Map<String, Value>);

impl SinkConnectorConfig {
    /// Synthesize the connector configuration for the given format.
    ///
    /// Pure and infallible: every call builds a fresh map from the settings.
    pub fn build(settings: &ConnectorSettings, format: SinkFormat) -> Self {
        let mut config = Map::new();

        // Connector identity
        config.insert("name".into(), json!(settings.name));
        config.insert("connector.class".into(), json!(CONNECTOR_CLASS));
        config.insert("tasks.max".into(), json!("1"));

        // Topics
        config.insert("topics".into(), json!(settings.topics));
        config.insert("topics.dir".into(), json!(settings.topics_dir));

        // HDFS target
        config.insert("hdfs.url".into(), json!(settings.hdfs_url));
        config.insert("hadoop.conf.dir".into(), json!(settings.hadoop_conf_dir));

        // Data format (JSON base)
        config.insert("format.class".into(), json!(JSON_FORMAT_CLASS));
        config.insert("value.converter".into(), json!(JSON_VALUE_CONVERTER));
        config.insert("value.converter.schemas.enable".into(), json!("false"));
        config.insert("key.converter".into(), json!(STRING_KEY_CONVERTER));

        // Time-based partitioning
        config.insert("partitioner.class".into(), json!(PARTITIONER_CLASS));
        config.insert(
            "partition.duration.ms".into(),
            json!(settings.partition_duration_ms),
        );
        config.insert("path.format".into(), json!(settings.path_format));
        config.insert("locale".into(), json!(settings.locale));
        config.insert("timezone".into(), json!(settings.timezone));

        // File rotation
        config.insert("flush.size".into(), json!(settings.flush_size));
        config.insert(
            "rotate.interval.ms".into(),
            json!(settings.rotate_interval_ms),
        );

        // Schema handling
        config.insert("schema.compatibility".into(), json!("NONE"));

        let mut built = Self(config);
        if format == SinkFormat::Avro {
            built.apply_avro_overrides(settings);
        }
        built
    }

    /// Patch the four codec keys that select the Avro / schema-registry path
    fn apply_avro_overrides(&mut self, settings: &ConnectorSettings) {
        self.0
            .insert("format.class".into(), json!(AVRO_FORMAT_CLASS));
        self.0
            .insert("value.converter".into(), json!(AVRO_CONVERTER));
        self.0.insert(
            "value.converter.schema.registry.url".into(),
            json!(settings.schema_registry_url),
        );
        self.0
            .insert("key.converter".into(), json!(AVRO_CONVERTER));
    }

    /// Value of a setting, if present
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Borrow the underlying setting map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying setting map
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}
