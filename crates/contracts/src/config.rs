//! ShipperConfig - Config Loader output
//!
//! Describes one shipper deployment: buffer sizing, the upstream source and
//! the enabled sinks.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Consumer group used when none is configured
pub const DEFAULT_GROUP_ID: &str = "appLog";

/// Complete shipper configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShipperConfig {
    /// Capacity of the shared record buffer
    #[serde(default = "default_buffer_size")]
    #[validate(range(min = 1, message = "buffer_size must be >= 1"))]
    pub buffer_size: usize,

    /// Upstream source
    pub source: SourceConfig,

    /// Output sinks
    #[serde(default)]
    #[validate(nested)]
    pub sinks: SinksConfig,
}

fn default_buffer_size() -> usize {
    1024
}

impl ShipperConfig {
    /// Number of sinks that will be constructed
    pub fn enabled_sink_count(&self) -> usize {
        self.sinks.enabled_count()
    }
}

/// Source backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Message-queue consumer group
    Queue,
    /// Synthetic records, no upstream required
    Mock,
}

/// Source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Backend kind
    pub kind: SourceKind,

    /// Optional display name (defaults to the kind)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    // ----- queue -----
    /// Broker addresses (`host:port`)
    #[serde(default)]
    pub brokers: Vec<String>,

    /// Topic to consume
    #[serde(default)]
    pub topic: String,

    /// Consumer group id
    #[serde(default = "default_group_id")]
    pub group_id: String,

    // ----- mock -----
    /// Delay between synthetic records in milliseconds (0 = none)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Number of records to emit before finishing (0 = unbounded)
    #[serde(default)]
    pub count: u64,

    /// Synthetic record text
    #[serde(default = "default_message")]
    pub message: String,

    /// Fail fatally after this many records (0 = never)
    #[serde(default)]
    pub fail_after: u64,
}

fn default_group_id() -> String {
    DEFAULT_GROUP_ID.to_string()
}

fn default_interval_ms() -> u64 {
    100
}

fn default_message() -> String {
    "mock log record".to_string()
}

impl SourceConfig {
    /// Name used in logs and metrics
    pub fn display_name(&self) -> String {
        match (&self.name, self.kind) {
            (Some(name), _) => name.clone(),
            (None, SourceKind::Queue) => format!("queue:{}", self.topic),
            (None, SourceKind::Mock) => "mock".to_string(),
        }
    }
}

/// Sink section
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinksConfig {
    /// Write records to stdout
    #[serde(default)]
    pub console: bool,

    /// Per-sink delivery queue capacity
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1, message = "queue_capacity must be >= 1"))]
    pub queue_capacity: usize,

    /// Rotating file output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub file: Option<FileSinkConfig>,
}

fn default_queue_capacity() -> usize {
    64
}

impl SinksConfig {
    /// Number of sinks switched on in this section
    pub fn enabled_count(&self) -> usize {
        usize::from(self.console) + usize::from(self.file.is_some())
    }
}

impl Default for SinksConfig {
    fn default() -> Self {
        Self {
            console: false,
            queue_capacity: default_queue_capacity(),
            file: None,
        }
    }
}

/// Rotating file sink configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FileSinkConfig {
    /// Output directory (created if absent)
    pub path: String,

    /// File name prefix; files are `<prefix>[-<date>][-(<n>)].log`
    #[validate(length(min = 1, message = "filename_prefix cannot be empty"))]
    pub filename_prefix: String,

    /// Size threshold in bytes (<= 0 disables size rotation)
    #[serde(default)]
    pub max_size_bytes: i64,

    /// Start a new file every calendar day
    #[serde(default)]
    pub rotate_daily: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config: ShipperConfig =
            serde_json::from_str(r#"{ "source": { "kind": "mock" } }"#).unwrap();
        assert_eq!(config.buffer_size, 1024);
        assert_eq!(config.source.group_id, DEFAULT_GROUP_ID);
        assert_eq!(config.sinks.queue_capacity, 64);
        assert_eq!(config.enabled_sink_count(), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_field_rules() {
        let config: ShipperConfig = serde_json::from_str(
            r#"{
                "buffer_size": 0,
                "source": { "kind": "mock" },
                "sinks": { "file": { "path": "logs", "filename_prefix": "" } }
            }"#,
        )
        .unwrap();
        let errors = config.validate().unwrap_err().to_string();
        assert!(errors.contains("buffer_size"));
        assert!(errors.contains("filename_prefix"));
    }

    #[test]
    fn test_display_name() {
        let mut source: SourceConfig =
            serde_json::from_str(r#"{ "kind": "queue", "topic": "app-log" }"#).unwrap();
        assert_eq!(source.display_name(), "queue:app-log");
        source.name = Some("edge".to_string());
        assert_eq!(source.display_name(), "edge");
    }
}
