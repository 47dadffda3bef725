//! Pipeline orchestrator - builds the collector from configuration and runs it.

use anyhow::{Context, Result};
use collector::{create_sink_handles, Collector};
use contracts::{CancellationToken, ShipperConfig};
use tracing::{info, instrument, warn};

use super::PipelineStats;
use crate::error::CliError;

/// Main pipeline orchestrator
pub struct Pipeline {
    config: ShipperConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: ShipperConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline until `cancel` fires or the source is exhausted
    ///
    /// A source failure is returned as an error once every sink is closed.
    #[instrument(name = "pipeline_run", skip_all, fields(source = %self.config.source.display_name()))]
    pub async fn run(self, cancel: CancellationToken) -> Result<PipelineStats> {
        let config = self.config;

        let source = ingestion::build_source(&config.source)
            .map_err(|e| CliError::pipeline_setup(e.to_string()))?;

        let sinks = create_sink_handles(&config.sinks)
            .map_err(|e| CliError::pipeline_setup(e.to_string()))?;
        if sinks.is_empty() {
            warn!("No sinks enabled - records will be read and discarded");
        }

        let collector = Collector::builder(config.buffer_size)
            .source(source)
            .sink_handles(sinks)
            .build();

        info!(
            sources = ?collector.source_names(),
            sinks = ?collector.sink_names(),
            buffer_size = collector.buffer_size(),
            "Collector assembled"
        );

        let report = collector
            .run(cancel)
            .await
            .context("Collector stopped on a source failure")?;

        Ok(PipelineStats::from(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(toml: &str) -> ShipperConfig {
        config_loader::ConfigLoader::load_from_str(toml, config_loader::ConfigFormat::Toml)
            .unwrap()
    }

    #[tokio::test]
    async fn test_mock_pipeline_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&format!(
            r#"
            buffer_size = 4

            [source]
            kind = "mock"
            name = "demo"
            count = 20
            interval_ms = 0
            message = "hello"

            [sinks.file]
            path = "{}"
            filename_prefix = "demo"
            "#,
            dir.path().display()
        ));

        let stats = Pipeline::new(config)
            .run(CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(stats.records_dispatched, 20);
        let content = std::fs::read_to_string(dir.path().join("demo.log")).unwrap();
        assert_eq!(content.lines().count(), 20);
        assert!(content.starts_with("demo hello #1\n"));
    }

    #[cfg(feature = "kafka")]
    #[tokio::test]
    async fn test_default_build_accepts_queue_source() {
        use contracts::LogSource;

        let config = config(
            r#"
            [source]
            kind = "queue"
            brokers = ["127.0.0.1:9092"]
            topic = "app-log"
            "#,
        );

        let source = ingestion::build_source(&config.source).unwrap();
        assert_eq!(source.name(), "queue:app-log");
    }

    #[tokio::test]
    async fn test_mock_failure_is_an_error() {
        let config = config(
            r#"
            [source]
            kind = "mock"
            interval_ms = 0
            fail_after = 3
            "#,
        );

        let err = Pipeline::new(config)
            .run(CancellationToken::new())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("mock"));
    }
}
