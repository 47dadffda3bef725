//! Source factory
//!
//! Turns the `[source]` configuration section into a concrete backend.

use contracts::{
    BufferSender, CancellationToken, ContractError, LogSource, SourceConfig, SourceKind,
};
use tracing::instrument;

use crate::error::Result;
#[cfg(not(feature = "kafka"))]
use crate::error::IngestionError;
use crate::mock::{MockSource, MockSourceConfig};
#[cfg(feature = "kafka")]
use crate::queue::{QueueSource, QueueSourceConfig};

/// Any source backend that can be selected from configuration
pub enum ConfiguredSource {
    Mock(MockSource),
    #[cfg(feature = "kafka")]
    Queue(QueueSource),
}

/// Build the source described by `config`
///
/// # Errors
/// - The queue backend was not compiled in
/// - The upstream client could not be created
#[instrument(name = "ingestion_build_source", skip(config), fields(kind = ?config.kind))]
pub fn build_source(config: &SourceConfig) -> Result<ConfiguredSource> {
    match config.kind {
        SourceKind::Mock => Ok(ConfiguredSource::Mock(MockSource::new(
            MockSourceConfig::from_config(config),
        ))),
        #[cfg(feature = "kafka")]
        SourceKind::Queue => Ok(ConfiguredSource::Queue(QueueSource::new(
            QueueSourceConfig::from_config(config),
        )?)),
        #[cfg(not(feature = "kafka"))]
        SourceKind::Queue => Err(IngestionError::backend_disabled("queue", "kafka")),
    }
}

impl LogSource for ConfiguredSource {
    fn name(&self) -> &str {
        match self {
            Self::Mock(source) => source.name(),
            #[cfg(feature = "kafka")]
            Self::Queue(source) => source.name(),
        }
    }

    async fn read(
        &mut self,
        cancel: CancellationToken,
        buffer: BufferSender,
    ) -> std::result::Result<(), ContractError> {
        match self {
            Self::Mock(source) => source.read(cancel, buffer).await,
            #[cfg(feature = "kafka")]
            Self::Queue(source) => source.read(cancel, buffer).await,
        }
    }
}
