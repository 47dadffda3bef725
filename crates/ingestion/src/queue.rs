//! QueueSource - message-queue consumer group source (Kafka)
//!
//! Consumes one topic as a member of a consumer group. Offsets start from the
//! oldest retained message for a new group and are auto-committed, but an
//! offset is only stored for commit after its record entered the buffer.

use bytes::Bytes;
use contracts::{
    BufferSender, CancellationToken, ContractError, LogSource, Record, SourceConfig,
};
use observability::record_record_ingested;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::message::{BorrowedMessage, Message};
use tracing::{debug, info, instrument, warn};

use crate::error::{IngestionError, Result};

/// Queue source configuration
#[derive(Debug, Clone)]
pub struct QueueSourceConfig {
    /// Source name
    pub name: String,
    /// Bootstrap brokers (`host:port`)
    pub brokers: Vec<String>,
    /// Topic to consume
    pub topic: String,
    /// Consumer group id
    pub group_id: String,
}

impl QueueSourceConfig {
    /// Build from the `[source]` section (kind = "queue")
    pub fn from_config(config: &SourceConfig) -> Self {
        Self {
            name: config.display_name(),
            brokers: config.brokers.clone(),
            topic: config.topic.clone(),
            group_id: config.group_id.clone(),
        }
    }
}

/// Where a consumed record came from
struct Position {
    partition: i32,
    offset: i64,
}

/// Kafka consumer group source
pub struct QueueSource {
    config: QueueSourceConfig,
    consumer: StreamConsumer,
}

impl QueueSource {
    /// Create the consumer and subscribe to the configured topic
    ///
    /// # Errors
    /// Returns `IngestionError::Connection` when the client cannot be created
    /// or the subscription is rejected.
    pub fn new(config: QueueSourceConfig) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "true")
            .set("enable.auto.offset.store", "false")
            .create()
            .map_err(|e| IngestionError::connection(&config.name, e.to_string()))?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(|e| IngestionError::connection(&config.name, e.to_string()))?;

        debug!(
            source = %config.name,
            topic = %config.topic,
            group_id = %config.group_id,
            "queue consumer subscribed"
        );

        Ok(Self { config, consumer })
    }

    /// Wait for the next message; None once cancelled
    async fn next_message(
        &self,
        cancel: &CancellationToken,
    ) -> Option<std::result::Result<(Record, Position), KafkaError>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            received = self.consumer.recv() => Some(received.map(|message| decode(&message))),
        }
    }

    /// Mark a buffered record as consumed
    fn acknowledge(&self, position: &Position) {
        if let Err(e) =
            self.consumer
                .store_offset(&self.config.topic, position.partition, position.offset + 1)
        {
            warn!(
                source = %self.config.name,
                partition = position.partition,
                offset = position.offset,
                error = %e,
                "Failed to store offset"
            );
        }
    }
}

fn decode(message: &BorrowedMessage<'_>) -> (Record, Position) {
    let payload = message
        .payload()
        .map(Bytes::copy_from_slice)
        .unwrap_or_default();
    let position = Position {
        partition: message.partition(),
        offset: message.offset(),
    };
    (Record::new(payload), position)
}

/// Map errors after which the consumer cannot make progress; `None` means retry
fn classify(source_name: &str, error: &KafkaError) -> Option<ContractError> {
    match error.rdkafka_error_code()? {
        RDKafkaErrorCode::Authentication | RDKafkaErrorCode::SaslAuthenticationFailed => {
            Some(ContractError::source_connection(source_name, error.to_string()))
        }
        RDKafkaErrorCode::Fatal
        | RDKafkaErrorCode::TopicAuthorizationFailed
        | RDKafkaErrorCode::GroupAuthorizationFailed => {
            Some(ContractError::source_fatal(source_name, error.to_string()))
        }
        _ => None,
    }
}

impl LogSource for QueueSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    #[instrument(
        name = "queue_source_read",
        skip(self, cancel, buffer),
        fields(source = %self.config.name, topic = %self.config.topic)
    )]
    async fn read(
        &mut self,
        cancel: CancellationToken,
        buffer: BufferSender,
    ) -> std::result::Result<(), ContractError> {
        info!(
            brokers = ?self.config.brokers,
            group_id = %self.config.group_id,
            "Queue source consuming"
        );

        while let Some(next) = self.next_message(&cancel).await {
            match next {
                Ok((record, position)) => {
                    if !buffer.push(record, &cancel).await {
                        break;
                    }
                    record_record_ingested(&self.config.name);
                    self.acknowledge(&position);
                }
                Err(e) => match classify(&self.config.name, &e) {
                    Some(fatal) => return Err(fatal),
                    None => warn!(error = %e, "Error consuming messages, retrying"),
                },
            }
        }

        info!("Queue source stopped");
        Ok(())
    }
}
