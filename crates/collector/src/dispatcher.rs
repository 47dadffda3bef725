//! Dispatcher - single consumer of the record buffer, fans out to every sink

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{BufferReceiver, CancellationToken, Record};

use crate::handle::{Delivery, SinkSender};

/// Pops records from the shared buffer and offers each one to every sink
pub struct Dispatcher {
    buffer: BufferReceiver,
    sinks: Vec<SinkSender>,
}

impl Dispatcher {
    pub fn new(buffer: BufferReceiver, sinks: Vec<SinkSender>) -> Self {
        Self { buffer, sinks }
    }

    /// Run the dispatcher main loop
    ///
    /// Returns the number of records offered to the sinks, once the buffer is
    /// closed and drained or the token is cancelled. Only the wait for the
    /// next record observes the token: a popped record always reaches every
    /// sink queue before the loop checks it again.
    #[instrument(name = "dispatcher_run", skip_all, fields(sinks = self.sinks.len()))]
    pub async fn run(self, cancel: CancellationToken) -> u64 {
        info!("Dispatcher started");

        let mut record_count: u64 = 0;

        while let Some(record) = self.buffer.pop(&cancel).await {
            observability::record_buffer_depth(self.buffer.len());

            self.dispatch_record(record).await;
            record_count += 1;

            if record_count.is_multiple_of(1000) {
                debug!(records = record_count, "Dispatcher progress");
            }
        }

        info!(records = record_count, "Dispatcher stopped");
        record_count
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<u64> {
        tokio::spawn(self.run(cancel))
    }

    /// Offer one record to every sink in order
    ///
    /// Each sink gets its own clone of the record handle; the payload bytes are
    /// shared. A sink whose worker is gone is skipped.
    async fn dispatch_record(&self, record: Record) {
        for sink in &self.sinks {
            if sink.deliver(record.clone()).await == Delivery::WorkerGone {
                debug!(sink = %sink.name(), "Record not delivered");
            }
        }
        observability::record_record_dispatched();
    }
}
