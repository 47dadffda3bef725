//! SinkHandle - owns a sink behind its own delivery queue and worker task
//!
//! The worker is the only code that touches the sink, so writes to one sink
//! never overlap and arrive in the order they were queued. A slow or failing
//! sink only stalls its own queue.

use std::sync::Arc;
use tokio::sync::mpsc::{self, error::SendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use contracts::{CancellationToken, ContractError, LogSink, Record};

use crate::metrics::SinkMetrics;

/// Outcome of queueing a record for one sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Record is in the sink's queue
    Queued,
    /// Pipeline is shutting down; the record was not queued
    Cancelled,
    /// The sink worker is gone; the record was not queued
    WorkerGone,
}

/// Handle to a running sink worker
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Channel to send records to worker
    tx: mpsc::Sender<Record>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Worker task handle, yields the result of closing the sink
    worker_handle: JoinHandle<Result<(), ContractError>>,
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    pub fn spawn<S: LogSink + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(sink_worker(sink, rx, worker_metrics, worker_name));

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Get a sender feeding this sink's queue
    pub fn sender(&self) -> SinkSender {
        SinkSender {
            name: self.name.clone(),
            tx: self.tx.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }

    /// Queue a record, waiting while the sink's queue is full
    pub async fn send(&self, record: Record, cancel: &CancellationToken) -> Delivery {
        send_to(&self.name, &self.tx, &self.metrics, record, cancel).await
    }

    /// Shut the sink down
    ///
    /// The worker drains whatever is still queued once every sender is gone,
    /// then flushes and closes the sink exactly once. Returns the close result.
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) -> Result<(), ContractError> {
        // Drop sender to signal worker to stop
        drop(self.tx);
        let result = match self.worker_handle.await {
            Ok(closed) => closed,
            Err(e) => Err(ContractError::sink_close(
                &self.name,
                format!("worker task panicked: {e}"),
            )),
        };
        debug!(sink = %self.name, "SinkHandle shutdown complete");
        result
    }
}

/// Cloneable producer side of a sink's queue
#[derive(Clone)]
pub struct SinkSender {
    name: String,
    tx: mpsc::Sender<Record>,
    metrics: Arc<SinkMetrics>,
}

impl SinkSender {
    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue a record, waiting while the sink's queue is full
    pub async fn send(&self, record: Record, cancel: &CancellationToken) -> Delivery {
        send_to(&self.name, &self.tx, &self.metrics, record, cancel).await
    }

    /// Queue a record, waiting for room however long it takes
    ///
    /// Ignores cancellation. The worker keeps draining while any sender is
    /// alive, so this returns once the sink has taken one more record.
    pub async fn deliver(&self, record: Record) -> Delivery {
        let sent = self.tx.send(record).await;
        settle(&self.name, &self.tx, &self.metrics, sent)
    }
}

async fn send_to(
    name: &str,
    tx: &mpsc::Sender<Record>,
    metrics: &SinkMetrics,
    record: Record,
    cancel: &CancellationToken,
) -> Delivery {
    match cancel.run_until_cancelled(tx.send(record)).await {
        Some(sent) => settle(name, tx, metrics, sent),
        None => Delivery::Cancelled,
    }
}

fn settle(
    name: &str,
    tx: &mpsc::Sender<Record>,
    metrics: &SinkMetrics,
    sent: Result<(), SendError<Record>>,
) -> Delivery {
    match sent {
        Ok(()) => {
            metrics.set_queue_len(tx.max_capacity() - tx.capacity());
            Delivery::Queued
        }
        Err(_) => {
            // Only report the first loss; every later record would repeat it
            if metrics.inc_undelivered_count() == 0 {
                error!(sink = %name, "Sink worker closed unexpectedly");
            }
            Delivery::WorkerGone
        }
    }
}

/// Worker task that consumes records and writes to sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: LogSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<Record>,
    metrics: Arc<SinkMetrics>,
    name: String,
) -> Result<(), ContractError> {
    debug!(sink = %name, "Sink worker started");

    while let Some(record) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match sink.write(&record).await {
            Ok(()) => {
                metrics.inc_write_count();
                observability::record_sink_write(&name);
            }
            Err(e) => {
                metrics.inc_failure_count();
                observability::record_sink_failure(&name);
                error!(
                    sink = %name,
                    bytes = record.len(),
                    error = %e,
                    "Write failed"
                );
                // A failed write never stops delivery of later records
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    let closed = sink.close().await;

    debug!(sink = %name, "Sink worker stopped");
    closed
}
