//! Collector - wires N sources through the record buffer to M sinks

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, instrument, warn};

use contracts::{
    CancellationToken, ContractError, LogSink, LogSource, RecordBuffer, SinksConfig,
};

use crate::dispatcher::Dispatcher;
use crate::error::CollectorError;
use crate::handle::SinkHandle;
use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::sinks::{ConsoleSink, FileSink};
use crate::worker::{SourceResult, SourceWorker};

/// Default buffer capacity when none is configured
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Why a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cancellation token fired
    Cancelled,
    /// Every source finished and the buffer was drained
    Exhausted,
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stop_reason: StopReason,
    /// Records the dispatcher offered to the sinks
    pub records_dispatched: u64,
    /// Final per-sink metrics, in sink order
    pub sinks: Vec<(String, MetricsSnapshot)>,
    pub duration: Duration,
}

/// Builder for creating a Collector
pub struct CollectorBuilder {
    buffer_size: usize,
    sources: Vec<SourceWorker>,
    sinks: Vec<SinkHandle>,
}

impl CollectorBuilder {
    /// Create a new builder; a zero buffer size is raised to one
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
            sources: Vec::new(),
            sinks: Vec::new(),
        }
    }

    /// Add a source
    pub fn source<S: LogSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(SourceWorker::new(source));
        self
    }

    /// Add a sink with its own delivery queue
    ///
    /// Spawns the sink worker, so this needs a running Tokio runtime.
    pub fn sink<S: LogSink + 'static>(mut self, sink: S, queue_capacity: usize) -> Self {
        self.sinks.push(SinkHandle::spawn(sink, queue_capacity));
        self
    }

    /// Add an already running sink
    pub fn sink_handle(mut self, handle: SinkHandle) -> Self {
        self.sinks.push(handle);
        self
    }

    /// Add several running sinks
    pub fn sink_handles(mut self, handles: impl IntoIterator<Item = SinkHandle>) -> Self {
        self.sinks.extend(handles);
        self
    }

    pub fn build(self) -> Collector {
        Collector {
            buffer_size: self.buffer_size,
            sources: self.sources,
            sinks: self.sinks,
        }
    }
}

/// Create sink handles for every sink enabled in the configuration
#[instrument(name = "collector_create_sink_handles", skip(config))]
pub fn create_sink_handles(config: &SinksConfig) -> Result<Vec<SinkHandle>, CollectorError> {
    let mut handles = Vec::with_capacity(config.enabled_count());

    if config.console {
        handles.push(SinkHandle::spawn(
            ConsoleSink::stdout("console"),
            config.queue_capacity,
        ));
    }

    if let Some(file) = &config.file {
        let sink = FileSink::new("file", file)
            .map_err(|e| CollectorError::sink_creation("file", e.to_string()))?;
        handles.push(SinkHandle::spawn(sink, config.queue_capacity));
    }

    Ok(handles)
}

/// The log shipping pipeline
pub struct Collector {
    buffer_size: usize,
    sources: Vec<SourceWorker>,
    sinks: Vec<SinkHandle>,
}

impl Collector {
    pub fn builder(buffer_size: usize) -> CollectorBuilder {
        CollectorBuilder::new(buffer_size)
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(SourceWorker::name).collect()
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(SinkHandle::name).collect()
    }

    /// Run until cancelled, until a source fails, or until every source is exhausted
    ///
    /// However the run ends, sources are stopped first, then the dispatcher,
    /// then each sink drains its queue and is closed exactly once. Sink close
    /// errors are logged, not returned. A source failure is returned as-is.
    #[instrument(
        name = "collector_run",
        skip_all,
        fields(sources = self.sources.len(), sinks = self.sinks.len(), buffer = self.buffer_size)
    )]
    pub async fn run(self, cancel: CancellationToken) -> Result<RunReport, ContractError> {
        let started = Instant::now();
        let Collector {
            buffer_size,
            sources,
            sinks,
        } = self;

        info!("Collector started");

        let pipeline = cancel.child_token();
        let (buffer_tx, buffer_rx) = RecordBuffer::bounded(buffer_size);

        let mut workers = JoinSet::new();
        for source in sources {
            source.spawn_on(&mut workers, pipeline.clone(), buffer_tx.clone());
        }
        // Only workers hold senders now, so the buffer closes when they finish
        drop(buffer_tx);

        let sink_metrics: Vec<(String, Arc<SinkMetrics>)> = sinks
            .iter()
            .map(|h| (h.name().to_string(), Arc::clone(h.metrics())))
            .collect();
        let senders = sinks.iter().map(SinkHandle::sender).collect();
        let mut dispatcher = Dispatcher::new(buffer_rx.clone(), senders).spawn(pipeline.clone());

        let (stop, mut failure, dispatched) = loop {
            tokio::select! {
                _ = cancel.cancelled() => break (StopReason::Cancelled, None, None),
                joined = workers.join_next(), if !workers.is_empty() => {
                    if let Some(Err(e)) = joined.map(flatten_source_result) {
                        break (StopReason::Cancelled, Some(e), None);
                    }
                }
                finished = &mut dispatcher => break (StopReason::Exhausted, None, Some(finished)),
            }
        };

        debug!(?stop, failed = failure.is_some(), "Collector stopping");

        pipeline.cancel();
        buffer_rx.close();

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = flatten_source_result(joined) {
                if failure.is_none() {
                    failure = Some(e);
                } else {
                    debug!(error = %e, "Additional source failure during shutdown");
                }
            }
        }

        let dispatched = match dispatched {
            Some(finished) => finished,
            None => dispatcher.await,
        };
        let records_dispatched = dispatched.unwrap_or_else(|e| {
            error!(error = %e, "Dispatcher task panicked");
            0
        });

        for handle in sinks {
            let name = handle.name().to_string();
            if let Err(e) = handle.shutdown().await {
                observability::record_sink_close_failure(&name);
                error!(sink = %name, error = %e, "Sink close failed");
            }
        }

        let report = RunReport {
            stop_reason: stop,
            records_dispatched,
            sinks: sink_metrics
                .into_iter()
                .map(|(name, metrics)| (name, metrics.snapshot()))
                .collect(),
            duration: started.elapsed(),
        };

        match failure {
            Some(e) => {
                warn!(error = %e, records = report.records_dispatched, "Collector stopped on source failure");
                Err(e)
            }
            None => {
                info!(
                    reason = ?report.stop_reason,
                    records = report.records_dispatched,
                    "Collector stopped"
                );
                Ok(report)
            }
        }
    }
}

fn flatten_source_result(joined: Result<SourceResult, JoinError>) -> SourceResult {
    joined.unwrap_or_else(|e| {
        Err(ContractError::source_fatal(
            "source worker",
            format!("task panicked: {e}"),
        ))
    })
}
