//! SourceWorker - runs one source against the shared buffer

use tokio::task::JoinSet;
use tracing::{debug, error, instrument};

use contracts::{BufferSender, CancellationToken, ContractError, LogSource};

/// Result every source worker task resolves to
pub type SourceResult = Result<(), ContractError>;

type SpawnFn = Box<dyn FnOnce(&mut JoinSet<SourceResult>, CancellationToken, BufferSender) + Send>;

/// A source waiting to be started
///
/// Wraps any `LogSource` so one collector can run several source types side
/// by side.
pub struct SourceWorker {
    name: String,
    spawn: SpawnFn,
}

impl SourceWorker {
    pub fn new<S: LogSource + 'static>(source: S) -> Self {
        let name = source.name().to_string();
        let worker_name = name.clone();

        let spawn: SpawnFn = Box::new(
            move |set: &mut JoinSet<SourceResult>,
                  cancel: CancellationToken,
                  buffer: BufferSender| {
                set.spawn(source_worker(source, cancel, buffer, worker_name));
            },
        );

        Self { name, spawn }
    }

    /// Get source name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start the source on `set`
    pub(crate) fn spawn_on(
        self,
        set: &mut JoinSet<SourceResult>,
        cancel: CancellationToken,
        buffer: BufferSender,
    ) {
        (self.spawn)(set, cancel, buffer);
    }
}

impl std::fmt::Debug for SourceWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceWorker")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[instrument(name = "source_worker", skip(source, cancel, buffer), fields(source = %name))]
async fn source_worker<S: LogSource>(
    mut source: S,
    cancel: CancellationToken,
    buffer: BufferSender,
    name: String,
) -> SourceResult {
    debug!("Source worker started");

    let result = source.read(cancel, buffer).await;
    match &result {
        Ok(()) => debug!("Source worker stopped"),
        Err(e) => {
            observability::record_source_failure(&name);
            error!(error = %e, "Source failed");
        }
    }
    result
}
