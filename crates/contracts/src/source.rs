//! LogSource trait - upstream record producer abstraction
//!
//! A source pulls records from one upstream (message queue, generator, ...)
//! and pushes them into the shared buffer until cancelled or fatally failed.

use tokio_util::sync::CancellationToken;

use crate::{BufferSender, ContractError};

/// Record producer trait
///
/// # Contract
///
/// 1. `read` is invoked exactly once per pipeline run
/// 2. Every consumed record is pushed into `buffer` before it is acknowledged upstream
/// 3. `cancel` is observed at every blocking step; once it fires, `read` returns `Ok(())` promptly
/// 4. An `Err` is returned only for conditions that must abort the whole pipeline
///
/// Returning `Ok(())` without cancellation marks a finite source as exhausted.
#[trait_variant::make(LogSource: Send)]
pub trait LocalLogSource {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Pump records into `buffer` until exhausted, cancelled or fatally failed
    async fn read(
        &mut self,
        cancel: CancellationToken,
        buffer: BufferSender,
    ) -> Result<(), ContractError>;
}
