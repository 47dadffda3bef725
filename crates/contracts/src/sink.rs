//! LogSink trait - Collector output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{ContractError, Record};

/// Record output trait
///
/// All sink implementations must implement this trait. A sink is owned by a
/// single delivery worker, so calls never overlap. `close` is invoked exactly
/// once and nothing is called afterwards.
#[trait_variant::make(LogSink: Send)]
pub trait LocalLogSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one record
    ///
    /// # Errors
    /// Returns write error (should include context). Write errors are never
    /// fatal to the pipeline.
    async fn write(&mut self, record: &Record) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Release every held resource
    ///
    /// Must succeed when no resource was ever acquired.
    async fn close(&mut self) -> Result<(), ContractError>;
}
