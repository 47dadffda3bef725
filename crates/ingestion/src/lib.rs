//! # Ingestion
//!
//! Log record source backends.
//!
//! Responsibilities:
//! - Implement the `LogSource` contract for each upstream kind
//! - Build the configured source from `SourceConfig`
//! - Push every record into the shared buffer before acknowledging it upstream
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::build_source;
//!
//! let source = build_source(&config.source)?;
//! let collector = Collector::builder(config.buffer_size)
//!     .source(source)
//!     .build();
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingestion::MockSource;
//!
//! let source = MockSource::bounded("test", 100);
//! ```

mod error;
mod factory;
mod mock;
#[cfg(feature = "kafka")]
mod queue;

// Re-exports
pub use contracts::{LogSource, Record};
pub use error::{IngestionError, Result};
pub use factory::{build_source, ConfiguredSource};
pub use mock::{MockSource, MockSourceConfig};
#[cfg(feature = "kafka")]
pub use queue::{QueueSource, QueueSourceConfig};
