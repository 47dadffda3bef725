//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the log shipper.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Data Model
//! - `Record` is an opaque byte payload, shared (not copied) between sinks
//! - `RecordBuffer` is the fixed-capacity FIFO between sources and the dispatcher
//! - `LogSource` / `LogSink` are the backend contracts

mod buffer;
mod config;
mod error;
mod record;
mod sink;
mod source;

pub use buffer::{BufferReceiver, BufferSender, RecordBuffer};
pub use config::*;
pub use error::*;
pub use record::Record;
pub use sink::*;
pub use source::*;

pub use tokio_util::sync::CancellationToken;
