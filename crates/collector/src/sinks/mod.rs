//! Sink implementations
//!
//! Contains ConsoleSink and FileSink, plus the rotation engine FileSink uses.

mod console;
mod file;
pub mod rotation;

pub use self::console::{stdout_console, ConsoleSink, SharedConsole};
pub use self::file::FileSink;
pub use self::rotation::{FileSwitch, RotatingFile, RotationPolicy, SwitchReason};
