//! ConsoleSink - writes raw record payloads to stdout

use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use contracts::{ContractError, LogSink, Record};
use tracing::{info, instrument};

/// A console shared by every ConsoleSink writing to it
pub type SharedConsole = Arc<Mutex<dyn Write + Send>>;

/// Process-wide stdout, so two console sinks never interleave inside a record
pub fn stdout_console() -> SharedConsole {
    static STDOUT: OnceLock<SharedConsole> = OnceLock::new();
    STDOUT
        .get_or_init(|| {
            let console: SharedConsole = Arc::new(Mutex::new(io::stdout()));
            console
        })
        .clone()
}

/// Sink that copies every payload byte-for-byte to the console
pub struct ConsoleSink {
    name: String,
    console: SharedConsole,
}

impl ConsoleSink {
    /// Create a ConsoleSink writing to stdout
    pub fn stdout(name: impl Into<String>) -> Self {
        Self::with_console(name, stdout_console())
    }

    /// Create a ConsoleSink writing to the given console
    pub fn with_console(name: impl Into<String>, console: SharedConsole) -> Self {
        Self {
            name: name.into(),
            console,
        }
    }

    fn emit(&self, payload: &[u8]) -> io::Result<()> {
        let mut out = self
            .console
            .lock()
            .map_err(|_| io::Error::other("console lock poisoned"))?;
        out.write_all(payload)?;
        out.flush()
    }
}

impl LogSink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "console_sink_write",
        skip(self, record),
        fields(sink = %self.name, bytes = record.len())
    )]
    async fn write(&mut self, record: &Record) -> Result<(), ContractError> {
        self.emit(record.payload())
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "console_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.emit(&[])
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "console_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "ConsoleSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_console() -> (Arc<Mutex<Vec<u8>>>, SharedConsole) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let console: SharedConsole = buffer.clone();
        (buffer, console)
    }

    #[tokio::test]
    async fn test_console_sink_write_is_verbatim() {
        let (buffer, console) = memory_console();
        let mut sink = ConsoleSink::with_console("console", console);

        sink.write(&Record::from("no trailing newline")).await.unwrap();
        sink.write(&Record::from(vec![0xff, b'\n'])).await.unwrap();
        sink.close().await.unwrap();

        let mut expected = b"no trailing newline".to_vec();
        expected.extend_from_slice(&[0xff, b'\n']);
        assert_eq!(*buffer.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_console_sinks_share_console() {
        let (buffer, console) = memory_console();
        let mut first = ConsoleSink::with_console("first", Arc::clone(&console));
        let mut second = ConsoleSink::with_console("second", console);

        first.write(&Record::from("a\n")).await.unwrap();
        second.write(&Record::from("b\n")).await.unwrap();

        assert_eq!(*buffer.lock().unwrap(), b"a\nb\n".to_vec());
    }

    #[tokio::test]
    async fn test_console_sink_name() {
        let sink = ConsoleSink::stdout("my_console");
        assert_eq!(sink.name(), "my_console");
    }
}
