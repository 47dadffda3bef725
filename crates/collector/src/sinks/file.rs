//! FileSink - appends records to rotating log files

use std::fs;
use std::path::Path;

use contracts::{ContractError, FileSinkConfig, LogSink, Record};
use tracing::{debug, info, instrument};

use super::rotation::{FileSwitch, RotatingFile, RotationPolicy, SwitchReason};

/// Sink that appends raw payloads to `<dir>/<prefix>[-<date>][-(<n>)].log`
pub struct FileSink {
    name: String,
    file: RotatingFile,
}

impl FileSink {
    /// Create a new FileSink
    ///
    /// Creates the output directory if it does not exist yet. No file is
    /// opened until the first record arrives.
    pub fn new(name: impl Into<String>, config: &FileSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.path)?;

        let policy = RotationPolicy {
            max_size_bytes: config.max_size_bytes,
            rotate_daily: config.rotate_daily,
        };

        Ok(Self {
            name: name.into(),
            file: RotatingFile::new(&config.path, &config.filename_prefix, policy),
        })
    }

    /// Path of the file currently being appended to
    pub fn current_path(&self) -> Option<&Path> {
        self.file.current_path()
    }

    fn persist(&mut self, record: &Record) -> Result<(), ContractError> {
        let switch = self
            .file
            .write(record.payload())
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;

        if let FileSwitch::Opened { path, reason } = switch {
            if reason == SwitchReason::Initial {
                debug!(sink = %self.name, path = %path.display(), "Log file opened");
            } else {
                observability::record_file_rotation(&self.name);
                info!(sink = %self.name, path = %path.display(), ?reason, "Log file rotated");
            }
        }
        Ok(())
    }
}

impl LogSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, record),
        fields(sink = %self.name, bytes = record.len())
    )]
    async fn write(&mut self, record: &Record) -> Result<(), ContractError> {
        self.persist(record)
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.file
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.file
            .close()
            .map_err(|e| ContractError::sink_close(&self.name, e.to_string()))?;
        debug!(sink = %self.name, "FileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use tempfile::tempdir;

    fn config(path: &Path, max_size_bytes: i64, rotate_daily: bool) -> FileSinkConfig {
        FileSinkConfig {
            path: path.to_string_lossy().into_owned(),
            filename_prefix: "app".to_string(),
            max_size_bytes,
            rotate_daily,
        }
    }

    #[tokio::test]
    async fn test_file_sink_write() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::new("test_file", &config(dir.path(), 0, false)).unwrap();

        sink.write(&Record::from("first\n")).await.unwrap();
        sink.write(&Record::from("second\n")).await.unwrap();
        sink.flush().await.unwrap();
        sink.close().await.unwrap();

        let content = fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[tokio::test]
    async fn test_file_sink_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let sink = FileSink::new("nested", &config(&nested, 0, false)).unwrap();
        assert!(nested.is_dir());
        assert!(sink.current_path().is_none());
    }

    #[tokio::test]
    async fn test_file_sink_daily_name() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::new("daily", &config(dir.path(), 0, true)).unwrap();

        sink.write(&Record::from("x\n")).await.unwrap();
        sink.close().await.unwrap();

        let today = Local::now().date_naive().format("%Y_%m_%d").to_string();
        assert!(dir.path().join(format!("app-{today}.log")).exists());
    }

    #[tokio::test]
    async fn test_file_sink_size_rotation() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::new("sized", &config(dir.path(), 4, false)).unwrap();

        for line in ["aaaaa\n", "bbbbb\n", "ccccc\n"] {
            sink.write(&Record::from(line)).await.unwrap();
        }
        sink.close().await.unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("app.log")).unwrap(), "aaaaa\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("app-(1).log")).unwrap(),
            "bbbbb\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("app-(2).log")).unwrap(),
            "ccccc\n"
        );
    }

    #[tokio::test]
    async fn test_file_sink_close_without_write() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::new("idle", &config(dir.path(), 0, false)).unwrap();
        assert!(sink.close().await.is_ok());
    }
}
