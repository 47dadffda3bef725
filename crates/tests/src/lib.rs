//! # Integration Tests
//!
//! 跨 crate 集成测试与端到端测试。
//!
//! 覆盖：
//! - 契约快照测试
//! - Mock 端到端测试 (无需消息队列)

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};

    #[test]
    fn test_contracts_compile() {
        assert_eq!(contracts::DEFAULT_GROUP_ID, "appLog");
        let record = contracts::Record::from("line\n");
        assert_eq!(record.len(), 5);
    }

    #[test]
    fn test_effective_config_reloads() {
        let config = ConfigLoader::load_from_str(
            r#"
            [source]
            kind = "queue"
            brokers = ["kafka-1:9092", "kafka-2:9092"]
            topic = "app-log"

            [sinks]
            console = true

            [sinks.file]
            path = "/var/log/logship"
            filename_prefix = "app"
            max_size_bytes = 1048576
            rotate_daily = true
            "#,
            ConfigFormat::Toml,
        )
        .unwrap();

        let toml = ConfigLoader::to_toml(&config).unwrap();
        let reloaded = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        assert_eq!(reloaded.source.group_id, "appLog");
        assert_eq!(reloaded.source.brokers.len(), 2);
        assert_eq!(reloaded.enabled_sink_count(), 2);
        assert_eq!(
            reloaded.sinks.file.as_ref().map(|f| f.max_size_bytes),
            Some(1048576)
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use collector::sinks::SharedConsole;
    use collector::{Collector, ConsoleSink, FileSink, StopReason};
    use contracts::{CancellationToken, ContractError, FileSinkConfig};
    use ingestion::MockSource;

    fn memory_console() -> (Arc<Mutex<Vec<u8>>>, SharedConsole) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let console: SharedConsole = buffer.clone();
        (buffer, console)
    }

    fn file_config(dir: &std::path::Path, max_size_bytes: i64) -> FileSinkConfig {
        FileSinkConfig {
            path: dir.to_string_lossy().into_owned(),
            filename_prefix: "e2e".to_string(),
            max_size_bytes,
            rotate_daily: false,
        }
    }

    /// End-to-end: MockSource -> Collector -> ConsoleSink + FileSink
    ///
    /// Both sinks must see the same bytes in the same order.
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let (console_buffer, console) = memory_console();

        let report = Collector::builder(8)
            .source(MockSource::bounded("mock", 100))
            .sink(ConsoleSink::with_console("console", console), 4)
            .sink(FileSink::new("file", &file_config(dir.path(), 0)).unwrap(), 4)
            .build()
            .run(CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.stop_reason, StopReason::Exhausted);
        assert_eq!(report.records_dispatched, 100);

        let console_output = console_buffer.lock().unwrap().clone();
        let file_output = std::fs::read(dir.path().join("e2e.log")).unwrap();
        assert_eq!(console_output, file_output);

        let text = String::from_utf8(file_output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 100);
        assert!(lines[0].ends_with("#1"));
        assert!(lines[99].ends_with("#100"));

        for (name, snapshot) in &report.sinks {
            assert_eq!(snapshot.write_count, 100, "sink {name}");
            assert_eq!(snapshot.failure_count, 0, "sink {name}");
        }
    }

    /// Size rotation spreads records over several files without losing any
    #[tokio::test]
    async fn test_e2e_size_rotation() {
        let dir = tempfile::tempdir().unwrap();

        Collector::builder(4)
            .source(MockSource::bounded("mock", 50))
            .sink(FileSink::new("file", &file_config(dir.path(), 200)).unwrap(), 4)
            .build()
            .run(CancellationToken::new())
            .await
            .unwrap();

        let mut files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();
        assert!(files.len() > 1);

        let total_lines: usize = files
            .iter()
            .map(|path| std::fs::read_to_string(path).unwrap().lines().count())
            .sum();
        assert_eq!(total_lines, 50);
        assert!(dir.path().join("e2e-(1).log").exists());
    }

    /// A fatal source error ends the run and is reported unchanged
    #[tokio::test]
    async fn test_e2e_source_failure() {
        let (console_buffer, console) = memory_console();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            Collector::builder(4)
                .source(MockSource::failing("flaky", 5, Duration::ZERO))
                .sink(ConsoleSink::with_console("console", console), 4)
                .build()
                .run(CancellationToken::new()),
        )
        .await
        .unwrap();

        match result {
            Err(ContractError::SourceFatal { source_name, .. }) => assert_eq!(source_name, "flaky"),
            other => panic!("expected source failure, got {other:?}"),
        }

        // Records still buffered when the source fails may be discarded
        let output = String::from_utf8(console_buffer.lock().unwrap().clone()).unwrap();
        assert!(output.lines().count() <= 5);
    }

    /// Cancelling an unbounded source stops the run cleanly
    #[tokio::test]
    async fn test_e2e_cancellation() {
        let (console_buffer, console) = memory_console();
        let cancel = CancellationToken::new();

        let run = tokio::spawn(
            Collector::builder(4)
                .source(MockSource::unbounded("endless", Duration::from_millis(1)))
                .sink(ConsoleSink::with_console("console", console), 4)
                .build()
                .run(cancel.clone()),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        let report = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert_eq!(report.stop_reason, StopReason::Cancelled);
        let written = console_buffer.lock().unwrap().clone();
        assert_eq!(
            String::from_utf8(written).unwrap().lines().count() as u64,
            report.sinks[0].1.write_count
        );
    }
}
