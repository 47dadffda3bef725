//! Mock 数据源
//!
//! 生成合成日志行，用于无 broker 运行和测试。

use std::time::Duration;

use contracts::{BufferSender, CancellationToken, ContractError, LogSource, Record, SourceConfig};
use observability::record_record_ingested;
use tracing::{debug, info, instrument, trace};

/// Mock 数据源配置
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// 数据源名称
    pub name: String,

    /// 每条记录前的延迟 (0 = 缓冲区允许的最快速度)
    pub interval: Duration,

    /// 产生多少条记录后停止 (None = 无限)
    pub count: Option<u64>,

    /// 记录文本，末尾追加序号
    pub message: String,

    /// 产生多少条记录后致命失败 (None = 从不)
    pub fail_after: Option<u64>,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            interval: Duration::from_millis(100),
            count: None,
            message: "mock log record".to_string(),
            fail_after: None,
        }
    }
}

impl MockSourceConfig {
    /// 从 `[source]` 段构建 (kind = "mock")
    pub fn from_config(config: &SourceConfig) -> Self {
        Self {
            name: config.display_name(),
            interval: Duration::from_millis(config.interval_ms),
            count: (config.count > 0).then_some(config.count),
            message: config.message.clone(),
            fail_after: (config.fail_after > 0).then_some(config.fail_after),
        }
    }
}

/// Mock 数据源
pub struct MockSource {
    config: MockSourceConfig,
    emitted: u64,
}

impl MockSource {
    pub fn new(config: MockSourceConfig) -> Self {
        Self { config, emitted: 0 }
    }

    /// 无延迟产生 `count` 条记录的有限数据源
    pub fn bounded(name: &str, count: u64) -> Self {
        Self::new(MockSourceConfig {
            name: name.to_string(),
            interval: Duration::ZERO,
            count: Some(count),
            ..Default::default()
        })
    }

    /// 每个 `interval` 产生一条记录的无限数据源
    pub fn unbounded(name: &str, interval: Duration) -> Self {
        Self::new(MockSourceConfig {
            name: name.to_string(),
            interval,
            ..Default::default()
        })
    }

    /// 产生 `records` 条记录后致命失败的数据源
    pub fn failing(name: &str, records: u64, interval: Duration) -> Self {
        Self::new(MockSourceConfig {
            name: name.to_string(),
            interval,
            fail_after: Some(records),
            ..Default::default()
        })
    }

    /// 已推入缓冲区的记录数
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    fn exhausted(&self) -> bool {
        self.config.count.is_some_and(|count| self.emitted >= count)
    }

    fn should_fail(&self) -> bool {
        self.config.fail_after.is_some_and(|n| self.emitted >= n)
    }

    fn next_record(&self) -> Record {
        Record::from(format!(
            "{} {} #{}\n",
            self.config.name,
            self.config.message,
            self.emitted + 1
        ))
    }

    /// 等待下一个 tick，被取消时返回 false
    async fn pace(&self, cancel: &CancellationToken) -> bool {
        if self.config.interval.is_zero() {
            tokio::task::yield_now().await;
            return !cancel.is_cancelled();
        }
        cancel
            .run_until_cancelled(tokio::time::sleep(self.config.interval))
            .await
            .is_some()
    }
}

impl LogSource for MockSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    #[instrument(
        name = "mock_source_read",
        skip(self, cancel, buffer),
        fields(source = %self.config.name)
    )]
    async fn read(
        &mut self,
        cancel: CancellationToken,
        buffer: BufferSender,
    ) -> Result<(), ContractError> {
        debug!(
            interval_ms = self.config.interval.as_millis() as u64,
            count = ?self.config.count,
            "mock source started"
        );

        loop {
            if self.exhausted() {
                info!(emitted = self.emitted, "mock source exhausted");
                return Ok(());
            }
            if self.should_fail() {
                return Err(ContractError::source_fatal(
                    &self.config.name,
                    format!("injected failure after {} records", self.emitted),
                ));
            }
            if !self.pace(&cancel).await {
                break;
            }

            let record = self.next_record();
            if !buffer.push(record, &cancel).await {
                break;
            }
            self.emitted += 1;
            record_record_ingested(&self.config.name);
            trace!(seq = self.emitted, "mock record buffered");
        }

        debug!(emitted = self.emitted, "mock source stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{RecordBuffer, SourceKind};

    #[tokio::test]
    async fn test_bounded_source_finishes() {
        let (tx, rx) = RecordBuffer::bounded(16);
        let cancel = CancellationToken::new();
        let mut source = MockSource::bounded("m", 3);

        source.read(cancel.clone(), tx).await.unwrap();
        assert_eq!(source.emitted(), 3);

        let first = rx.pop(&cancel).await.unwrap();
        assert_eq!(first.payload(), b"m mock log record #1\n");
        assert_eq!(rx.len(), 2);
    }

    #[tokio::test]
    async fn test_failing_source_returns_fatal_error() {
        let (tx, _rx) = RecordBuffer::bounded(16);
        let mut source = MockSource::failing("m", 2, Duration::ZERO);

        let err = source.read(CancellationToken::new(), tx).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(source.emitted(), 2);
    }

    #[tokio::test]
    async fn test_cancel_while_blocked_on_full_buffer() {
        let (tx, _rx) = RecordBuffer::bounded(1);
        let cancel = CancellationToken::new();
        let mut source = MockSource::unbounded("m", Duration::ZERO);

        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let result = source.read(cancel, tx).await;
                (result, source.emitted())
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let (result, emitted) = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("source did not honour cancellation")
            .unwrap();
        assert!(result.is_ok());
        assert_eq!(emitted, 1);
    }

    #[test]
    fn test_from_config_zero_means_unbounded() {
        let config = SourceConfig {
            kind: SourceKind::Mock,
            name: None,
            brokers: Vec::new(),
            topic: String::new(),
            group_id: "g".to_string(),
            interval_ms: 0,
            count: 0,
            message: "hello".to_string(),
            fail_after: 0,
        };
        let mock = MockSourceConfig::from_config(&config);
        assert_eq!(mock.name, "mock");
        assert_eq!(mock.count, None);
        assert_eq!(mock.fail_after, None);
        assert!(mock.interval.is_zero());
    }
}
