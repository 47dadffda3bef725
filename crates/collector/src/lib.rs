//! # Collector
//!
//! 日志投递管道：N 个数据源写入同一个有界记录缓冲区，
//! 单个分发器从中取出记录并交给全部 M 个 sink。
//!
//! ## 架构
//! - 每个数据源一个 worker 任务，共同写入 `RecordBuffer`
//! - 单个分发器任务，是缓冲区唯一的消费者
//! - 每个 sink 一个 `SinkHandle`：有界队列 + 独占该 sink 的 worker
//! - 取消、数据源失败与数据源耗尽走同一套收尾流程：
//!   停止数据源，停止分发器，排空并关闭每个 sink 恰好一次

mod collector;
mod dispatcher;
mod error;
mod handle;
mod metrics;
pub mod sinks;
mod worker;

pub use collector::{
    create_sink_handles, Collector, CollectorBuilder, RunReport, StopReason, DEFAULT_BUFFER_SIZE,
};
pub use dispatcher::Dispatcher;
pub use error::CollectorError;
pub use handle::{Delivery, SinkHandle, SinkSender};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{ConsoleSink, FileSink, RotatingFile, RotationPolicy};
pub use worker::{SourceResult, SourceWorker};
