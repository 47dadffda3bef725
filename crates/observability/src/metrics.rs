//! 记录流转指标
//!
//! 对 `metrics` 门面的薄封装，指标名集中在此定义。
//! 未安装 recorder 时所有调用均为空操作。

use metrics::{counter, gauge};

/// 数据源向共享缓冲区推入一条记录
pub fn record_record_ingested(source: &str) {
    counter!("logship_records_ingested_total", "source" => source.to_string()).increment(1);
}

/// 数据源因致命错误退出
pub fn record_source_failure(source: &str) {
    counter!("logship_source_failures_total", "source" => source.to_string()).increment(1);
}

/// 共享缓冲区当前深度
pub fn record_buffer_depth(depth: usize) {
    gauge!("logship_buffer_depth").set(depth as f64);
}

/// 分发器将一条记录交给所有 sink
pub fn record_record_dispatched() {
    counter!("logship_records_dispatched_total").increment(1);
}

/// sink 写入成功一次
pub fn record_sink_write(sink: &str) {
    counter!("logship_sink_writes_total", "sink" => sink.to_string()).increment(1);
}

/// sink 写入失败一次
pub fn record_sink_failure(sink: &str) {
    counter!("logship_sink_failures_total", "sink" => sink.to_string()).increment(1);
}

/// sink 关闭时释放资源失败
pub fn record_sink_close_failure(sink: &str) {
    counter!("logship_sink_close_failures_total", "sink" => sink.to_string()).increment(1);
}

/// 文件 sink 切换到新文件
pub fn record_file_rotation(sink: &str) {
    counter!("logship_file_rotations_total", "sink" => sink.to_string()).increment(1);
}
