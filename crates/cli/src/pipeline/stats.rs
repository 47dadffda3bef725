//! Pipeline statistics.

use std::time::Duration;

use collector::{MetricsSnapshot, RunReport, StopReason};

/// Statistics from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Records offered to the sinks
    pub records_dispatched: u64,

    /// Why the run ended
    pub stop_reason: StopReason,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Final per-sink counters
    pub sinks: Vec<(String, MetricsSnapshot)>,
}

impl From<RunReport> for PipelineStats {
    fn from(report: RunReport) -> Self {
        Self {
            records_dispatched: report.records_dispatched,
            stop_reason: report.stop_reason,
            duration: report.duration,
            sinks: report.sinks,
        }
    }
}

impl PipelineStats {
    /// Records dispatched per second
    pub fn rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records_dispatched as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print summary to stderr; stdout may be carrying console sink output
    pub fn print_summary(&self) {
        eprintln!("\n=== Pipeline Statistics ===\n");
        eprintln!("  Stopped: {:?}", self.stop_reason);
        eprintln!("  Duration: {:.2}s", self.duration.as_secs_f64());
        eprintln!("  Records dispatched: {}", self.records_dispatched);
        eprintln!("  Rate: {:.2}/s", self.rate());

        if !self.sinks.is_empty() {
            eprintln!("\n  Sinks:");
            for (name, snapshot) in &self.sinks {
                eprintln!(
                    "    - {}: {} written, {} failed, {} undelivered",
                    name, snapshot.write_count, snapshot.failure_count, snapshot.undelivered_count
                );
            }
        }

        eprintln!();
    }
}
