//! Compilation metrics.
//!
//! Standardized recording points for monitoring the pipeline. Exporter
//! wiring is the deployment's concern.

use std::time::Duration;

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total compilation runs by outcome.
    pub const RUNS_TOTAL: &str = "reel_compilation_runs_total";

    /// End-to-end run duration in seconds by outcome.
    pub const RUN_SECONDS: &str = "reel_compilation_run_seconds";

    /// Segments assembled per completed run.
    pub const SEGMENTS: &str = "reel_compilation_segments";
}

/// Record a finished compilation run.
pub fn record_run(outcome: &'static str, elapsed: Duration) {
    counter!(names::RUNS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::RUN_SECONDS, "outcome" => outcome).record(elapsed.as_secs_f64());
}

/// Record the size of a completed compilation.
pub fn record_segments(count: usize) {
    histogram!(names::SEGMENTS).record(count as f64);
}
