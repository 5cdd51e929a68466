//! Metrics for worker pool monitoring.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding application installs a recorder.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Metric names for the worker pool.
pub mod names {
    /// Jobs submitted by the coordinator (retries excluded).
    pub const JOBS_ENQUEUED_TOTAL: &str = "retrypool_jobs_enqueued_total";
    /// Jobs that produced a result.
    pub const JOBS_COMPLETED_TOTAL: &str = "retrypool_jobs_completed_total";
    /// Failed attempts, including ones that were retried.
    pub const ATTEMPTS_FAILED_TOTAL: &str = "retrypool_attempts_failed_total";
    /// Jobs resubmitted for another attempt.
    pub const JOBS_RETRIED_TOTAL: &str = "retrypool_jobs_retried_total";
    /// Jobs that ended in a terminal error.
    pub const JOBS_TERMINAL_TOTAL: &str = "retrypool_jobs_terminal_total";

    /// Attempt duration in seconds.
    pub const ATTEMPT_DURATION_SECONDS: &str = "retrypool_attempt_duration_seconds";

    /// Workers currently running.
    pub const WORKERS_ACTIVE: &str = "retrypool_workers_active";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::JOBS_ENQUEUED_TOTAL,
        "Total number of jobs submitted to the pool"
    );
    describe_counter!(
        names::JOBS_COMPLETED_TOTAL,
        "Total number of jobs completed successfully"
    );
    describe_counter!(
        names::ATTEMPTS_FAILED_TOTAL,
        "Total number of failed attempts"
    );
    describe_counter!(
        names::JOBS_RETRIED_TOTAL,
        "Total number of job resubmissions"
    );
    describe_counter!(
        names::JOBS_TERMINAL_TOTAL,
        "Total number of jobs that failed terminally"
    );
    describe_histogram!(
        names::ATTEMPT_DURATION_SECONDS,
        "Duration of a single attempt in seconds"
    );
    describe_gauge!(names::WORKERS_ACTIVE, "Number of running workers");
}

/// Job metrics recorder.
#[derive(Clone)]
pub struct JobMetrics;

impl JobMetrics {
    pub fn job_enqueued() {
        counter!(names::JOBS_ENQUEUED_TOTAL).increment(1);
    }

    pub fn job_completed(worker_id: usize, duration: Duration) {
        counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
        histogram!(
            names::ATTEMPT_DURATION_SECONDS,
            "worker_id" => worker_id.to_string(),
            "status" => "completed"
        )
        .record(duration.as_secs_f64());
    }

    pub fn attempt_failed(worker_id: usize, duration: Duration) {
        counter!(names::ATTEMPTS_FAILED_TOTAL).increment(1);
        histogram!(
            names::ATTEMPT_DURATION_SECONDS,
            "worker_id" => worker_id.to_string(),
            "status" => "failed"
        )
        .record(duration.as_secs_f64());
    }

    pub fn job_retried(attempt: u32) {
        counter!(names::JOBS_RETRIED_TOTAL, "attempt" => attempt.to_string()).increment(1);
    }

    /// `reason` is `"exhausted"` or `"dropped"`.
    pub fn job_terminal(reason: &'static str) {
        counter!(names::JOBS_TERMINAL_TOTAL, "reason" => reason).increment(1);
    }
}

/// Worker metrics recorder.
#[derive(Clone)]
pub struct WorkerMetrics;

impl WorkerMetrics {
    pub fn worker_started(pool_id: &str) {
        gauge!(names::WORKERS_ACTIVE, "pool_id" => pool_id.to_string()).increment(1.0);
    }

    pub fn worker_stopped(pool_id: &str) {
        gauge!(names::WORKERS_ACTIVE, "pool_id" => pool_id.to_string()).decrement(1.0);
    }
}
