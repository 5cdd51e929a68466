//! Job error types.

use crate::job::JobId;
use thiserror::Error;

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;

/// Errors raised while running the pool or a single attempt.
#[derive(Debug, Error)]
pub enum JobError {
    /// A single attempt failed. Counted against the job's retry budget.
    #[error("Job execution failed: {0}")]
    ExecutionFailed(String),

    /// The job queue no longer accepts submissions.
    #[error("Job queue is closed")]
    QueueClosed,

    /// A sink stopped accepting items.
    #[error("{0} sink is closed")]
    SinkClosed(&'static str),

    /// Worker error.
    #[error("Worker error: {0}")]
    Worker(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<JobError> for retrypool_core::PoolError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::Configuration(msg) => Self::Validation(msg),
            JobError::Worker(msg) => Self::WorkerTask(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// A job that reached its terminal failed state.
///
/// Each job produces at most one of these, and never alongside a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TerminalError {
    /// Every allowed attempt failed.
    #[error("worker {worker_id}: job {job_id} failed after {attempts} attempts")]
    RetriesExhausted {
        worker_id: usize,
        job_id: JobId,
        attempts: u32,
    },

    /// A retry could not be resubmitted because the pool was stopped and
    /// the queue closed.
    #[error("worker {worker_id}: job {job_id} dropped after {attempts} attempts: job queue closed")]
    Dropped {
        worker_id: usize,
        job_id: JobId,
        attempts: u32,
    },
}

impl TerminalError {
    /// The worker that gave up on the job.
    pub fn worker_id(&self) -> usize {
        match self {
            Self::RetriesExhausted { worker_id, .. } | Self::Dropped { worker_id, .. } => *worker_id,
        }
    }

    /// The failed job.
    pub fn job_id(&self) -> JobId {
        match self {
            Self::RetriesExhausted { job_id, .. } | Self::Dropped { job_id, .. } => *job_id,
        }
    }

    /// Failed attempts recorded for the job.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::RetriesExhausted { attempts, .. } | Self::Dropped { attempts, .. } => *attempts,
        }
    }
}
