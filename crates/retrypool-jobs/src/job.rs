//! Job identifiers and per-attempt context.

use std::fmt;

/// Identifier of a unit of work. Jobs are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(u64);

impl JobId {
    /// Creates a job ID.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Output produced when this job succeeds.
    pub const fn output(self) -> u64 {
        self.0 * 2
    }

    /// Job IDs `1..=count`, in increasing order.
    pub fn range(count: usize) -> impl Iterator<Item = JobId> {
        (1..=count as u64).map(JobId)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Context handed to the processor for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobContext {
    /// Job being attempted.
    pub job_id: JobId,

    /// Worker running the attempt.
    pub worker_id: usize,

    /// Current attempt number (1-based).
    pub attempt: u32,

    /// Failed attempts allowed before the job is terminally failed.
    pub max_retries: u32,
}

impl JobContext {
    /// Returns true if failing this attempt exhausts the budget.
    pub fn is_last_attempt(&self) -> bool {
        self.attempt >= self.max_retries
    }
}
