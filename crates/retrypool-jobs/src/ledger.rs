//! Per-job failed-attempt counters shared by all workers.

use crate::job::JobId;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

/// Shared map from job to the number of failed attempts.
///
/// Every read-modify-write happens under one lock, so two workers that
/// fail the same job back to back always observe distinct counts.
#[derive(Debug, Default)]
pub struct RetryLedger {
    counts: Mutex<HashMap<JobId, u32>>,
}

impl RetryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failed attempt and return the new count.
    ///
    /// The returned value is the one callers must use for the
    /// retry-or-fail decision; re-reading with [`attempts`](Self::attempts)
    /// afterwards may already include another worker's increment.
    pub fn increment_and_get(&self, job_id: JobId) -> u32 {
        let mut counts = self.counts.lock();
        let count = counts.entry(job_id).or_insert(0);
        *count += 1;
        *count
    }

    /// Failed attempts recorded so far (0 for unknown jobs).
    pub fn attempts(&self, job_id: JobId) -> u32 {
        self.counts.lock().get(&job_id).copied().unwrap_or(0)
    }

    /// Copy of all counts, ordered by job ID.
    pub fn snapshot(&self) -> BTreeMap<JobId, u32> {
        self.counts
            .lock()
            .iter()
            .map(|(job_id, count)| (*job_id, *count))
            .collect()
    }

    /// Number of jobs with at least one failed attempt.
    pub fn len(&self) -> usize {
        self.counts.lock().len()
    }

    /// Returns true if no failure has been recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.lock().is_empty()
    }
}
