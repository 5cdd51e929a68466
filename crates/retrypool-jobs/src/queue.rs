//! Bounded FIFO of pending jobs, shared by the coordinator and workers.

use crate::error::{JobError, JobResult};
use crate::job::JobId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

/// Pending-job queue.
///
/// The coordinator seeds it and workers resubmit retries into it. Closing
/// drops the queue's sender: later [`enqueue`](Self::enqueue) calls get
/// [`JobError::QueueClosed`], and [`dequeue`](Self::dequeue) keeps handing
/// out buffered jobs until the buffer is empty.
#[derive(Debug)]
pub struct JobQueue {
    tx: Mutex<Option<mpsc::Sender<JobId>>>,
    rx: tokio::sync::Mutex<mpsc::Receiver<JobId>>,
    capacity: usize,
}

impl JobQueue {
    /// Creates a queue holding at most `capacity` jobs (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);

        Self {
            tx: Mutex::new(Some(tx)),
            rx: tokio::sync::Mutex::new(rx),
            capacity,
        }
    }

    /// Submit a job, waiting for space if the queue is full.
    pub async fn enqueue(&self, job_id: JobId) -> JobResult<()> {
        // Clone out of the lock; the guard must not live across the await.
        let tx = self.tx.lock().clone().ok_or(JobError::QueueClosed)?;
        tx.send(job_id).await.map_err(|_| JobError::QueueClosed)?;
        debug!(job_id = %job_id, "Job enqueued");
        Ok(())
    }

    /// Wait for the next job. `None` once the queue is closed and drained.
    pub async fn dequeue(&self) -> Option<JobId> {
        self.rx.lock().await.recv().await
    }

    /// Stop accepting submissions. Returns false if already closed.
    pub fn close(&self) -> bool {
        let closed = self.tx.lock().take().is_some();
        if closed {
            debug!("Job queue closed");
        }
        closed
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }

    /// Maximum number of buffered jobs.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Counts jobs that reached a terminal state.
///
/// The queue may only close once every job is resolved: until then a
/// failed job can still need resubmitting.
#[derive(Debug)]
pub struct CompletionTracker {
    total: usize,
    resolved: AtomicUsize,
}

impl CompletionTracker {
    /// Tracker for `total` jobs.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            resolved: AtomicUsize::new(0),
        }
    }

    /// Mark one job resolved. Returns true for the call that resolves the
    /// last job.
    pub fn resolve(&self) -> bool {
        self.resolved.fetch_add(1, Ordering::AcqRel) + 1 == self.total
    }

    /// Jobs resolved so far.
    pub fn resolved(&self) -> usize {
        self.resolved.load(Ordering::Acquire)
    }

    /// Jobs not yet resolved.
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.resolved())
    }

    /// Returns true once every job is resolved.
    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }
}
