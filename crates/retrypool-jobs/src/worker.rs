//! A single worker loop.

use crate::error::TerminalError;
use crate::job::{JobContext, JobId};
use crate::ledger::RetryLedger;
use crate::metrics::{JobMetrics, WorkerMetrics};
use crate::processor::JobProcessor;
use crate::queue::{CompletionTracker, JobQueue};
use crate::sink::Sink;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Handles shared by every worker of one run.
#[derive(Clone)]
pub struct WorkerShared {
    pub pool_id: Arc<str>,
    pub queue: Arc<JobQueue>,
    pub ledger: Arc<RetryLedger>,
    pub tracker: Arc<CompletionTracker>,
    pub processor: Arc<dyn JobProcessor>,
    pub results: Sink<u64>,
    pub errors: Sink<TerminalError>,
    pub max_retries: u32,
}

/// Counters for one worker, returned when its loop ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub worker_id: usize,
    /// Attempts started (including the ones cut short by a stop).
    pub attempts: u64,
    pub succeeded: u64,
    pub failed_attempts: u64,
    pub retried: u64,
    pub terminal: u64,
}

/// Worker that pulls jobs until the queue is closed and drained or the
/// pool is stopped.
pub struct Worker {
    id: usize,
    shared: WorkerShared,
    shutdown: watch::Receiver<bool>,
    stats: WorkerStats,
}

impl Worker {
    pub fn new(id: usize, shared: WorkerShared, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            id,
            shared,
            shutdown,
            stats: WorkerStats {
                worker_id: id,
                ..Default::default()
            },
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Run the loop to completion.
    pub async fn run(mut self) -> WorkerStats {
        WorkerMetrics::worker_started(&self.shared.pool_id);
        debug!(worker_id = self.id, "Worker started");

        loop {
            let job_id = tokio::select! {
                biased;
                () = stopped(&mut self.shutdown) => {
                    info!(worker_id = self.id, "Worker {} stopping", self.id);
                    break;
                }
                next = self.shared.queue.dequeue() => match next {
                    Some(job_id) => job_id,
                    None => break,
                },
            };

            if !self.process(job_id).await {
                info!(worker_id = self.id, job_id = %job_id, "Worker {} stopped during job {}", self.id, job_id);
                break;
            }
        }

        WorkerMetrics::worker_stopped(&self.shared.pool_id);
        debug!(worker_id = self.id, stats = ?self.stats, "Worker finished");
        self.stats
    }

    /// Run one attempt and route its outcome. Returns false if the pool
    /// was stopped mid-attempt; the job is then left unresolved.
    async fn process(&mut self, job_id: JobId) -> bool {
        let attempt = self.shared.ledger.attempts(job_id) + 1;
        let ctx = JobContext {
            job_id,
            worker_id: self.id,
            attempt,
            max_retries: self.shared.max_retries,
        };

        info!(
            worker_id = self.id,
            job_id = %job_id,
            attempt,
            "Worker {} processing job {} (attempt {})",
            self.id,
            job_id,
            attempt
        );
        self.stats.attempts += 1;

        let started = Instant::now();
        let outcome = tokio::select! {
            biased;
            () = stopped(&mut self.shutdown) => return false,
            outcome = self.shared.processor.process(&ctx) => outcome,
        };

        match outcome {
            Ok(()) => {
                JobMetrics::job_completed(self.id, started.elapsed());
                self.stats.succeeded += 1;
                if let Err(e) = self.shared.results.emit(job_id.output()).await {
                    error!(job_id = %job_id, error = %e, "Failed to record result");
                }
                self.resolve();
            }
            Err(e) => {
                JobMetrics::attempt_failed(self.id, started.elapsed());
                self.stats.failed_attempts += 1;
                self.fail(job_id, &e.to_string()).await;
            }
        }

        true
    }

    async fn fail(&mut self, job_id: JobId, reason: &str) {
        let failures = self.shared.ledger.increment_and_get(job_id);

        if failures < self.shared.max_retries {
            warn!(
                worker_id = self.id,
                job_id = %job_id,
                failures,
                reason,
                "Worker {}: job {} failed, retrying...",
                self.id,
                job_id
            );

            match self.shared.queue.enqueue(job_id).await {
                Ok(()) => {
                    JobMetrics::job_retried(failures);
                    self.stats.retried += 1;
                }
                Err(e) => {
                    warn!(job_id = %job_id, error = %e, "Retry refused, dropping job");
                    JobMetrics::job_terminal("dropped");
                    self.terminal(TerminalError::Dropped {
                        worker_id: self.id,
                        job_id,
                        attempts: failures,
                    })
                    .await;
                }
            }
        } else {
            JobMetrics::job_terminal("exhausted");
            self.terminal(TerminalError::RetriesExhausted {
                worker_id: self.id,
                job_id,
                attempts: failures,
            })
            .await;
        }
    }

    async fn terminal(&mut self, err: TerminalError) {
        error!(
            worker_id = self.id,
            job_id = %err.job_id(),
            attempts = err.attempts(),
            "{}",
            err
        );
        self.stats.terminal += 1;
        if let Err(e) = self.shared.errors.emit(err).await {
            error!(error = %e, "Failed to record terminal error");
        }
        self.resolve();
    }

    fn resolve(&self) {
        if self.shared.tracker.resolve() && self.shared.queue.close() {
            info!(worker_id = self.id, "All jobs resolved, closing job queue");
        }
    }
}

/// Resolves once the stop flag is set, or when the pool dropped its sender.
pub(crate) async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stopped| *stopped).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::{FailurePolicy, SimulatedProcessor};
    use crate::sink::{sink, SinkDrain};

    fn shared(
        jobs: usize,
        max_retries: u32,
        policy: FailurePolicy,
    ) -> (WorkerShared, SinkDrain<u64>, SinkDrain<TerminalError>) {
        let (results, results_rx) = sink("results", jobs);
        let (errors, errors_rx) = sink("errors", jobs);
        let shared = WorkerShared {
            pool_id: Arc::from("test-pool"),
            queue: Arc::new(JobQueue::new(jobs)),
            ledger: Arc::new(RetryLedger::new()),
            tracker: Arc::new(CompletionTracker::new(jobs)),
            processor: Arc::new(SimulatedProcessor::instant(policy)),
            results,
            errors,
            max_retries,
        };
        (shared, results_rx, errors_rx)
    }

    #[tokio::test]
    async fn test_worker_retries_then_fails_terminally() {
        let (shared, results, errors) = shared(1, 2, FailurePolicy::Always);
        let (_tx, rx) = watch::channel(false);
        shared.queue.enqueue(JobId::new(1)).await.unwrap();

        let stats = Worker::new(1, shared.clone(), rx).run().await;

        assert_eq!(stats.attempts, 2);
        assert_eq!(stats.retried, 1);
        assert_eq!(stats.terminal, 1);
        assert!(shared.queue.is_closed());
        assert_eq!(shared.ledger.attempts(JobId::new(1)), 2);

        drop(shared);
        assert!(results.drain().await.is_empty());
        let errors = errors.drain().await;
        assert_eq!(
            errors,
            vec![TerminalError::RetriesExhausted {
                worker_id: 1,
                job_id: JobId::new(1),
                attempts: 2,
            }]
        );
    }

    #[tokio::test]
    async fn test_worker_emits_doubled_results() {
        let (shared, results, errors) = shared(3, 3, FailurePolicy::Never);
        let (_tx, rx) = watch::channel(false);
        for job_id in JobId::range(3) {
            shared.queue.enqueue(job_id).await.unwrap();
        }

        let stats = Worker::new(7, shared.clone(), rx).run().await;

        assert_eq!(stats.worker_id, 7);
        assert_eq!(stats.succeeded, 3);
        assert!(shared.ledger.is_empty());
        assert_eq!(results.drain().await, vec![2, 4, 6]);
        assert!(errors.drain().await.is_empty());
    }

    #[tokio::test]
    async fn test_stopped_worker_exits_without_draining() {
        let (shared, results, _errors) = shared(2, 3, FailurePolicy::Never);
        let (tx, rx) = watch::channel(false);
        shared.queue.enqueue(JobId::new(1)).await.unwrap();
        tx.send_replace(true);

        let stats = Worker::new(1, shared.clone(), rx).run().await;

        assert_eq!(stats.attempts, 0);
        assert_eq!(shared.tracker.remaining(), 2);
        assert!(results.drain().await.is_empty());
    }

    #[tokio::test]
    async fn test_retry_into_closed_queue_is_dropped() {
        let (shared, _results, errors) = shared(2, 3, FailurePolicy::Always);
        let (_tx, rx) = watch::channel(false);
        let mut worker = Worker::new(1, shared.clone(), rx);

        shared.queue.close();
        worker.fail(JobId::new(2), "simulated").await;

        assert_eq!(worker.stats.terminal, 1);
        assert_eq!(
            errors.drain().await,
            vec![TerminalError::Dropped {
                worker_id: 1,
                job_id: JobId::new(2),
                attempts: 1,
            }]
        );
    }
}
