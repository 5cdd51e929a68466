//! Worker pool: sets up the queue and sinks, runs the workers and collects
//! their outcomes.

use crate::error::{JobError, JobResult, TerminalError};
use crate::job::JobId;
use crate::ledger::RetryLedger;
use crate::metrics::JobMetrics;
use crate::processor::JobProcessor;
use crate::queue::{CompletionTracker, JobQueue};
use crate::sink::sink;
use crate::worker::{Worker, WorkerShared, WorkerStats};
use parking_lot::Mutex;
use retrypool_config::{PoolConfig, MAX_WORKERS};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

/// Worker pool configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    /// Number of concurrent workers.
    pub workers: usize,

    /// Number of jobs submitted (ids `1..=jobs`).
    pub jobs: usize,

    /// Failed attempts after which a job is terminally failed.
    pub max_retries: u32,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            jobs: 10,
            max_retries: 3,
        }
    }
}

impl From<&PoolConfig> for WorkerPoolConfig {
    fn from(config: &PoolConfig) -> Self {
        Self {
            workers: config.workers,
            jobs: config.jobs,
            max_retries: config.max_retries,
        }
    }
}

impl WorkerPoolConfig {
    fn validate(&self) -> JobResult<()> {
        for (name, value) in [
            ("workers", self.workers),
            ("jobs", self.jobs),
            ("max_retries", self.max_retries as usize),
        ] {
            if value == 0 {
                return Err(JobError::Configuration(format!(
                    "'{}' must be a positive integer",
                    name
                )));
            }
        }
        for (name, value, max) in [
            ("workers", self.workers, MAX_WORKERS),
            ("jobs", self.jobs, Semaphore::MAX_PERMITS),
        ] {
            if value > max {
                return Err(JobError::Configuration(format!(
                    "'{}' must be at most {}",
                    name, max
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of one [`WorkerPool::run`].
#[derive(Debug, Clone)]
pub struct PoolReport {
    /// Successful outputs, in arrival order.
    pub results: Vec<u64>,

    /// Terminal failures, in arrival order.
    pub errors: Vec<TerminalError>,

    /// Failed-attempt count per job that failed at least once.
    pub failed_attempts: BTreeMap<JobId, u32>,

    /// Per-worker counters, ordered by worker id.
    pub workers: Vec<WorkerStats>,

    /// Jobs left without a terminal state (non-zero only after a stop).
    pub unresolved: usize,

    /// Whether the run was stopped before every job resolved.
    pub cancelled: bool,
}

impl PoolReport {
    /// Jobs that reached a terminal state.
    pub fn resolved(&self) -> usize {
        self.results.len() + self.errors.len()
    }
}

/// Fixed-size pool of workers sharing one job queue and retry ledger.
pub struct WorkerPool {
    id: String,
    config: WorkerPoolConfig,
    processor: Arc<dyn JobProcessor>,
    shutdown_tx: watch::Sender<bool>,
    running: AtomicBool,
    active_queue: Mutex<Option<Arc<JobQueue>>>,
}

impl WorkerPool {
    /// Create a new worker pool.
    pub fn new(config: WorkerPoolConfig, processor: Arc<dyn JobProcessor>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            id: format!("worker-pool-{}", Uuid::new_v4()),
            config,
            processor,
            shutdown_tx,
            running: AtomicBool::new(false),
            active_queue: Mutex::new(None),
        }
    }

    /// Submit jobs `1..=jobs`, run every worker until all jobs are
    /// resolved (or the pool is stopped), then drain the sinks.
    pub async fn run(&self) -> JobResult<PoolReport> {
        self.config.validate()?;

        if self.running.swap(true, Ordering::SeqCst) {
            return Err(JobError::Worker("Worker pool already running".to_string()));
        }

        let result = self.run_inner().await;
        self.active_queue.lock().take();
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_inner(&self) -> JobResult<PoolReport> {
        let WorkerPoolConfig {
            workers,
            jobs,
            max_retries,
        } = self.config.clone();

        info!(
            pool_id = %self.id,
            workers,
            jobs,
            max_retries,
            "Starting worker pool"
        );

        let queue = Arc::new(JobQueue::new(jobs));
        {
            let mut active = self.active_queue.lock();
            *active = Some(queue.clone());
            // A stop issued before the queue was registered could not close it.
            if self.is_stopped() {
                queue.close();
            }
        }

        let (results, results_rx) = sink("results", jobs);
        let (errors, errors_rx) = sink("errors", jobs);
        let shared = WorkerShared {
            pool_id: Arc::from(self.id.as_str()),
            queue,
            ledger: Arc::new(RetryLedger::new()),
            tracker: Arc::new(CompletionTracker::new(jobs)),
            processor: self.processor.clone(),
            results,
            errors,
            max_retries,
        };

        let mut tasks = JoinSet::new();
        for worker_id in 1..=workers {
            let worker = Worker::new(worker_id, shared.clone(), self.shutdown_tx.subscribe());
            tasks.spawn(
                worker
                    .run()
                    .instrument(tracing::info_span!("worker", worker_id)),
            );
        }

        // Sized to `jobs`, so seeding never waits on workers.
        for job_id in JobId::range(jobs) {
            if let Err(e) = shared.queue.enqueue(job_id).await {
                warn!(job_id = %job_id, error = %e, "Stopped submitting jobs");
                break;
            }
            JobMetrics::job_enqueued();
        }

        let mut worker_stats = Vec::with_capacity(workers);
        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(stats) => worker_stats.push(stats),
                Err(e) => {
                    error!(pool_id = %self.id, error = %e, "Worker task failed");
                    // The dead worker's job can never resolve; stop the rest.
                    self.stop();
                    failure.get_or_insert_with(|| e.to_string());
                }
            }
        }

        shared.queue.close();
        let WorkerShared {
            ledger,
            tracker,
            ..
        } = shared;

        if let Some(msg) = failure {
            return Err(JobError::Worker(msg));
        }

        let results = results_rx.drain().await;
        let errors = errors_rx.drain().await;
        worker_stats.sort_by_key(|stats| stats.worker_id);
        let unresolved = tracker.remaining();

        let report = PoolReport {
            results,
            errors,
            failed_attempts: ledger.snapshot(),
            workers: worker_stats,
            unresolved,
            cancelled: unresolved > 0 && self.is_stopped(),
        };

        info!(
            pool_id = %self.id,
            succeeded = report.results.len(),
            failed = report.errors.len(),
            unresolved = report.unresolved,
            "Worker pool finished"
        );

        Ok(report)
    }

    /// Signal every worker to stop at its next suspension point and close
    /// the running job queue.
    ///
    /// A retry submitted after the close is reported as
    /// [`TerminalError::Dropped`]. A stopped pool stays stopped: later runs
    /// return at once with every job unresolved.
    pub fn stop(&self) {
        info!(pool_id = %self.id, "Stopping worker pool...");
        self.shutdown_tx.send_replace(true);
        if let Some(queue) = self.active_queue.lock().as_ref() {
            queue.close();
        }
    }

    /// Returns true once [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Check if the pool is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the pool ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::{FailurePolicy, SimulatedProcessor};

    fn pool(workers: usize, jobs: usize, max_retries: u32, policy: FailurePolicy) -> WorkerPool {
        WorkerPool::new(
            WorkerPoolConfig {
                workers,
                jobs,
                max_retries,
            },
            Arc::new(SimulatedProcessor::instant(policy)),
        )
    }

    #[test]
    fn test_worker_pool_config_default() {
        let config = WorkerPoolConfig::default();
        assert_eq!(config.workers, 3);
        assert_eq!(config.jobs, 10);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_config_from_pool_config() {
        let config = WorkerPoolConfig::from(&PoolConfig {
            workers: 5,
            jobs: 50,
            max_retries: 2,
            ..Default::default()
        });
        assert_eq!(
            config,
            WorkerPoolConfig {
                workers: 5,
                jobs: 50,
                max_retries: 2
            }
        );
    }

    #[tokio::test]
    async fn test_rejects_zero_workers() {
        let pool = pool(0, 5, 3, FailurePolicy::Never);
        let err = pool.run().await.unwrap_err();
        assert!(matches!(err, JobError::Configuration(_)));
        assert!(!pool.is_running());
    }

    #[tokio::test]
    async fn test_rejects_counts_above_bounds() {
        let huge_jobs = pool(1, usize::MAX / 4, 3, FailurePolicy::Never);
        let err = huge_jobs.run().await.unwrap_err();
        assert!(matches!(err, JobError::Configuration(_)));
        assert!(err.to_string().contains("'jobs' must be at most"));
        assert!(!huge_jobs.is_running());

        let huge_workers = pool(MAX_WORKERS + 1, 5, 3, FailurePolicy::Never);
        let err = huge_workers.run().await.unwrap_err();
        assert!(matches!(err, JobError::Configuration(_)));
        assert!(err.to_string().contains("'workers' must be at most"));
    }

    #[test]
    fn test_job_bound_fits_channel_capacity() {
        assert!(retrypool_config::MAX_JOBS <= Semaphore::MAX_PERMITS);
    }

    #[tokio::test]
    async fn test_pool_id_is_prefixed() {
        let pool = pool(1, 1, 1, FailurePolicy::Never);
        assert!(pool.id().starts_with("worker-pool-"));
    }

    #[tokio::test]
    async fn test_stopped_pool_leaves_jobs_unresolved() {
        let pool = pool(2, 4, 3, FailurePolicy::Never);
        pool.stop();

        let report = pool.run().await.unwrap();

        assert!(report.cancelled);
        assert!(report.results.is_empty());
        assert_eq!(report.unresolved, 4);
        assert_eq!(report.workers.len(), 2);
        assert!(pool.active_queue.lock().is_none());
    }
}
