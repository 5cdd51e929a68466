//! Retrypool Jobs - Worker Pool with Bounded Retries
//!
//! A fixed pool of workers pulls job ids from a shared queue, runs one
//! attempt per dequeue and, on failure, either resubmits the job or gives
//! up on it once its retry budget is spent.
//!
//! # Architecture
//!
//! ```text
//!   WorkerPool::run
//!      │ seeds 1..=jobs
//!      ▼
//!  ┌──────────┐  dequeue   ┌──────────┐  ok    ┌─────────────┐
//!  │ JobQueue │ ─────────▶ │ Worker N │ ─────▶ │ results     │
//!  └──────────┘            └──────────┘        └─────────────┘
//!      ▲                        │ err
//!      │ retry (count < max)    ▼
//!      └──────────────── RetryLedger ── count == max ──▶ errors
//! ```
//!
//! The queue stays open until every job has either produced a result or
//! a [`TerminalError`], so a retry can never race the queue's shutdown.
//!
//! # Example
//!
//! ```rust,ignore
//! use retrypool_jobs::prelude::*;
//! use std::sync::Arc;
//!
//! let processor = SimulatedProcessor::new(Duration::from_millis(100), FailurePolicy::random(0.3));
//! let pool = WorkerPool::new(WorkerPoolConfig::default(), Arc::new(processor));
//! let report = pool.run().await?;
//! for value in &report.results {
//!     println!("Result: {}", value);
//! }
//! ```

pub mod error;
pub mod job;
pub mod ledger;
pub mod metrics;
pub mod pool;
pub mod processor;
pub mod queue;
pub mod sink;
pub mod worker;

pub use error::{JobError, JobResult, TerminalError};
pub use job::{JobContext, JobId};
pub use ledger::RetryLedger;
pub use metrics::{register_metrics, JobMetrics, WorkerMetrics};
pub use pool::{PoolReport, WorkerPool, WorkerPoolConfig};
pub use processor::{FailurePolicy, JobProcessor, SimulatedProcessor};
pub use queue::{CompletionTracker, JobQueue};
pub use sink::{sink, Sink, SinkDrain};
pub use worker::{Worker, WorkerShared, WorkerStats};

/// Re-export commonly used items
pub mod prelude {
    pub use crate::pool::{PoolReport, WorkerPool, WorkerPoolConfig};
    pub use crate::processor::{FailurePolicy, JobProcessor, SimulatedProcessor};
    pub use crate::{JobContext, JobError, JobId, JobResult, TerminalError};
    pub use std::time::Duration;
}
