//! Fallible per-attempt work.
//!
//! Workers never decide on their own whether an attempt fails; they ask a
//! [`JobProcessor`]. The default [`SimulatedProcessor`] sleeps and then
//! rolls a die, tests plug in deterministic processors instead.

use crate::error::{JobError, JobResult};
use crate::job::JobContext;
use async_trait::async_trait;
use rand::Rng;
use retrypool_config::PoolConfig;
use std::time::Duration;

/// One attempt at a job.
#[async_trait]
pub trait JobProcessor: Send + Sync {
    /// Run one attempt. `Err` counts against the job's retry budget.
    async fn process(&self, ctx: &JobContext) -> JobResult<()>;
}

/// When simulated attempts fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailurePolicy {
    /// Fail each attempt independently with this probability.
    Random(f64),
    /// Fail every attempt.
    Always,
    /// Never fail.
    Never,
}

impl FailurePolicy {
    /// Random failures, probability clamped to `[0.0, 1.0]`.
    pub fn random(probability: f64) -> Self {
        if probability.is_nan() {
            return Self::Never;
        }
        Self::Random(probability.clamp(0.0, 1.0))
    }

    /// Draw the outcome for one attempt.
    pub fn should_fail(&self) -> bool {
        match self {
            Self::Random(p) => rand::thread_rng().gen_bool(*p),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Sleeps for a fixed delay, then fails according to a [`FailurePolicy`].
#[derive(Debug, Clone)]
pub struct SimulatedProcessor {
    delay: Duration,
    policy: FailurePolicy,
}

impl SimulatedProcessor {
    pub fn new(delay: Duration, policy: FailurePolicy) -> Self {
        Self { delay, policy }
    }

    /// Processor with no delay.
    pub fn instant(policy: FailurePolicy) -> Self {
        Self::new(Duration::ZERO, policy)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }
}

impl From<&PoolConfig> for SimulatedProcessor {
    fn from(config: &PoolConfig) -> Self {
        Self::new(
            config.processing_delay(),
            FailurePolicy::random(config.failure_rate),
        )
    }
}

#[async_trait]
impl JobProcessor for SimulatedProcessor {
    async fn process(&self, ctx: &JobContext) -> JobResult<()> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.policy.should_fail() {
            let budget = if ctx.is_last_attempt() {
                "no retries left"
            } else {
                "will retry"
            };
            return Err(JobError::ExecutionFailed(format!(
                "simulated failure on attempt {} of job {} ({})",
                ctx.attempt, ctx.job_id, budget
            )));
        }

        Ok(())
    }
}
