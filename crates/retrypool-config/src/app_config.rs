//! Application configuration structures.

use retrypool_core::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Worker pool settings.
    #[serde(default)]
    pub pool: PoolConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Worker pool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of concurrent workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Number of jobs submitted (ids `1..=jobs`).
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Failed attempts after which a job is terminally failed.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Simulated processing time per attempt, in milliseconds.
    #[serde(default = "default_processing_delay")]
    pub processing_delay_ms: u64,

    /// Probability that a single attempt fails (0.0 to 1.0).
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            jobs: default_jobs(),
            max_retries: default_max_retries(),
            processing_delay_ms: default_processing_delay(),
            failure_rate: default_failure_rate(),
        }
    }
}

fn default_workers() -> usize {
    3
}

fn default_jobs() -> usize {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_processing_delay() -> u64 {
    1000 // 1 second
}

fn default_failure_rate() -> f64 {
    0.3
}

impl PoolConfig {
    /// Returns the processing delay as a `Duration`.
    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }
}

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct PoolOverrides {
    pub workers: Option<usize>,
    pub jobs: Option<usize>,
    pub max_retries: Option<u32>,
    pub processing_delay_ms: Option<u64>,
    pub failure_rate: Option<f64>,
}

impl PoolConfig {
    /// Apply every override that is set.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &PoolOverrides) -> Self {
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(jobs) = overrides.jobs {
            self.jobs = jobs;
        }
        if let Some(max_retries) = overrides.max_retries {
            self.max_retries = max_retries;
        }
        if let Some(delay) = overrides.processing_delay_ms {
            self.processing_delay_ms = delay;
        }
        if let Some(rate) = overrides.failure_rate {
            self.failure_rate = rate;
        }
        self
    }
}
