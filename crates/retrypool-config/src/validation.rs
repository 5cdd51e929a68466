//! Configuration validation.
//!
//! Fails fast on values the worker pool cannot run with.

use crate::{AppConfig, PoolConfig};
use retrypool_core::PoolError;
use std::fmt;

/// Largest accepted worker count.
pub const MAX_WORKERS: usize = 1024;

/// Largest accepted job count. Queue and sink channels are sized to the job
/// count, and tokio channels hold at most `usize::MAX >> 3` permits.
pub const MAX_JOBS: usize = usize::MAX >> 3;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    /// A count that must be at least one was zero.
    NotPositive { name: &'static str },
    /// A count above its upper bound.
    TooLarge { name: &'static str, max: usize },
    /// Failure rate outside `[0.0, 1.0]` or not a number.
    InvalidFailureRate { value: f64 },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPositive { name } => {
                write!(f, "'{}' must be a positive integer", name)
            }
            Self::TooLarge { name, max } => {
                write!(f, "'{}' must be at most {}", name, max)
            }
            Self::InvalidFailureRate { value } => {
                write!(
                    f,
                    "Invalid failure rate: {} (must be between 0.0 and 1.0)",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

impl From<ConfigValidationError> for PoolError {
    fn from(err: ConfigValidationError) -> Self {
        PoolError::Validation(err.to_string())
    }
}

impl PoolConfig {
    /// Collect every validation error in this pool configuration.
    pub fn validation_errors(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.workers == 0 {
            errors.push(ConfigValidationError::NotPositive { name: "workers" });
        } else if self.workers > MAX_WORKERS {
            errors.push(ConfigValidationError::TooLarge {
                name: "workers",
                max: MAX_WORKERS,
            });
        }
        if self.jobs == 0 {
            errors.push(ConfigValidationError::NotPositive { name: "jobs" });
        } else if self.jobs > MAX_JOBS {
            errors.push(ConfigValidationError::TooLarge {
                name: "jobs",
                max: MAX_JOBS,
            });
        }
        if self.max_retries == 0 {
            errors.push(ConfigValidationError::NotPositive { name: "max_retries" });
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            errors.push(ConfigValidationError::InvalidFailureRate {
                value: self.failure_rate,
            });
        }

        errors
    }

    /// Validate, returning the first error found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        match self.validation_errors().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppConfig {
    /// Validate the whole configuration.
    pub fn validate(&self) -> Result<(), PoolError> {
        self.pool.validate().map_err(PoolError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = PoolConfig {
            workers: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::NotPositive { name: "workers" })
        );
    }

    #[test]
    fn test_upper_bounds() {
        let config = PoolConfig {
            workers: MAX_WORKERS,
            jobs: MAX_JOBS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = PoolConfig {
            workers: MAX_WORKERS + 1,
            jobs: MAX_JOBS + 1,
            ..Default::default()
        };
        assert_eq!(
            config.validation_errors(),
            vec![
                ConfigValidationError::TooLarge {
                    name: "workers",
                    max: MAX_WORKERS
                },
                ConfigValidationError::TooLarge {
                    name: "jobs",
                    max: MAX_JOBS
                },
            ]
        );
    }

    #[test]
    fn test_too_large_is_a_configuration_error() {
        let config = AppConfig {
            pool: PoolConfig {
                jobs: usize::MAX,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("'jobs' must be at most"));
    }

    #[test]
    fn test_all_errors_collected() {
        let config = PoolConfig {
            workers: 0,
            jobs: 0,
            max_retries: 0,
            failure_rate: 1.5,
            ..Default::default()
        };
        assert_eq!(config.validation_errors().len(), 4);
    }

    #[test]
    fn test_failure_rate_bounds() {
        for rate in [0.0, 0.5, 1.0] {
            let config = PoolConfig {
                failure_rate: rate,
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "rate {} should be valid", rate);
        }

        let config = PoolConfig {
            failure_rate: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_converts_to_pool_error() {
        let config = AppConfig {
            pool: PoolConfig {
                jobs: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("'jobs' must be a positive integer"));
    }
}
