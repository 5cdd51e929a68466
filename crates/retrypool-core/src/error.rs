//! Unified error type for the retrypool workspace.

use std::fmt::Debug;
use thiserror::Error;

/// Workspace-level error.
///
/// Job-level failures never surface here: they are values in the error
/// sink. `PoolError` covers the things that stop a run from starting or
/// finishing at all.
#[derive(Error, Debug)]
pub enum PoolError {
    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configuration was loaded but holds invalid values.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Logging could not be initialised.
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// A worker task panicked or was aborted.
    #[error("Worker task failed: {0}")]
    WorkerTask(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PoolError {
    /// Returns true if the error was caused by user-supplied settings.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Validation(_))
    }

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.is_configuration() {
            2
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_flagged() {
        assert!(PoolError::Configuration("bad toml".into()).is_configuration());
        assert!(PoolError::Validation("workers must be positive".into()).is_configuration());
        assert!(!PoolError::Internal("boom".into()).is_configuration());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(PoolError::Validation("x".into()).exit_code(), 2);
        assert_eq!(PoolError::WorkerTask("panicked".into()).exit_code(), 1);
    }

    #[test]
    fn test_display_includes_message() {
        let err = PoolError::Validation("jobs must be at least 1".into());
        assert_eq!(err.to_string(), "Validation error: jobs must be at least 1");
    }

    #[test]
    fn test_from_anyhow() {
        let err: PoolError = anyhow::anyhow!("wrapped").into();
        assert!(matches!(err, PoolError::Other(_)));
        assert_eq!(err.to_string(), "wrapped");
    }
}
