//! Result type aliases for retrypool.

use crate::PoolError;

/// A specialized `Result` type for retrypool operations.
pub type PoolResult<T> = Result<T, PoolError>;
