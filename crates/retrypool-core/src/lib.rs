//! # Retrypool Core
//!
//! Error types, result aliases and logging setup shared by every
//! retrypool crate.

pub mod error;
pub mod result;
pub mod telemetry;

pub use error::*;
pub use result::*;
pub use telemetry::{init_logging, LoggingConfig};
