//! # Retrypool Config
//!
//! Configuration for the worker pool. Values are layered from TOML files,
//! environment variables and finally command-line overrides.

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
