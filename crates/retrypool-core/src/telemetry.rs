//! Logging initialisation.
//!
//! Progress lines from the worker pool are ordinary `tracing` events, so
//! this is the single place that decides where they end up and how they
//! are formatted.

use crate::{PoolError, PoolResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,

    /// Include the event target (module path) in each line.
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

fn default_filter() -> String {
    "info,retrypool=debug".to_string()
}

fn default_with_target() -> bool {
    false
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
            with_target: default_with_target(),
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.filter`. Fails if a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> PoolResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| PoolError::Telemetry(format!("Invalid log filter '{}': {}", config.filter, e)))?;

    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(config.with_target)
    });
    let text_layer = (!config.json).then(|| {
        tracing_subscriber::fmt::layer().with_target(config.with_target)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| PoolError::Telemetry(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.filter, "info,retrypool=debug");
        assert!(!config.json);
        assert!(!config.with_target);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: LoggingConfig = serde_json::from_str(r#"{"json": true}"#).unwrap();
        assert!(config.json);
        assert_eq!(config.filter, "info,retrypool=debug");
    }
}
