//! Configuration loader with layered sources.

use crate::AppConfig;
use config::{Config, ConfigError, Environment, File};
use retrypool_core::{PoolError, PoolResult};
use std::path::PathBuf;
use tracing::{debug, info};

/// Environment variable selecting the environment-specific config file.
pub const ENVIRONMENT_VAR: &str = "RETRYPOOL_ENVIRONMENT";

/// Prefix for environment variable overrides (`RETRYPOOL__POOL__WORKERS=8`).
pub const ENV_PREFIX: &str = "RETRYPOOL";

/// Loads [`AppConfig`] from a configuration directory.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    environment: String,
    use_env: bool,
}

impl ConfigLoader {
    /// Creates a loader for the given directory.
    ///
    /// Sources are applied in order, later ones overriding earlier ones:
    /// 1. `{dir}/default.toml`
    /// 2. `{dir}/{environment}.toml`
    /// 3. `{dir}/local.toml`
    /// 4. Environment variables with the `RETRYPOOL__` prefix
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {}", e);
        }

        let environment =
            std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string());

        Self {
            config_dir: config_dir.into(),
            environment,
            use_env: true,
        }
    }

    /// Loader for the default location (`./config`).
    pub fn from_default_location() -> Self {
        Self::new("./config")
    }

    /// Override the environment name used to pick `{environment}.toml`.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Skip the environment variable layer.
    #[must_use]
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Load and deserialize the configuration.
    ///
    /// Missing files are skipped. Values are not validated here because
    /// command-line overrides are applied afterwards.
    pub fn load(&self) -> PoolResult<AppConfig> {
        info!(
            dir = %self.config_dir.display(),
            environment = %self.environment,
            "Loading configuration"
        );

        let mut builder = Config::builder();

        for name in ["default", self.environment.as_str(), "local"] {
            let path = self.config_dir.join(format!("{}.toml", name));
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        if self.use_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config = builder.build().map_err(config_error_to_pool_error)?;

        config
            .try_deserialize::<AppConfig>()
            .map_err(config_error_to_pool_error)
    }
}

fn config_error_to_pool_error(err: ConfigError) -> PoolError {
    PoolError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_empty_dir_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new(dir.path()).without_env().load().unwrap();
        assert_eq!(config.pool, crate::PoolConfig::default());
    }

    #[test]
    fn test_default_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[pool]\nworkers = 7\nmax_retries = 5\n",
        )
        .unwrap();

        let config = ConfigLoader::new(dir.path()).without_env().load().unwrap();
        assert_eq!(config.pool.workers, 7);
        assert_eq!(config.pool.max_retries, 5);
        assert_eq!(config.pool.jobs, 10);
    }

    #[test]
    fn test_environment_file_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[pool]\njobs = 20\n").unwrap();
        fs::write(
            dir.path().join("test.toml"),
            "[pool]\njobs = 40\nfailure_rate = 0.0\n\n[logging]\njson = true\n",
        )
        .unwrap();

        let config = ConfigLoader::new(dir.path())
            .with_environment("test")
            .without_env()
            .load()
            .unwrap();
        assert_eq!(config.pool.jobs, 40);
        assert!(config.pool.failure_rate.abs() < f64::EPSILON);
        assert!(config.logging.json);
    }

    #[test]
    fn test_malformed_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[pool]\nworkers = \"many\"\n").unwrap();

        let err = ConfigLoader::new(dir.path()).without_env().load().unwrap_err();
        assert!(matches!(err, PoolError::Configuration(_)));
    }
}
