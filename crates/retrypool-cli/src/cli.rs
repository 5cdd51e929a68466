//! Command-line arguments.

use clap::Parser;
use retrypool_config::PoolOverrides;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "retrypool")]
#[command(version)]
#[command(about = "Run a pool of workers over numbered jobs with bounded retries")]
pub struct Args {
    /// Number of worker tasks [default: 3]
    #[arg(long)]
    pub workers: Option<usize>,

    /// Total number of jobs to process [default: 10]
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Maximum failed attempts per job before it is reported as an error [default: 3]
    #[arg(long)]
    pub retries: Option<u32>,

    /// Simulated processing time per attempt, in milliseconds [default: 1000]
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Probability that an attempt fails, between 0.0 and 1.0 [default: 0.3]
    #[arg(long)]
    pub failure_rate: Option<f64>,

    /// Directory holding default.toml / {environment}.toml / local.toml
    #[arg(long, default_value = "./config")]
    pub config: PathBuf,
}

impl Args {
    /// Flags that override loaded configuration values.
    pub fn overrides(&self) -> PoolOverrides {
        PoolOverrides {
            workers: self.workers,
            jobs: self.jobs,
            max_retries: self.retries,
            processing_delay_ms: self.delay_ms,
            failure_rate: self.failure_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrypool_config::PoolConfig;

    #[test]
    fn test_no_flags_keeps_config_values() {
        let args = Args::try_parse_from(["retrypool"]).unwrap();
        let config = PoolConfig::default().with_overrides(&args.overrides());
        assert_eq!(config, PoolConfig::default());
        assert_eq!(args.config, PathBuf::from("./config"));
    }

    #[test]
    fn test_flags_override() {
        let args = Args::try_parse_from([
            "retrypool",
            "--workers",
            "5",
            "--jobs",
            "20",
            "--retries",
            "2",
            "--delay-ms",
            "0",
            "--failure-rate",
            "1.0",
        ])
        .unwrap();

        let config = PoolConfig::default().with_overrides(&args.overrides());
        assert_eq!(config.workers, 5);
        assert_eq!(config.jobs, 20);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.processing_delay_ms, 0);
        assert!((config.failure_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_integer_is_rejected() {
        assert!(Args::try_parse_from(["retrypool", "--workers", "three"]).is_err());
        assert!(Args::try_parse_from(["retrypool", "--jobs", "-1"]).is_err());
    }
}
