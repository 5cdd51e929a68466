//! # retrypool
//!
//! Runs a worker pool over jobs `1..=N` and prints one line per result,
//! then one line per job that exhausted its retries. Exits 0 however many
//! jobs failed; configuration errors exit non-zero.

use clap::Parser;
use retrypool_config::ConfigLoader;
use retrypool_core::{init_logging, PoolResult};
use retrypool_jobs::{register_metrics, SimulatedProcessor, WorkerPool, WorkerPoolConfig};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

mod cli;
mod output;

use cli::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: Args) -> PoolResult<()> {
    let mut config = ConfigLoader::new(&args.config).load()?;
    config.pool = config.pool.with_overrides(&args.overrides());
    config.validate()?;

    init_logging(&config.logging)?;
    register_metrics();

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let processor = SimulatedProcessor::from(&config.pool);
    let pool = Arc::new(WorkerPool::new(
        WorkerPoolConfig::from(&config.pool),
        Arc::new(processor),
    ));

    let signal_task = {
        let pool = pool.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            pool.stop();
        })
    };

    let report = pool.run().await;
    signal_task.abort();
    let report = report?;

    for line in output::render(&report) {
        println!("{}", line);
    }

    if report.cancelled {
        warn!(unresolved = report.unresolved, "Run was interrupted before every job resolved");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, stopping workers...");
        }
        () = terminate => {
            info!("Received terminate signal, stopping workers...");
        }
    }
}
