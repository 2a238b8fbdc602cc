use std::path::Path;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod core;
mod config;
mod error;

use cli::Cli;
use crate::core::Engine;

const LOG_FILE: &str = "chainaudit.log";

/// Daily-rotated log file writer; lines are flushed when the guard drops
fn log_file_writer(log_dir: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE);
    Ok(tracing_appender::non_blocking(appender))
}

fn init_tracing(verbose: bool, log_dir: &Path) -> Result<WorkerGuard> {
    // RUST_LOG overrides the default level
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let (file_writer, guard) = log_file_writer(log_dir)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_tracing(cli.verbose, &cli.log_dir)?;

    info!("Starting chainaudit v{}", env!("CARGO_PKG_VERSION"));

    let engine = Engine::new(cli.config.as_deref()).await?;

    if let Err(e) = cli.execute(engine).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_file_receives_events() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let (writer, guard) = log_file_writer(&log_dir).unwrap();
        let subscriber = fmt().with_ansi(false).with_writer(writer).finish();
        tracing::subscriber::with_default(subscriber, || {
            info!("chunk 3/7 complete");
        });
        drop(guard);

        let logs: Vec<_> = std::fs::read_dir(&log_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].file_name().unwrap().to_string_lossy().starts_with(LOG_FILE));
        let content = std::fs::read_to_string(&logs[0]).unwrap();
        assert!(content.contains("chunk 3/7 complete"));
    }
}
