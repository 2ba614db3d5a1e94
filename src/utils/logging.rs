//! Logging setup, rotation and retention

use std::fs;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

pub struct LoggingGuard {
    pub _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Installs the process-wide subscriber: console output plus a non-blocking
/// daily-rolling file under `log_dir`. Call once at startup and keep the
/// returned guard alive for the lifetime of the process.
pub fn setup_logging(config: &Config) -> Result<Arc<LoggingGuard>> {
    fs::create_dir_all(&config.log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(true)
                .with_level(true),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_ids(false)
                .with_level(true)
                .with_ansi(false)
                .compact(),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level.parse()?),
        )
        .try_init()?;

    Ok(Arc::new(LoggingGuard { _guard: guard }))
}

/// Deletes rotated log files older than the retention window.
///
/// Only files whose name starts with the configured log file name are
/// candidates; anything else in the directory is left alone. A file that
/// fails to delete is logged and skipped, not fatal.
pub fn clean_old_logs(config: &Config) -> Result<usize> {
    if !config.log_dir.exists() {
        return Ok(0);
    }

    let cutoff = SystemTime::now() - Duration::from_secs(config.log_retention_days * 86400);
    let mut removed = 0;

    for entry in fs::read_dir(&config.log_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(&config.log_file_name) {
            continue;
        }

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                warn!("Cannot stat log file {:?}: {}", name, e);
                continue;
            }
        };

        if modified < cutoff {
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to delete old log {:?}: {}", name, e),
            }
        }
    }

    if removed > 0 {
        info!("Log cleanup removed {} expired file(s)", removed);
    }
    Ok(removed)
}

/// Periodic retention sweep. Spawn this alongside the trading loop; it never
/// touches the logging hot path. [`crate::config::LOG_CLEANUP_INTERVAL_SECS`]
/// is the usual sweep interval.
pub async fn run_log_cleanup(config: Config, sweep_interval: Duration) {
    let mut interval = tokio::time::interval(sweep_interval);

    loop {
        interval.tick().await;
        if let Err(e) = clean_old_logs(&config) {
            warn!("Log cleanup sweep failed: {}", e);
        }
    }
}
