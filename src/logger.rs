//! Debug logging support for catpatch
//!
//! When debug mode is enabled via config, patch runs, backups, and rollbacks
//! are logged to ~/.catpatch/catpatch.log.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

const LOG_FILE_NAME: &str = "catpatch.log";

/// An active debug log
///
/// Keep it alive for the whole run; dropping it flushes pending records.
pub struct DebugLog {
    pub path: PathBuf,
    _guard: WorkerGuard,
}

/// Initialize the debug logging system
///
/// If `debug_enabled` is true, sets up file logging in `log_dir`.
/// Returns the active log, or None if logging is not enabled.
pub fn init_debug_logging(debug_enabled: bool, log_dir: &Path) -> Result<Option<DebugLog>> {
    if !debug_enabled {
        return Ok(None);
    }

    if let Err(e) = fs::create_dir_all(log_dir) {
        // Logging must never block patching
        eprintln!(
            "Warning: Could not create log directory {}: {}",
            log_dir.display(),
            e
        );
        return Ok(None);
    }

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catpatch=info"));

    let subscriber = registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    Ok(Some(DebugLog {
        path: log_path(log_dir),
        _guard: guard,
    }))
}

/// Path of the log file inside `log_dir`
pub fn log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}
