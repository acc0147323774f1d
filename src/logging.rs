/*!
 * Logging setup for the binary
 *
 * Errors are appended to a plain-text log file. Everything at the
 * `EnvFilter` level goes to stderr, leaving stdout for the run summary or
 * the JSON report.
 */

use std::fs;
use std::io::IsTerminal;
use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes logging: stderr console output plus an error-only log file.
///
/// The returned guard flushes the file writer when dropped, so the caller
/// keeps it alive for the whole run.
pub fn init_logging(log_dir: &Path, file_name: &str) -> std::io::Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;

    // Appends to a single file, no rotation
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(non_blocking_writer)
        .with_filter(LevelFilter::ERROR);

    let console_layer = fmt::layer()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("prc_op=info")),
        );

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();

    Ok(guard)
}
