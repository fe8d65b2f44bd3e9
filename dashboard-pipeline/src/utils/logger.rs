//! Logging Infrastructure
//!
//! Structured logging setup for the pipeline binary.

use std::path::Path;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::EnvFilter;

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None, None);
}

/// Initialize the logger with optional JSON formatting and file output
///
/// `RUST_LOG` wins over `log_level` when set. Calling this twice keeps the
/// first subscriber.
pub fn init_logger_with_file(log_level: Option<&str>, json: Option<bool>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let result = match (log_dir.and_then(file_appender), json.unwrap_or(false)) {
        (Some(appender), true) => builder.json().with_writer(appender).try_init(),
        (Some(appender), false) => builder.with_ansi(false).with_writer(appender).try_init(),
        (None, true) => builder.json().try_init(),
        (None, false) => builder.try_init(),
    };

    if let Err(e) = result {
        tracing::debug!("Logger already initialised: {}", e);
    }
}

/// Daily rolling appender, creating the directory if needed
fn file_appender(dir: &str) -> Option<RollingFileAppender> {
    let log_path = Path::new(dir);
    if let Err(e) = std::fs::create_dir_all(log_path) {
        eprintln!("Cannot create log directory {}: {}", dir, e);
        return None;
    }
    Some(tracing_appender::rolling::daily(log_path, "dashboard-pipeline"))
}
