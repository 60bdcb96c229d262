//! Logging Infrastructure
//!
//! Structured logging setup for applications embedding the client.

use tracing_subscriber::EnvFilter;

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_level(None, false);
}

/// Initialize the logger with an explicit level and output format.
///
/// `RUST_LOG` takes precedence over `log_level` when set. Calling this
/// twice is harmless; the second call leaves the first subscriber in place.
pub fn init_logger_with_level(log_level: Option<&str>, json: bool) {
    let filter = build_filter(log_level);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_err() {
        tracing::debug!("Global subscriber already set");
    }
}

fn build_filter(log_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")))
}
