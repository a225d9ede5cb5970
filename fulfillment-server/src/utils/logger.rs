//! Logging Infrastructure
//!
//! Console logging filtered by `RUST_LOG` (falling back to the configured
//! level), plus a daily rolling file when the log directory exists.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber
///
/// Returns `false` when a subscriber was already installed (tests, embedders).
pub fn init_logger(level: &str, log_dir: Option<&str>) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists() {
            let file_appender = tracing_appender::rolling::daily(log_path, "fulfillment-server");
            return subscriber
                .with_ansi(false)
                .with_writer(file_appender)
                .try_init()
                .is_ok();
        }
    }

    subscriber.try_init().is_ok()
}
