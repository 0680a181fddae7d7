//! Structured logging setup

use std::env;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured level; `debug` forces the
/// `debug` level when `RUST_LOG` is unset. Calling this more than once is
/// harmless: later calls keep the first subscriber.
pub fn init_logging(config: &LoggingConfig, debug: bool) {
    let level = if debug {
        "debug".to_string()
    } else {
        config.level.trim().to_lowercase()
    };

    let env_filter = env::var("RUST_LOG").unwrap_or(level);
    let result = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(config.with_target)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();

    if result.is_err() {
        debug!("Logging already initialized");
    }
}
