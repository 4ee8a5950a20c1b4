//! Logging setup
//!
//! Installs a `tracing-subscriber` formatter. `RUST_LOG` wins over the
//! configured level.

use crate::config::models::logging::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Build the filter used by [`init_logging`]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber
///
/// Returns `false` when a subscriber was already installed, which happens in
/// tests and when the binary is embedded.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(false)
        .with_thread_ids(false);

    let result = if config.json {
        builder.json().with_current_span(false).try_init()
    } else {
        builder.try_init()
    };
    result.is_ok()
}
