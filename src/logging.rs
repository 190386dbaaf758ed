//! Tracing subscriber setup for the host binary.
//!
//! The library only emits events; installing a subscriber is left to the
//! binary. `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::EnvFilter;

use crate::domain::engine_config::DEFAULT_LOG_LEVEL;

pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
