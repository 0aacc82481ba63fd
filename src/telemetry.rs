//! Logging setup for the binary
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a stderr `fmt` subscriber filtered by `filter`
///
/// Falls back to `prompt_builder=info` when `filter` does not parse. Calling
/// it twice is an error reported by the subscriber registry.
pub fn init(filter: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_new(filter)
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
