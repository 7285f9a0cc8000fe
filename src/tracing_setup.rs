//! Logging setup
//!
//! Console logging through `tracing_subscriber::fmt`, filtered by `RUST_LOG`
//! (default: `info`). Store internals log at `debug`, so
//! `RUST_LOG=sign_bridge=debug` shows every match and export.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Build the log filter from `RUST_LOG`
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global subscriber
///
/// Fails if a subscriber is already installed (e.g. a second call).
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()?;

    tracing::debug!("Tracing initialized");
    Ok(())
}
