//! Subscriber setup for binaries and tests that host receivers.
//!
//! The library itself only emits through `tracing`; nothing here runs unless called.
//! Diagnostics for refused events are `warn` events on the `kanmon` target.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter};

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a human-readable subscriber. `RUST_LOG` overrides the default `info` level.
///
/// Panics if a global subscriber is already set; use [`try_init`] where that can happen.
pub fn init() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true).with_thread_names(true))
        .init();
}

/// Like [`init`] but emits one JSON object per line.
pub fn init_json() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_target(true).with_thread_names(true))
        .init();
}

pub fn try_init() -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true).with_thread_names(true))
        .try_init()
}

pub fn try_init_json() -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_target(true).with_thread_names(true))
        .try_init()
}
