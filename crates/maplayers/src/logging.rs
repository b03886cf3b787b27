#![forbid(unsafe_code)]

//! Log output for hosts without their own tracing subscriber.
//!
//! The filter is read from `MAPLAYERS_LOG` using `EnvFilter` directive syntax
//! (`MAPLAYERS_LOG=maplayers_runtime=debug`), defaulting to `info`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "MAPLAYERS_LOG";

/// Filter from `MAPLAYERS_LOG`, or `info` when unset or invalid.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Registry with [`env_filter`] and a fmt layer, not yet installed.
#[must_use]
pub fn subscriber() -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_target(true))
}

/// Install [`subscriber`] as the global default.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    subscriber().try_init()
}
