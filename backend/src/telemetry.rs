//! Tracing subscriber initialization.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` wins, otherwise the configured level for this
/// crate with HTTP and SQL noise kept at a sensible level.
pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(log_level))
}

/// Filter used when `RUST_LOG` is unset. Covers both the binary and the library.
pub fn default_filter(log_level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "account_keeper={level},account_keeper_backend={level},tower_http={level},sqlx::query=warn",
        level = log_level
    ))
}

/// Initialize the global tracing subscriber with a stdout fmt layer.
pub fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
