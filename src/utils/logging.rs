//! Tracing subscriber setup
//!
//! The library only emits `tracing` events; hosts that want them printed call
//! [`init_tracing`] once with the `[logging]` section of their config.

use crate::utils::toml_config::LoggingConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global subscriber. `RUST_LOG` overrides the configured level.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("themis={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };

    result.is_ok()
}
