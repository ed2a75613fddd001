//! Structured logging setup.
//!
//! `RUST_LOG` wins over the configured level; JSON lines for production,
//! human-readable output otherwise.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

/// Filter used when neither `RUST_LOG` nor the config yields a valid one.
pub const DEFAULT_FILTER: &str = "quantura_ssr=info,tower_http=info";

/// Build the env filter for the configured log level.
pub fn build_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("quantura_ssr={0},tower_http={0}", config.log_level)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(config: &ObservabilityConfig) {
    let registry = tracing_subscriber::registry().with(build_filter(config));
    if config.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
