//! Quantura SSR edge service.
//!
//! Serves the site's HTML templates with per-visitor remote config injected.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                   SSR EDGE SERVICE                    │
//!   GET/HEAD /path     │  ┌─────────┐   ┌──────────┐   ┌─────────────────┐    │
//!   ───────────────────┼─▶│  http   │──▶│ routing  │──▶│   templates     │◀───┼── template root
//!                      │  │ handler │   │ resolve  │   │   loader        │    │   (HTML files)
//!                      │  └────┬────┘   └──────────┘   └─────────────────┘    │
//!                      │       │                                              │
//!                      │       ▼                                              │
//!                      │  ┌──────────┐   ┌────────────────────────────────┐   │
//!                      │  │ identity │──▶│ remote_config                   │◀──┼── config backend
//!                      │  │ qs_rcid  │   │ snapshot cache → evaluate       │   │   (HTTP / file)
//!                      │  └──────────┘   └───────────────┬────────────────┘   │
//!                      │                                 ▼                    │
//!   200 / 404 / 405    │                          ┌─────────────┐             │
//!   ◀──────────────────┼──────────────────────────│  compose    │             │
//!                      │                          └─────────────┘             │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use quantura_ssr::config::{apply_overrides, load_or_default, ConfigOverrides};
use quantura_ssr::lifecycle::startup;
use quantura_ssr::observability::logging;

#[derive(Parser)]
#[command(name = "quantura-ssr")]
#[command(about = "Server-side rendering edge for the Quantura site", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "QUANTURA_SSR_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the template root directory.
    #[arg(short, long)]
    templates: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = apply_overrides(
        load_or_default(cli.config.as_deref())?,
        ConfigOverrides {
            bind_address: cli.bind,
            templates_root: cli.templates,
        },
    )?;

    logging::init_logging(&config.observability);

    tracing::info!("quantura-ssr v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        templates = %config.templates.root,
        remote_config = ?config.remote_config.backend,
        ttl_secs = config.remote_config.ttl_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
