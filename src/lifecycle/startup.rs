//! Startup orchestration.
//!
//! Order: metrics exporter, server state (routes, remote config backend),
//! listener bind, signal listener, serve. Any error before serving is fatal.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::config::SsrConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Start the service and block until it has shut down.
pub async fn run(config: SsrConfig) -> anyhow::Result<()> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .context("invalid metrics address")?;
        metrics::init_metrics(addr);
    }

    let bind_address = config.listener.bind_address.clone();
    let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);
    let server = HttpServer::new(config).context("failed to initialize server")?;

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));
    let mut stop = shutdown.subscribe();

    tokio::select! {
        result = &mut server_task => {
            result.context("server task panicked")??;
            return Ok(());
        }
        _ = stop.recv() => {}
    }

    match tokio::time::timeout(grace, &mut server_task).await {
        Ok(result) => result.context("server task panicked")??,
        Err(_) => {
            tracing::warn!(grace_secs = grace.as_secs(), "Shutdown grace period elapsed, aborting");
            server_task.abort();
        }
    }
    Ok(())
}
