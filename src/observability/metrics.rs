//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ssr_requests_total` (counter): requests by method, status
//!   (method is `GET`, `HEAD` or `other`)
//! - `ssr_request_duration_seconds` (histogram): handler latency
//! - `ssr_config_fetch_total` (counter): snapshot fetches by outcome
//! - `ssr_config_cache_total` (counter): snapshot cache hits and misses
//! - `ssr_config_degraded_total` (counter): responses served without config
//! - `ssr_identity_issued_total` (counter): new randomization ids
//!
//! Calls are no-ops until a recorder is installed, so tests and binaries
//! without the exporter pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Label value for a request method. Clients choose the method, so anything
/// the page endpoint does not serve shares one label.
pub fn method_label(method: &Method) -> &'static str {
    if method == Method::GET {
        "GET"
    } else if method == Method::HEAD {
        "HEAD"
    } else {
        "other"
    }
}

pub fn record_request(method: &Method, status: u16, start: Instant) {
    let method = method_label(method);
    metrics::counter!(
        "ssr_requests_total",
        "method" => method,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("ssr_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_config_fetch(success: bool) {
    let outcome = if success { "success" } else { "error" };
    metrics::counter!("ssr_config_fetch_total", "outcome" => outcome).increment(1);
}

pub fn record_config_cache(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("ssr_config_cache_total", "result" => result).increment(1);
}

pub fn record_config_degraded() {
    metrics::counter!("ssr_config_degraded_total").increment(1);
}

pub fn record_identity_issued() {
    metrics::counter!("ssr_identity_issued_total").increment(1);
}
