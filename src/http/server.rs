//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build shared application state from configuration
//! - Create the Axum Router with the page handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::SsrConfig;
use crate::http::handler::render_page;
use crate::identity::IdentityResolver;
use crate::remote_config::{build_backend, RemoteConfigError, RemoteConfigService, SnapshotProvider};
use crate::routing::{RouteError, TemplateRouter};
use crate::templates::{FsTemplateLoader, TemplateLoader};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid route table: {0}")]
    Routes(#[from] RouteError),

    #[error("remote config setup failed: {0}")]
    RemoteConfig(#[from] RemoteConfigError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<TemplateRouter>,
    pub templates: Arc<dyn TemplateLoader>,
    pub remote_config: Arc<RemoteConfigService>,
    pub identity: Arc<IdentityResolver>,
}

impl AppState {
    /// Assemble state from configuration.
    pub fn from_config(config: &SsrConfig) -> Result<Self, StartupError> {
        let router = TemplateRouter::with_aliases(&config.templates.aliases)?;

        let settings = &config.remote_config;
        let provider = build_backend(settings)?
            .map(|backend| SnapshotProvider::new(backend, Duration::from_secs(settings.ttl_secs)));
        let remote_config =
            RemoteConfigService::new(provider, Duration::from_secs(settings.error_log_interval_secs));

        Ok(Self {
            router: Arc::new(router),
            templates: Arc::new(FsTemplateLoader::new(&config.templates.root)),
            remote_config: Arc::new(remote_config),
            identity: Arc::new(IdentityResolver::new(&config.identity)),
        })
    }
}

/// HTTP server for the SSR pages.
pub struct HttpServer {
    router: Router,
    config: SsrConfig,
}

impl HttpServer {
    /// Create a server with state built from `config`.
    pub fn new(config: SsrConfig) -> Result<Self, StartupError> {
        let state = AppState::from_config(&config)?;
        Ok(Self::with_state(config, state))
    }

    /// Create a server around prepared state.
    pub fn with_state(config: SsrConfig, state: AppState) -> Self {
        tracing::info!(
            routes = state.router.len(),
            remote_config = state.remote_config.is_enabled(),
            "Page router ready"
        );
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &SsrConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);
        Router::new()
            .route("/", any(render_page))
            .route("/{*path}", any(render_page))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            templates = %self.config.templates.root,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
