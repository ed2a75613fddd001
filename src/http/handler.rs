//! Page handler.
//!
//! # States
//! ```text
//! MethodCheck → RouteResolve → TemplateLoad → ConfigEvaluate → Compose → Respond
//!     │              │              │              │
//!     405            404            404       (degrade: no config)
//! ```
//!
//! Only the first three states can end a request early. Remote config
//! failures never do.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::http::compose::{apply_page_headers, compose};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::remote_config::EvaluationContext;
use crate::routing::matcher::normalize_route;

/// Methods the page endpoint serves.
pub const ALLOWED_METHODS: &str = "GET, HEAD";

/// Serve one page request.
pub async fn render_page(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    request_headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();

    let response = handle(&state, &method, uri.path(), &request_headers).await;

    metrics::record_request(&method, response.status().as_u16(), start_time);
    response
}

async fn handle(state: &AppState, method: &Method, path: &str, request_headers: &HeaderMap) -> Response {
    // MethodCheck
    if method != Method::GET && method != Method::HEAD {
        tracing::debug!(method = %method, path = %path, "Method not allowed");
        return method_not_allowed();
    }

    // RouteResolve
    let Some(template_id) = state.router.resolve(path) else {
        tracing::debug!(path = %path, "No template for route");
        return not_found();
    };

    // TemplateLoad
    let html = match state.templates.load(&template_id).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(path = %path, template = %template_id, error = %e, "Template unavailable");
            return not_found();
        }
    };

    // ConfigEvaluate
    let mut headers = HeaderMap::new();
    let randomization_id = state.identity.ensure_identity(request_headers, &mut headers);
    let ctx = EvaluationContext {
        randomization_id: &randomization_id,
        path: normalize_route(path),
    };
    let config = state.remote_config.payload_for(&ctx).await;

    // Compose
    let body = compose(html, config.as_ref());
    apply_page_headers(&mut headers, body.len());
    tracing::debug!(
        path = %path,
        template = %template_id,
        injected = config.is_some(),
        bytes = body.len(),
        "Rendered page"
    );

    // Respond
    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(body)
    };
    (StatusCode::OK, headers, body).into_response()
}

fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS))],
        "Method Not Allowed",
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
