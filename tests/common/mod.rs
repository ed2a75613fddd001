//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use quantura_ssr::config::SsrConfig;
use quantura_ssr::http::{AppState, HttpServer};
use quantura_ssr::identity::IdentityResolver;
use quantura_ssr::remote_config::types::{Parameter, ParameterValue};
use quantura_ssr::remote_config::{
    RemoteConfigBackend, RemoteConfigError, RemoteConfigService, ServerTemplate, SnapshotProvider,
};
use quantura_ssr::routing::TemplateRouter;
use quantura_ssr::templates::{FsTemplateLoader, TemplateError, TemplateId, TemplateLoader};

pub const PAGE: &str = "<!doctype html><html><head><title>Quantura</title></head><body>page</body></html>";

/// Template tree with every built-in page except `pricing.html`.
pub fn template_tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for name in ["index.html", "contact.html", "admin.html", "screener.html", "dashboard.html", "forecasting.html"] {
        write(root, name, &PAGE.replace("page", name));
    }
    write(root, "blog/index.html", "<html><head></head><body>blog index</body></html>");
    write(root, "blog/posts/hello-world.html", "<html><head></head><body>hello world</body></html>");
    dir
}

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Server template with a single unconditional parameter.
pub fn simple_template(key: &str, value: &str) -> ServerTemplate {
    let mut template = ServerTemplate {
        version: "1".into(),
        ..Default::default()
    };
    template.parameters.insert(
        key.into(),
        Parameter {
            default_value: Some(ParameterValue::Explicit { value: value.into() }),
            conditional_values: Default::default(),
        },
    );
    template
}

/// Backend serving a fixed template.
pub struct StaticBackend {
    pub template: ServerTemplate,
    pub calls: AtomicU32,
}

impl StaticBackend {
    pub fn new(template: ServerTemplate) -> Arc<Self> {
        Arc::new(Self { template, calls: AtomicU32::new(0) })
    }
}

#[async_trait]
impl RemoteConfigBackend for StaticBackend {
    async fn fetch_template(&self) -> Result<ServerTemplate, RemoteConfigError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.template.clone())
    }
}

/// Backend that fails on every call.
#[derive(Default)]
pub struct FailingBackend {
    pub calls: AtomicU32,
}

#[async_trait]
impl RemoteConfigBackend for FailingBackend {
    async fn fetch_template(&self) -> Result<ServerTemplate, RemoteConfigError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RemoteConfigError::Status(503))
    }
}

/// Loader that records every identifier it is asked for.
pub struct RecordingLoader {
    inner: FsTemplateLoader,
    pub loads: Mutex<Vec<String>>,
}

impl RecordingLoader {
    pub fn new(root: &Path) -> Arc<Self> {
        Arc::new(Self {
            inner: FsTemplateLoader::new(root),
            loads: Mutex::new(Vec::new()),
        })
    }

    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().unwrap().clone()
    }
}

#[async_trait]
impl TemplateLoader for RecordingLoader {
    async fn load(&self, id: &TemplateId) -> Result<String, TemplateError> {
        self.loads.lock().unwrap().push(id.to_string());
        self.inner.load(id).await
    }
}

/// Everything a test needs to poke at a running app.
pub struct TestApp {
    pub router: Router,
    pub loader: Arc<RecordingLoader>,
    pub remote_config: Arc<RemoteConfigService>,
    pub templates: TempDir,
}

/// Build the layered router over a fresh template tree.
pub fn test_app(backend: Option<Arc<dyn RemoteConfigBackend>>) -> TestApp {
    let templates = template_tree();
    let loader = RecordingLoader::new(templates.path());
    let provider = backend.map(|b| SnapshotProvider::new(b, Duration::from_secs(300)));
    let remote_config = Arc::new(RemoteConfigService::new(provider, Duration::from_secs(60)));

    let state = AppState {
        router: Arc::new(TemplateRouter::new()),
        templates: loader.clone(),
        remote_config: remote_config.clone(),
        identity: Arc::new(IdentityResolver::default()),
    };
    let server = HttpServer::with_state(SsrConfig::default(), state);

    TestApp {
        router: server.router(),
        loader,
        remote_config,
        templates,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Send one request through the router in-process.
pub async fn send(router: &Router, method: Method, uri: &str, cookie: Option<&str>) -> TestResponse {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    send_request(router, request.body(Body::empty()).unwrap()).await
}

/// Send a prebuilt request through the router in-process.
pub async fn send_request(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn get(router: &Router, uri: &str, cookie: Option<&str>) -> TestResponse {
    send(router, Method::GET, uri, cookie).await
}
