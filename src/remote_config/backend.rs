//! Remote config backends.
//!
//! # Responsibilities
//! - Fetch the current server template from wherever it is published
//! - Map transport and decode failures to `RemoteConfigError`
//!
//! # Design Decisions
//! - No retries here; the snapshot provider decides when to fetch again
//! - HTTP fetches carry their own timeout so a slow backend cannot hold a
//!   request for the whole request budget

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::config::schema::{BackendKind, RemoteConfigSettings};
use crate::remote_config::types::{RemoteConfigError, ServerTemplate};

/// Source of server templates.
#[async_trait]
pub trait RemoteConfigBackend: Send + Sync {
    async fn fetch_template(&self) -> Result<ServerTemplate, RemoteConfigError>;
}

/// Fetches a JSON server template over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTemplateBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpTemplateBackend {
    pub fn new(url: impl Into<String>, api_token: Option<&str>, timeout: Duration) -> Result<Self, RemoteConfigError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = api_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| RemoteConfigError::Misconfigured("api_token is not a valid header value".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RemoteConfigBackend for HttpTemplateBackend {
    async fn fetch_template(&self) -> Result<ServerTemplate, RemoteConfigError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteConfigError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Reads a JSON server template from a local file on every fetch.
#[derive(Debug, Clone)]
pub struct FileTemplateBackend {
    path: PathBuf,
}

impl FileTemplateBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RemoteConfigBackend for FileTemplateBackend {
    async fn fetch_template(&self) -> Result<ServerTemplate, RemoteConfigError> {
        let raw = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

/// Build the backend selected by configuration.
///
/// Returns `None` when remote config is disabled.
pub fn build_backend(
    settings: &RemoteConfigSettings,
) -> Result<Option<Arc<dyn RemoteConfigBackend>>, RemoteConfigError> {
    match settings.backend {
        BackendKind::None => Ok(None),
        BackendKind::Http => {
            let url = settings
                .url
                .as_deref()
                .ok_or_else(|| RemoteConfigError::Misconfigured("http backend requires url".into()))?;
            let backend = HttpTemplateBackend::new(
                url,
                settings.api_token.as_deref(),
                Duration::from_secs(settings.fetch_timeout_secs),
            )?;
            Ok(Some(Arc::new(backend)))
        }
        BackendKind::File => {
            let path = settings
                .path
                .as_deref()
                .ok_or_else(|| RemoteConfigError::Misconfigured("file backend requires path".into()))?;
            Ok(Some(Arc::new(FileTemplateBackend::new(path))))
        }
    }
}
