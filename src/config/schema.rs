//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the SSR service.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the SSR edge service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SsrConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Template tree location and extra route aliases.
    pub templates: TemplateConfig,

    /// Remote configuration backend and cache settings.
    pub remote_config: RemoteConfigSettings,

    /// Randomization cookie settings.
    pub identity: IdentityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Template tree configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory holding the HTML templates.
    pub root: String,

    /// Additional route -> template identifier aliases, merged into the
    /// built-in table at startup.
    pub aliases: BTreeMap<String, String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            root: "templates".to_string(),
            aliases: BTreeMap::new(),
        }
    }
}

/// Where server templates are fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// No remote config; pages are served without injection.
    None,
    /// JSON server template served over HTTP(S).
    Http,
    /// JSON server template read from a local file.
    File,
}

/// Remote configuration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfigSettings {
    /// Backend kind.
    pub backend: BackendKind,

    /// Template URL (http backend).
    pub url: Option<String>,

    /// Bearer token sent with the template request (http backend).
    pub api_token: Option<String>,

    /// Template path (file backend).
    pub path: Option<String>,

    /// Snapshot time-to-live in seconds.
    pub ttl_secs: u64,

    /// Fetch timeout in seconds (http backend).
    pub fetch_timeout_secs: u64,

    /// Minimum interval between two config failure log lines.
    pub error_log_interval_secs: u64,
}

impl Default for RemoteConfigSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::None,
            url: None,
            api_token: None,
            path: None,
            ttl_secs: 300,
            fetch_timeout_secs: 5,
            error_log_interval_secs: 60,
        }
    }
}

/// Randomization cookie settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Cookie name carrying the randomization id.
    pub cookie_name: String,

    /// Cookie max-age in seconds (default: 400 days).
    pub max_age_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            cookie_name: "qs_rcid".to_string(),
            max_age_secs: 34_560_000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Grace period for in-flight requests on shutdown, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_grace_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
