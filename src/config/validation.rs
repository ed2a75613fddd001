//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (TTL > 0, timeouts > 0, addresses parse)
//! - Check that the selected remote config backend is fully specified
//! - Check configured route aliases
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SsrConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{BackendKind, SsrConfig};
use crate::routing::router::check_alias_route;
use crate::templates::TemplateId;

/// A single semantic problem, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SsrConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a socket address", config.listener.bind_address),
        ));
    }

    if config.templates.root.trim().is_empty() {
        errors.push(ValidationError::new("templates.root", "must not be empty"));
    }
    for (route, id) in &config.templates.aliases {
        if let Err(e) = check_alias_route(route) {
            errors.push(ValidationError::new(format!("templates.aliases.{route}"), e.to_string()));
        }
        if let Err(e) = TemplateId::new(id.as_str()) {
            errors.push(ValidationError::new(format!("templates.aliases.{route}"), e.to_string()));
        }
    }

    let rc = &config.remote_config;
    match rc.backend {
        BackendKind::None => {}
        BackendKind::Http => match rc.url.as_deref() {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {}
            Some(url) => errors.push(ValidationError::new(
                "remote_config.url",
                format!("{url:?} is not an http(s) URL"),
            )),
            None => errors.push(ValidationError::new("remote_config.url", "required for http backend")),
        },
        BackendKind::File => {
            if rc.path.as_deref().map_or(true, |p| p.trim().is_empty()) {
                errors.push(ValidationError::new("remote_config.path", "required for file backend"));
            }
        }
    }
    if rc.ttl_secs == 0 {
        errors.push(ValidationError::new("remote_config.ttl_secs", "must be greater than 0"));
    }
    if rc.backend == BackendKind::Http && rc.fetch_timeout_secs == 0 {
        errors.push(ValidationError::new("remote_config.fetch_timeout_secs", "must be greater than 0"));
    }

    let cookie = &config.identity.cookie_name;
    if cookie.is_empty() || !cookie.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        errors.push(ValidationError::new(
            "identity.cookie_name",
            "must be non-empty and contain only ASCII letters, digits, '_' or '-'",
        ));
    }
    if config.identity.max_age_secs == 0 {
        errors.push(ValidationError::new("identity.max_age_secs", "must be greater than 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("{:?} is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
