//! Template identifiers and loading.
//!
//! # Data Flow
//! ```text
//! TemplateId (from routing)
//!     → loader.rs (read <root>/<id> from disk)
//!     → HTML text, or TemplateError::NotFound
//! ```
//!
//! # Design Decisions
//! - Identifiers are validated on construction; a TemplateId can never
//!   point outside the template root
//! - Content is read fresh on every request, never cached

pub mod loader;

use std::fmt;
use std::path::{Component, Path};

use thiserror::Error;

pub use loader::{FsTemplateLoader, TemplateLoader};

/// Errors raised while resolving or loading a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The identifier would escape the template root or is malformed.
    #[error("invalid template identifier: {0:?}")]
    InvalidId(String),

    /// The template file is missing or unreadable.
    #[error("template {id} not found: {source}")]
    NotFound {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

/// Relative path of an HTML template under the template root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(String);

impl TemplateId {
    /// Build an identifier, rejecting anything that could leave the root.
    pub fn new(id: impl Into<String>) -> Result<Self, TemplateError> {
        let id = id.into();
        if id.is_empty() || id.contains('\\') || id.contains('\0') {
            return Err(TemplateError::InvalidId(id));
        }
        let all_normal = Path::new(&id)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !all_normal {
            return Err(TemplateError::InvalidId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
