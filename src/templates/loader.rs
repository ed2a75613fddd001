//! Reading template content from the template root.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::templates::{TemplateError, TemplateId};

/// Source of raw template HTML.
#[async_trait]
pub trait TemplateLoader: Send + Sync {
    /// Load the HTML for `id`. Missing or unreadable templates are `NotFound`.
    async fn load(&self, id: &TemplateId) -> Result<String, TemplateError>;
}

/// Loads templates from a directory tree on disk.
#[derive(Debug, Clone)]
pub struct FsTemplateLoader {
    root: PathBuf,
}

impl FsTemplateLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl TemplateLoader for FsTemplateLoader {
    async fn load(&self, id: &TemplateId) -> Result<String, TemplateError> {
        let path = self.root.join(id.as_str());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| TemplateError::NotFound {
                id: id.to_string(),
                source,
            })
    }
}
