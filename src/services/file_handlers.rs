use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    domain::{
        errors::{AttachmentResult, UploadError},
        models::{UploadFile, UploadResult},
        value_objects::AttachmentCategory,
    },
    ports::services::FileHandler,
};

/// Registry of the configured storage backends, dispatching by category
#[derive(Clone, Default)]
pub struct FileHandlers {
    handlers: HashMap<AttachmentCategory, Arc<dyn FileHandler>>,
}

impl FileHandlers {
    /// Later handlers replace earlier ones serving the same category
    pub fn new(handlers: impl IntoIterator<Item = Arc<dyn FileHandler>>) -> Self {
        let mut registry = Self::default();
        for handler in handlers {
            registry.register(handler);
        }
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn FileHandler>) {
        let category = handler.category();
        if self.handlers.insert(category, handler).is_some() {
            tracing::warn!(%category, "replacing file handler");
        }
    }

    pub fn get(&self, category: AttachmentCategory) -> AttachmentResult<&Arc<dyn FileHandler>> {
        self.handlers.get(&category).ok_or_else(|| {
            UploadError::invalid_input(format!(
                "no file handler configured for attachment category '{}'",
                category
            ))
        })
    }

    pub async fn upload(
        &self,
        category: AttachmentCategory,
        file: UploadFile,
    ) -> AttachmentResult<UploadResult> {
        self.get(category)?.upload(file).await
    }

    pub async fn delete(&self, category: AttachmentCategory, key: &str) -> AttachmentResult<()> {
        self.get(category)?.delete(key).await
    }

    /// Configured categories, in a stable order
    pub fn categories(&self) -> Vec<AttachmentCategory> {
        AttachmentCategory::ALL
            .into_iter()
            .filter(|c| self.handlers.contains_key(c))
            .collect()
    }
}
