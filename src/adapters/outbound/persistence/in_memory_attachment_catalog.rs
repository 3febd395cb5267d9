use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    domain::{errors::TransportResult, value_objects::AttachmentCategory},
    ports::repositories::AttachmentCatalog,
};

/// In-memory implementation of AttachmentCatalog for testing and development
#[derive(Clone, Default)]
pub struct InMemoryAttachmentCatalog {
    entries: Arc<RwLock<HashSet<(AttachmentCategory, String)>>>,
}

impl InMemoryAttachmentCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttachmentCatalog for InMemoryAttachmentCatalog {
    async fn exists_by_key_and_category(
        &self,
        key: &str,
        category: AttachmentCategory,
    ) -> TransportResult<bool> {
        Ok(self
            .entries
            .read()
            .await
            .contains(&(category, key.to_string())))
    }

    async fn record(&self, key: &str, category: AttachmentCategory) -> TransportResult<()> {
        self.entries
            .write()
            .await
            .insert((category, key.to_string()));
        Ok(())
    }

    async fn remove(&self, key: &str, category: AttachmentCategory) -> TransportResult<()> {
        self.entries
            .write()
            .await
            .remove(&(category, key.to_string()));
        Ok(())
    }
}
