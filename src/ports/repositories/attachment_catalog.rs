use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{
    errors::TransportResult, models::ExistencePredicate, value_objects::AttachmentCategory,
};

/// Repository of stored attachments.
///
/// The upload path only asks whether a key is taken; recording and removal
/// keep the catalog in step with the store.
#[async_trait]
pub trait AttachmentCatalog: Send + Sync + 'static {
    /// Check whether an attachment with this key exists for the category
    async fn exists_by_key_and_category(
        &self,
        key: &str,
        category: AttachmentCategory,
    ) -> TransportResult<bool>;

    /// Record a stored attachment
    async fn record(&self, key: &str, category: AttachmentCategory) -> TransportResult<()>;

    /// Forget a stored attachment; forgetting an unknown key is not an error
    async fn remove(&self, key: &str, category: AttachmentCategory) -> TransportResult<()>;
}

/// Existence predicate answering from the catalog for one category
pub struct CatalogPredicate {
    catalog: Arc<dyn AttachmentCatalog>,
    category: AttachmentCategory,
}

impl CatalogPredicate {
    pub fn new(catalog: Arc<dyn AttachmentCatalog>, category: AttachmentCategory) -> Self {
        Self { catalog, category }
    }
}

#[async_trait]
impl ExistencePredicate for CatalogPredicate {
    async fn exists(&self, candidate_key: &str) -> TransportResult<bool> {
        self.catalog
            .exists_by_key_and_category(candidate_key, self.category)
            .await
    }
}
