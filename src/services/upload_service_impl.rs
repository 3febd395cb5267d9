use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::Instrument;

use crate::{
    config::StoreSettings,
    domain::{
        errors::{AttachmentResult, TransportError, UploadError},
        models::{
            ExistencePredicate, FilePathDescriptor, UploadFile, UploadResult, WithTakenKeys,
        },
        value_objects::{AttachmentCategory, ObjectKey},
    },
    ports::{
        repositories::{AttachmentCatalog, CatalogPredicate},
        services::FileHandler,
        storage::{ScopedClient, StoreConnector},
    },
    services::content_type::detect_content_type,
};

/// Upload orchestrator for one storage backend.
///
/// Resolves a collision-free key through the catalog, detects the media type,
/// transfers the file through a client scoped to the call, and packages the
/// outcome. Transport faults are not retried here.
#[derive(Clone)]
pub struct UploadServiceImpl {
    connector: Arc<dyn StoreConnector>,
    catalog: Arc<dyn AttachmentCatalog>,
    settings: Arc<StoreSettings>,
}

impl UploadServiceImpl {
    pub fn new(
        connector: Arc<dyn StoreConnector>,
        catalog: Arc<dyn AttachmentCatalog>,
        settings: StoreSettings,
    ) -> Self {
        Self {
            connector,
            catalog,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    async fn describe<P>(
        &self,
        original_name: &str,
        exists: &P,
    ) -> AttachmentResult<FilePathDescriptor>
    where
        P: ExistencePredicate + ?Sized,
    {
        FilePathDescriptor::builder()
            .base_path(self.settings.base_path())
            .sub_path(self.settings.prefix.as_str())
            .original_name(original_name)
            .automatic_rename(self.settings.automatic_rename)
            .max_rename_attempts(self.settings.max_rename_attempts)
            .build(exists)
            .await
    }

    async fn transfer(
        &self,
        original_name: &str,
        file: &UploadFile,
    ) -> AttachmentResult<UploadResult> {
        let content = file
            .content
            .clone()
            .ok_or_else(|| UploadError::invalid_input("no file content supplied"))?;
        let size = content.len() as u64;
        let media_type = detect_content_type(original_name, file.declared_content_type.as_deref());

        // Without renaming the caller accepts overwriting an existing object
        let create_only = self.settings.conditional_put && self.settings.automatic_rename;
        let transfer_error = |source: TransportError| UploadError::Transfer {
            filename: original_name.to_string(),
            source,
        };

        let predicate = CatalogPredicate::new(self.catalog.clone(), self.category());
        let mut lost_keys = HashSet::new();

        loop {
            let descriptor = self
                .describe(original_name, &WithTakenKeys::new(&predicate, &lost_keys))
                .await?;

            let client = ScopedClient::acquire(self.connector.as_ref())
                .await
                .map_err(transfer_error)?;

            let ack = match client
                .put(
                    descriptor.relative_path(),
                    content.clone(),
                    &media_type,
                    create_only,
                )
                .await
            {
                Ok(ack) => ack,
                Err(e)
                    if e.is_conflict()
                        && (lost_keys.len() as u32) < self.settings.max_conflict_retries =>
                {
                    tracing::warn!(
                        key = %descriptor.relative_path(),
                        "storage key was taken concurrently, choosing another"
                    );
                    lost_keys.insert(descriptor.relative_path().to_string());
                    continue;
                }
                Err(e) => return Err(transfer_error(e)),
            };

            let ack = ack.ok_or_else(|| UploadError::Validation {
                filename: original_name.to_string(),
                message: "store returned an empty acknowledgment".to_string(),
            })?;

            return UploadResult::assemble(&descriptor, &media_type, size, ack, self.category());
        }
    }
}

#[async_trait]
impl FileHandler for UploadServiceImpl {
    async fn upload(&self, file: UploadFile) -> AttachmentResult<UploadResult> {
        if file.content.is_none() {
            return Err(UploadError::invalid_input("no file content supplied"));
        }
        let original_name = file
            .original_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| UploadError::invalid_input("original file name must not be empty"))?
            .to_string();

        let span = tracing::info_span!(
            "upload",
            filename = %original_name,
            category = %self.category()
        );

        async {
            match self.transfer(&original_name, &file).await {
                Ok(result) => {
                    tracing::info!(key = %result.key, size = result.size, "uploaded file");
                    Ok(result)
                }
                Err(e) => {
                    tracing::error!(error = %e, "upload failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, key: &str) -> AttachmentResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(UploadError::invalid_input("file key must not be blank"));
        }
        let object_key = ObjectKey::new(key.to_string())
            .map_err(|e| UploadError::invalid_input(format!("invalid file key '{}': {}", key, e)))?;

        let delete_error = |source: TransportError| UploadError::Delete {
            key: key.to_string(),
            source,
        };

        let client = ScopedClient::acquire(self.connector.as_ref())
            .await
            .map_err(delete_error)?;

        match client.delete(&object_key).await {
            Ok(()) => {
                tracing::info!(key, category = %self.category(), "deleted file");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(key, category = %self.category(), "file already absent");
                Ok(())
            }
            Err(e) => {
                tracing::error!(key, error = %e, "delete failed");
                Err(delete_error(e))
            }
        }
    }

    fn category(&self) -> AttachmentCategory {
        self.connector.category()
    }
}

/// Builder for UploadServiceImpl
#[derive(Default)]
pub struct UploadServiceBuilder {
    connector: Option<Arc<dyn StoreConnector>>,
    catalog: Option<Arc<dyn AttachmentCatalog>>,
    settings: Option<StoreSettings>,
}

impl UploadServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connector(mut self, connector: Arc<dyn StoreConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn catalog(mut self, catalog: Arc<dyn AttachmentCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn settings(mut self, settings: StoreSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn build(self) -> Result<UploadServiceImpl, &'static str> {
        let connector = self.connector.ok_or("Connector is required")?;
        let catalog = self.catalog.ok_or("Catalog is required")?;
        let settings = self.settings.ok_or("Settings are required")?;

        if connector.category() != settings.category {
            return Err("Connector and settings serve different categories");
        }

        Ok(UploadServiceImpl::new(connector, catalog, settings))
    }
}
