use async_trait::async_trait;
use bytes::Bytes;
use object_store::{
    Attribute, AttributeValue, ObjectStore as ApacheObjectStore, PutMode, PutOptions, PutPayload,
    local::LocalFileSystem, memory::InMemory, path::Path as ObjectPath,
};
use std::sync::Arc;

use super::{
    error::StoreError,
    s3::{S3Config, create_s3_store},
};
use crate::{
    config::StoreSettings,
    domain::{
        errors::{TransportError, TransportResult},
        models::PutAck,
        value_objects::{AttachmentCategory, ObjectKey},
    },
    ports::storage::{StoreClient, StoreConnector},
};

/// Where a connector gets its stores from
#[derive(Clone)]
enum StoreSource {
    /// One store instance shared by every client (in-memory, tests)
    Shared(Arc<dyn ApacheObjectStore>),
    /// A fresh S3-compatible client per operation
    S3(S3Config),
}

/// Connector backed by the Apache `object_store` crate
#[derive(Clone)]
pub struct ApacheObjectStoreConnector {
    category: AttachmentCategory,
    source: StoreSource,
}

impl ApacheObjectStoreConnector {
    /// Serve `category` from an existing store instance
    pub fn shared(category: AttachmentCategory, store: Arc<dyn ApacheObjectStore>) -> Self {
        Self {
            category,
            source: StoreSource::Shared(store),
        }
    }

    /// A connector over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::shared(AttachmentCategory::InMemory, Arc::new(InMemory::new()))
    }

    /// Build the connector for validated backend settings
    pub fn from_settings(settings: &StoreSettings) -> Result<Self, StoreError> {
        let source = match settings.category {
            AttachmentCategory::InMemory => StoreSource::Shared(Arc::new(InMemory::new())),
            AttachmentCategory::Local => {
                let root = settings
                    .root_dir
                    .as_deref()
                    .ok_or(StoreError::MissingSetting {
                        category: settings.category.as_str(),
                        setting: "root_dir",
                    })?;
                std::fs::create_dir_all(root)?;
                let store = LocalFileSystem::new_with_prefix(root)?.with_automatic_cleanup(true);
                StoreSource::Shared(Arc::new(store))
            }
            _ => StoreSource::S3(S3Config::from_settings(settings)?),
        };
        Ok(Self {
            category: settings.category,
            source,
        })
    }
}

#[async_trait]
impl StoreConnector for ApacheObjectStoreConnector {
    fn category(&self) -> AttachmentCategory {
        self.category
    }

    async fn connect(&self) -> TransportResult<Box<dyn StoreClient>> {
        let store = match &self.source {
            StoreSource::Shared(store) => store.clone(),
            StoreSource::S3(config) => create_s3_store(config)?,
        };
        tracing::trace!(category = %self.category, "store client opened");
        Ok(Box::new(ApacheObjectStoreClient {
            category: self.category,
            inner: Some(store),
        }))
    }
}

/// Client over one `object_store` instance; dropped on shutdown
pub struct ApacheObjectStoreClient {
    category: AttachmentCategory,
    inner: Option<Arc<dyn ApacheObjectStore>>,
}

/// Location of `key` in the store, taken verbatim
fn store_path(key: &ObjectKey) -> TransportResult<ObjectPath> {
    ObjectPath::parse(key.as_str()).map_err(|e| TransportError::Backend {
        message: format!("'{}' is not a valid store location", key),
        source: Some(e.to_string()),
    })
}

impl ApacheObjectStoreClient {
    fn store(&self) -> TransportResult<&Arc<dyn ApacheObjectStore>> {
        self.inner.as_ref().ok_or_else(|| TransportError::Connection {
            message: "store client already shut down".to_string(),
        })
    }
}

#[async_trait]
impl StoreClient for ApacheObjectStoreClient {
    async fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
        create_only: bool,
    ) -> TransportResult<Option<PutAck>> {
        let path = store_path(key)?;

        let mut options = PutOptions::from(if create_only {
            PutMode::Create
        } else {
            PutMode::Overwrite
        });
        // The local filesystem keeps no per-object attributes
        if self.category != AttachmentCategory::Local {
            options.attributes.insert(
                Attribute::ContentType,
                AttributeValue::from(content_type.to_string()),
            );
        }

        let result = self
            .store()?
            .put_opts(&path, PutPayload::from(data), options)
            .await
            .map_err(|e| match TransportError::from(e) {
                // Path-bearing variants report the store path, not our key
                TransportError::AlreadyExists { .. } => TransportError::AlreadyExists {
                    key: key.to_string(),
                },
                other => other,
            })?;

        let ack = PutAck {
            e_tag: result.e_tag,
            version: result.version,
        };
        Ok((!ack.is_empty()).then_some(ack))
    }

    async fn delete(&self, key: &ObjectKey) -> TransportResult<()> {
        let path = store_path(key)?;

        self.store()?
            .delete(&path)
            .await
            .map_err(|e| match TransportError::from(e) {
                TransportError::NotFound { .. } => TransportError::NotFound {
                    key: key.to_string(),
                },
                other => other,
            })
    }

    fn shutdown(&mut self) {
        if self.inner.take().is_some() {
            tracing::trace!(category = %self.category, "store client released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    fn key(s: &str) -> ObjectKey {
        ObjectKey::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_put_stores_object_with_content_type() {
        let store = Arc::new(InMemory::new());
        let connector =
            ApacheObjectStoreConnector::shared(AttachmentCategory::InMemory, store.clone());
        let client = connector.connect().await.unwrap();

        let ack = client
            .put(&key("halo/a.txt"), Bytes::from("hello"), "text/plain", true)
            .await
            .unwrap();
        assert!(ack.is_some());

        let fetched = store.get(&ObjectPath::from("halo/a.txt")).await.unwrap();
        assert_eq!(
            fetched
                .attributes
                .get(&Attribute::ContentType)
                .map(|v| AsRef::<str>::as_ref(v)),
            Some("text/plain")
        );
        assert_eq!(fetched.bytes().await.unwrap(), Bytes::from("hello"));
    }

    #[tokio::test]
    async fn test_objects_are_stored_under_the_exact_key() {
        let store = Arc::new(InMemory::new());
        let connector =
            ApacheObjectStoreConnector::shared(AttachmentCategory::InMemory, store.clone());
        let client = connector.connect().await.unwrap();

        let keys = ["halo/100%.png", "halo/a#1.png", "halo/报告 2024.pdf"];
        for k in keys {
            client.put(&key(k), Bytes::from("x"), "image/png", true).await.unwrap();
        }

        let mut stored: Vec<String> = store
            .list(None)
            .map_ok(|meta| meta.location.to_string())
            .try_collect()
            .await
            .unwrap();
        stored.sort();
        let mut expected: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        expected.sort();
        assert_eq!(stored, expected);

        for k in keys {
            client.delete(&key(k)).await.unwrap();
        }
        assert!(store.list(None).try_collect::<Vec<_>>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_only_put_reports_conflict() {
        let connector = ApacheObjectStoreConnector::in_memory();
        let client = connector.connect().await.unwrap();
        let k = key("a.txt");

        client.put(&k, Bytes::from("1"), "text/plain", true).await.unwrap();
        let err = client
            .put(&k, Bytes::from("2"), "text/plain", true)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TransportError::AlreadyExists {
                key: "a.txt".to_string()
            }
        );

        // Overwrite mode replaces silently
        client.put(&k, Bytes::from("3"), "text/plain", false).await.unwrap();
    }

    #[tokio::test]
    async fn test_client_refuses_work_after_shutdown() {
        let connector = ApacheObjectStoreConnector::in_memory();
        let mut client = connector.connect().await.unwrap();
        client.shutdown();

        let err = client.delete(&key("a.txt")).await.unwrap_err();
        assert!(matches!(err, TransportError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_local_backend_writes_files() {
        let root = std::env::temp_dir().join(format!("attachment-store-{}", uuid::Uuid::new_v4()));
        let settings = StoreSettings {
            category: AttachmentCategory::Local,
            root_dir: Some(root.to_string_lossy().into_owned()),
            ..StoreSettings::in_memory("files.example.com")
        };
        let connector = ApacheObjectStoreConnector::from_settings(&settings).unwrap();
        let client = connector.connect().await.unwrap();

        let ack = client
            .put(&key("halo/a.txt"), Bytes::from("hello"), "text/plain", true)
            .await
            .unwrap();
        assert!(ack.is_some());
        assert_eq!(std::fs::read(root.join("halo/a.txt")).unwrap(), b"hello");

        let err = client
            .put(&key("halo/a.txt"), Bytes::from("again"), "text/plain", true)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        client.delete(&key("halo/a.txt")).await.unwrap();
        assert!(!root.join("halo/a.txt").exists());

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn test_delete_missing_object() {
        let connector = ApacheObjectStoreConnector::in_memory();
        let client = connector.connect().await.unwrap();

        match client.delete(&key("missing.txt")).await {
            Ok(()) => {}
            Err(e) => assert!(e.is_not_found(), "unexpected error: {e}"),
        }
    }
}
