use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{
    errors::TransportResult, models::PutAck, value_objects::{AttachmentCategory, ObjectKey},
};

/// Port for reaching a remote object store.
///
/// A connector hands out one client per operation; the backend behind it
/// (S3, Aliyun OSS, MinIO, in-memory, ...) is invisible to the caller.
#[async_trait]
pub trait StoreConnector: Send + Sync + 'static {
    /// Which backend this connector serves
    fn category(&self) -> AttachmentCategory;

    /// Open a client for a single operation
    async fn connect(&self) -> TransportResult<Box<dyn StoreClient>>;
}

/// A client bound to one bucket, owned by exactly one operation.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Store `data` under `key`.
    ///
    /// With `create_only` the store must refuse to replace an existing object
    /// and report [`TransportError::AlreadyExists`](crate::domain::errors::TransportError).
    /// `Ok(None)` means the store answered without an acknowledgment.
    async fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
        create_only: bool,
    ) -> TransportResult<Option<PutAck>>;

    /// Remove the object stored under `key`
    async fn delete(&self, key: &ObjectKey) -> TransportResult<()>;

    /// Release connections held by the client. Called once, when the owning
    /// [`ScopedClient`] goes out of scope.
    fn shutdown(&mut self);
}

/// Guard owning a [`StoreClient`] for the duration of one operation and
/// shutting it down on every exit path.
pub struct ScopedClient {
    client: Box<dyn StoreClient>,
}

impl ScopedClient {
    pub async fn acquire(connector: &dyn StoreConnector) -> TransportResult<Self> {
        let client = connector.connect().await?;
        Ok(Self { client })
    }
}

impl std::ops::Deref for ScopedClient {
    type Target = dyn StoreClient;

    fn deref(&self) -> &Self::Target {
        self.client.as_ref()
    }
}

impl Drop for ScopedClient {
    fn drop(&mut self) {
        self.client.shutdown();
    }
}
