use async_trait::async_trait;

use crate::domain::{
    errors::AttachmentResult,
    models::{UploadFile, UploadResult},
    value_objects::AttachmentCategory,
};

/// Port exposed to callers such as an HTTP upload handler.
/// One implementation serves one storage backend.
#[async_trait]
pub trait FileHandler: Send + Sync + 'static {
    /// Store a file under a fresh, collision-free key
    async fn upload(&self, file: UploadFile) -> AttachmentResult<UploadResult>;

    /// Remove a stored file; removing a missing key succeeds
    async fn delete(&self, key: &str) -> AttachmentResult<()>;

    /// The backend this handler serves
    fn category(&self) -> AttachmentCategory;
}
