use serde::{Deserialize, Serialize};

use crate::domain::{
    errors::{AttachmentResult, UploadError},
    models::FilePathDescriptor,
    value_objects::AttachmentCategory,
};

/// Acknowledgment returned by a store after a successful put
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PutAck {
    pub e_tag: Option<String>,
    pub version: Option<String>,
}

impl PutAck {
    /// Some SDKs answer a put with an acknowledgment that carries nothing;
    /// such an answer does not prove the object was written.
    pub fn is_empty(&self) -> bool {
        self.e_tag.as_deref().map_or(true, str::is_empty)
            && self.version.as_deref().map_or(true, str::is_empty)
    }
}

/// Outcome of a successful upload, independent of the backend that stored it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub filename: String,
    pub file_path: String,
    pub key: String,
    pub media_type: String,
    pub suffix: String,
    pub size: u64,
    pub category: AttachmentCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
}

impl UploadResult {
    /// Package a finished transfer.
    pub fn assemble(
        descriptor: &FilePathDescriptor,
        media_type: &str,
        size: u64,
        ack: PutAck,
        category: AttachmentCategory,
    ) -> AttachmentResult<Self> {
        let missing = |field: &str| UploadError::Validation {
            filename: descriptor.original_name().to_string(),
            message: format!("{} is missing from the upload result", field),
        };

        if descriptor.name().is_empty() {
            return Err(missing("filename"));
        }
        if descriptor.full_path().is_empty() {
            return Err(missing("file path"));
        }
        if media_type.trim().is_empty() {
            return Err(missing("media type"));
        }

        Ok(Self {
            filename: descriptor.name().to_string(),
            file_path: descriptor.full_path().to_string(),
            key: descriptor.relative_path().to_string(),
            media_type: media_type.to_string(),
            suffix: descriptor.extension().to_string(),
            size,
            category,
            e_tag: ack.e_tag.filter(|t| !t.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn descriptor(name: &str) -> FilePathDescriptor {
        FilePathDescriptor::builder()
            .base_path("https://files.example.com")
            .sub_path("halo")
            .original_name(name)
            .build(&|_: &str| false)
            .await
            .unwrap()
    }

    #[test]
    fn test_empty_ack() {
        assert!(PutAck::default().is_empty());
        assert!(PutAck {
            e_tag: Some(String::new()),
            version: None
        }
        .is_empty());
        assert!(!PutAck {
            e_tag: Some("\"abc\"".to_string()),
            version: None
        }
        .is_empty());
        assert!(!PutAck {
            e_tag: None,
            version: Some("3".to_string())
        }
        .is_empty());
    }

    #[tokio::test]
    async fn test_assemble_maps_descriptor() {
        let descriptor = descriptor("Cover.JPG").await;
        let ack = PutAck {
            e_tag: Some("\"1\"".to_string()),
            version: None,
        };

        let result =
            UploadResult::assemble(&descriptor, "image/jpeg", 42, ack, AttachmentCategory::AwsS3)
                .unwrap();

        assert_eq!(result.filename, "Cover.jpg");
        assert_eq!(result.key, "halo/Cover.jpg");
        assert_eq!(result.file_path, "https://files.example.com/halo/Cover.jpg");
        assert_eq!(result.suffix, "jpg");
        assert_eq!(result.size, 42);
        assert_eq!(result.e_tag.as_deref(), Some("\"1\""));
    }

    #[tokio::test]
    async fn test_assemble_requires_media_type() {
        let descriptor = descriptor("a.bin").await;
        let err = UploadResult::assemble(
            &descriptor,
            " ",
            1,
            PutAck::default(),
            AttachmentCategory::InMemory,
        )
        .unwrap_err();

        assert!(matches!(err, UploadError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_serializes_camel_case() {
        let descriptor = descriptor("a.txt").await;
        let result = UploadResult::assemble(
            &descriptor,
            "text/plain",
            5,
            PutAck::default(),
            AttachmentCategory::Minio,
        )
        .unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["filePath"], "https://files.example.com/halo/a.txt");
        assert_eq!(json["mediaType"], "text/plain");
        assert_eq!(json["category"], "minio");
        assert!(json.get("eTag").is_none());
    }
}
