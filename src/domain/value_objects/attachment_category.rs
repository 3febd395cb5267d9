use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::errors::ValidationError;

/// Tag identifying which storage backend serves an attachment.
///
/// The catalog scopes key uniqueness per category, and the handler registry
/// dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentCategory {
    Local,
    AwsS3,
    AliOss,
    Minio,
    InMemory,
}

impl AttachmentCategory {
    pub const ALL: [AttachmentCategory; 5] = [
        AttachmentCategory::Local,
        AttachmentCategory::AwsS3,
        AttachmentCategory::AliOss,
        AttachmentCategory::Minio,
        AttachmentCategory::InMemory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentCategory::Local => "local",
            AttachmentCategory::AwsS3 => "aws_s3",
            AttachmentCategory::AliOss => "ali_oss",
            AttachmentCategory::Minio => "minio",
            AttachmentCategory::InMemory => "in_memory",
        }
    }

    /// Prefix of the configuration options for this backend
    pub fn option_prefix(&self) -> &'static str {
        match self {
            AttachmentCategory::Local => "local_",
            AttachmentCategory::AwsS3 => "aws_s3_",
            AttachmentCategory::AliOss => "ali_oss_",
            AttachmentCategory::Minio => "minio_",
            AttachmentCategory::InMemory => "in_memory_",
        }
    }
}

impl std::fmt::Display for AttachmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttachmentCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}
