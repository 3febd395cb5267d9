use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{
    errors::{TransportError, UploadError},
    value_objects::AttachmentCategory,
};

/// DTO for error responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
    pub message: String,
    pub details: Option<HashMap<String, serde_json::Value>>,
    pub retryable: bool,
    pub timestamp: DateTime<Utc>,
}

/// DTO for success responses without a payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponseDto {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// DTO for the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub categories: Vec<AttachmentCategory>,
}

impl SuccessResponseDto {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl ErrorResponseDto {
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: "BadRequest".to_string(),
            message: message.to_string(),
            details: None,
            retryable: false,
            timestamp: Utc::now(),
        }
    }

    pub fn from_upload_error(error: &UploadError) -> Self {
        let mut details = HashMap::new();

        let kind = match error {
            UploadError::InvalidInput { .. } => "InvalidInput",
            UploadError::ConfigurationMissing { option } => {
                details.insert("option".to_string(), serde_json::Value::from(option.as_str()));
                "ConfigurationMissing"
            }
            UploadError::InvalidConfiguration { option, .. } => {
                details.insert("option".to_string(), serde_json::Value::from(option.as_str()));
                "InvalidConfiguration"
            }
            UploadError::NamingExhausted { attempts, .. } => {
                details.insert("attempts".to_string(), serde_json::Value::from(*attempts));
                "NamingExhausted"
            }
            UploadError::Transfer { .. } => "TransferFailed",
            UploadError::Delete { .. } => "DeleteFailed",
            UploadError::Validation { .. } => "UploadNotConfirmed",
        };

        if let Some(subject) = error.subject() {
            details.insert("file".to_string(), serde_json::Value::from(subject));
        }

        ErrorResponseDto {
            error: kind.to_string(),
            message: error.to_string(),
            details: if details.is_empty() {
                None
            } else {
                Some(details)
            },
            retryable: error.retryable(),
            timestamp: Utc::now(),
        }
    }
}

/// Convert upload errors to HTTP status codes for API responses
impl From<&UploadError> for http::StatusCode {
    fn from(err: &UploadError) -> Self {
        match err {
            UploadError::InvalidInput { .. } => http::StatusCode::BAD_REQUEST,
            UploadError::ConfigurationMissing { .. } | UploadError::InvalidConfiguration { .. } => {
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
            UploadError::NamingExhausted { .. } => http::StatusCode::CONFLICT,
            UploadError::Transfer { source, .. } | UploadError::Delete { source, .. } => {
                match source {
                    TransportError::AlreadyExists { .. } => http::StatusCode::CONFLICT,
                    TransportError::Unsupported { .. } => http::StatusCode::NOT_IMPLEMENTED,
                    _ => http::StatusCode::BAD_GATEWAY,
                }
            }
            UploadError::Validation { .. } => http::StatusCode::BAD_GATEWAY,
        }
    }
}
