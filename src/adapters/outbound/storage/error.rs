use thiserror::Error as ThisError;

use crate::domain::errors::TransportError;

/// Failures while building a store client from settings
#[derive(ThisError, Debug)]
pub enum StoreError {
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Missing setting for {category} store: {setting}")]
    MissingSetting {
        category: &'static str,
        setting: &'static str,
    },

    #[error("Backend '{0}' cannot be served by an object store connector")]
    UnsupportedBackend(String),

    #[error("Failed to prepare local storage directory: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for TransportError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ObjectStore(inner) => TransportError::Connection {
                message: format!("Failed to build store client: {}", inner),
            },
            StoreError::MissingSetting { .. } | StoreError::Io(_) => TransportError::Connection {
                message: err.to_string(),
            },
            StoreError::UnsupportedBackend(backend) => TransportError::Unsupported {
                operation: "connect".to_string(),
                reason: format!("no object store connector for '{}'", backend),
            },
        }
    }
}

/// Convert object_store errors to transport errors
impl From<object_store::Error> for TransportError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => TransportError::NotFound { key: path },
            object_store::Error::AlreadyExists { path, .. }
            | object_store::Error::Precondition { path, .. } => {
                TransportError::AlreadyExists { key: path }
            }
            object_store::Error::NotSupported { .. } | object_store::Error::NotImplemented => {
                TransportError::Unsupported {
                    operation: "unknown".to_string(),
                    reason: err.to_string(),
                }
            }
            _ => TransportError::Backend {
                message: format!("Object store operation failed: {}", err),
                source: Some(err.to_string()),
            },
        }
    }
}

/// Convert sqlx errors raised by the attachment catalog
impl From<sqlx::Error> for TransportError {
    fn from(err: sqlx::Error) -> Self {
        TransportError::Catalog {
            message: err.to_string(),
        }
    }
}
