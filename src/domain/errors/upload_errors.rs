use super::TransportError;

/// Errors raised by the upload and delete operations
#[derive(Debug, Clone, PartialEq)]
pub enum UploadError {
    /// Bad caller input (missing stream, empty filename, blank key)
    InvalidInput { reason: String },

    /// A required configuration option is absent
    ConfigurationMissing { option: String },

    /// A configuration option is present but unusable
    InvalidConfiguration { option: String, reason: String },

    /// Every rename candidate collided
    NamingExhausted { original_name: String, attempts: u32 },

    /// The transfer to the store failed
    Transfer {
        filename: String,
        source: TransportError,
    },

    /// Removing an object from the store failed
    Delete { key: String, source: TransportError },

    /// The store acknowledged the call but the result is unusable
    Validation { filename: String, message: String },
}

impl UploadError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        UploadError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Transport faults may succeed when the caller tries again; everything
    /// else needs different input or configuration.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            UploadError::Transfer { .. } | UploadError::Delete { .. }
        )
    }

    /// The filename or key the error is about, for user-facing messages
    pub fn subject(&self) -> Option<&str> {
        match self {
            UploadError::NamingExhausted { original_name, .. } => Some(original_name),
            UploadError::Transfer { filename, .. } | UploadError::Validation { filename, .. } => {
                Some(filename)
            }
            UploadError::Delete { key, .. } => Some(key),
            _ => None,
        }
    }
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::InvalidInput { reason } => write!(f, "Invalid input: {}", reason),
            UploadError::ConfigurationMissing { option } => {
                write!(f, "Missing required configuration option: {}", option)
            }
            UploadError::InvalidConfiguration { option, reason } => {
                write!(f, "Invalid configuration option '{}': {}", option, reason)
            }
            UploadError::NamingExhausted {
                original_name,
                attempts,
            } => {
                write!(
                    f,
                    "No free storage key for '{}' after {} attempts",
                    original_name, attempts
                )
            }
            UploadError::Transfer { filename, source } => {
                write!(f, "Failed to upload attachment '{}': {}", filename, source)
            }
            UploadError::Delete { key, source } => {
                write!(f, "Failed to delete attachment '{}': {}", key, source)
            }
            UploadError::Validation { filename, message } => {
                write!(f, "Upload of '{}' was not confirmed: {}", filename, message)
            }
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::Transfer { source, .. } | UploadError::Delete { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

/// Result type for attachment operations
pub type AttachmentResult<T> = Result<T, UploadError>;
