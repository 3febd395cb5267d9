/// Faults reported by the collaborators behind the ports: the object-store
/// transport and the attachment catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// No object is stored under the key
    NotFound { key: String },

    /// A create-only write found an object already stored under the key
    AlreadyExists { key: String },

    /// The remote store could not be reached or the client could not be built
    Connection { message: String },

    /// The remote store answered with a failure
    Backend {
        message: String,
        source: Option<String>, // Store error as string to allow Clone
    },

    /// The attachment catalog could not answer
    Catalog { message: String },

    /// The backend does not support the requested operation
    Unsupported { operation: String, reason: String },
}

impl TransportError {
    /// Whether the fault means "nothing stored under this key"
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::NotFound { .. })
    }

    /// Whether the fault is a lost create-only write
    pub fn is_conflict(&self) -> bool {
        matches!(self, TransportError::AlreadyExists { .. })
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::NotFound { key } => write!(f, "Object not found: {}", key),
            TransportError::AlreadyExists { key } => {
                write!(f, "Object already exists: {}", key)
            }
            TransportError::Connection { message } => {
                write!(f, "Store connection error: {}", message)
            }
            TransportError::Backend { message, .. } => {
                write!(f, "Store backend error: {}", message)
            }
            TransportError::Catalog { message } => {
                write!(f, "Attachment catalog error: {}", message)
            }
            TransportError::Unsupported { operation, reason } => {
                write!(f, "Unsupported operation '{}': {}", operation, reason)
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Result type for transport and catalog calls
pub type TransportResult<T> = Result<T, TransportError>;
