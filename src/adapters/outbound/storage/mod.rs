// Infrastructure error types
pub mod error;

// Storage implementations
pub mod apache_object_store_adapter;

// Provider-specific builders
pub mod s3;

// Re-export key types
pub use apache_object_store_adapter::{ApacheObjectStoreClient, ApacheObjectStoreConnector};
pub use error::StoreError;
pub use s3::{S3Config, create_s3_store};
