pub mod repositories;
pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use repositories::{AttachmentCatalog, CatalogPredicate};
pub use services::FileHandler;
pub use storage::{ScopedClient, StoreClient, StoreConnector};
