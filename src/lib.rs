pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core business entities and value objects
pub use domain::{
    // Value objects
    AttachmentCategory,
    AttachmentResult,
    BucketName,
    // Models
    ExistencePredicate,
    FilePathDescriptor,
    FilePathDescriptorBuilder,
    ObjectKey,
    PutAck,
    // Errors
    TransportError,
    UploadError,
    UploadFile,
    UploadResult,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{
    // Repository ports
    AttachmentCatalog,
    CatalogPredicate,
    // Service ports
    FileHandler,
    // Storage ports
    ScopedClient,
    StoreClient,
    StoreConnector,
};

// Service implementations - business logic
pub use services::{FileHandlers, UploadServiceBuilder, UploadServiceImpl, detect_content_type};

// Configuration
pub use config::{EnvOptions, MapOptions, OptionSource, StoreSettings};

// Application factory and configuration
pub use app::{
    AppBuilder, AppConfig, AppError, AppServices, CatalogBackend, create_app_from_env,
    create_in_memory_app,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::{
    persistence::{InMemoryAttachmentCatalog, SqlAttachmentCatalog},
    storage::{ApacheObjectStoreClient, ApacheObjectStoreConnector},
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        ApacheObjectStoreConnector, AppBuilder, AppServices, AttachmentCatalog,
        AttachmentCategory, FileHandler, FileHandlers, InMemoryAttachmentCatalog, ObjectKey,
        StoreSettings, UploadError, UploadFile, UploadResult, UploadServiceImpl,
        create_in_memory_app,
    };
}
