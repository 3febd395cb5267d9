use std::sync::Arc;

use crate::{
    adapters::{
        inbound::http::AppState,
        outbound::{
            persistence::{InMemoryAttachmentCatalog, SqlAttachmentCatalog},
            storage::{ApacheObjectStoreConnector, StoreError},
        },
    },
    config::{EnvOptions, OptionSource, StoreSettings},
    domain::{errors::UploadError, value_objects::AttachmentCategory},
    ports::{repositories::AttachmentCatalog, services::FileHandler, storage::StoreConnector},
    services::{FileHandlers, UploadServiceImpl},
};

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backends: Vec<StoreSettings>,
    pub catalog_backend: CatalogBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backends: vec![StoreSettings::in_memory("localhost:3000")],
            catalog_backend: CatalogBackend::InMemory,
        }
    }
}

/// Catalog backend configuration
#[derive(Debug, Clone)]
pub enum CatalogBackend {
    InMemory,
    Database { connection_string: String },
}

/// Application services container
#[derive(Clone)]
pub struct AppServices {
    pub handlers: FileHandlers,
    pub catalog: Arc<dyn AttachmentCatalog>,
}

impl AppServices {
    /// State for the HTTP router
    pub fn into_state(self) -> AppState {
        AppState {
            handlers: self.handlers,
            catalog: self.catalog,
        }
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the configured storage backends
    pub fn with_backends(mut self, backends: Vec<StoreSettings>) -> Self {
        self.config.backends = backends;
        self
    }

    /// Configure catalog backend
    pub fn with_catalog_backend(mut self, backend: CatalogBackend) -> Self {
        self.config.catalog_backend = backend;
        self
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let catalog = self.create_catalog().await?;
        self.build_with_catalog(catalog)
    }

    /// Build the services around an existing catalog
    pub fn build_with_catalog(
        self,
        catalog: Arc<dyn AttachmentCatalog>,
    ) -> Result<AppServices, AppError> {
        if self.config.backends.is_empty() {
            return Err(AppError::Configuration {
                message: "at least one storage backend must be configured".to_string(),
            });
        }

        let mut handlers = FileHandlers::default();
        for settings in self.config.backends {
            let connector = ApacheObjectStoreConnector::from_settings(&settings)?;
            tracing::info!(
                category = %settings.category,
                bucket = ?settings.bucket,
                "storage backend configured"
            );

            let service = UploadServiceImpl::new(
                Arc::new(connector) as Arc<dyn StoreConnector>,
                catalog.clone(),
                settings,
            );
            handlers.register(Arc::new(service) as Arc<dyn FileHandler>);
        }

        Ok(AppServices { handlers, catalog })
    }

    async fn create_catalog(&self) -> Result<Arc<dyn AttachmentCatalog>, AppError> {
        match &self.config.catalog_backend {
            CatalogBackend::InMemory => Ok(Arc::new(InMemoryAttachmentCatalog::new())),
            CatalogBackend::Database { connection_string } => {
                let catalog = SqlAttachmentCatalog::connect(connection_string)
                    .await
                    .map_err(|e| AppError::CatalogInit {
                        message: e.to_string(),
                    })?;
                catalog.migrate().await.map_err(|e| AppError::CatalogInit {
                    message: e.to_string(),
                })?;
                Ok(Arc::new(catalog))
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(transparent)]
    Settings(#[from] UploadError),

    #[error("Storage initialization error: {0}")]
    StorageInit(#[from] StoreError),

    #[error("Catalog initialization error: {message}")]
    CatalogInit { message: String },
}

/// Read and validate the settings of each named backend
pub fn load_backends(
    categories: &[AttachmentCategory],
    options: &dyn OptionSource,
) -> Result<Vec<StoreSettings>, AppError> {
    categories
        .iter()
        .map(|category| StoreSettings::from_options(*category, options).map_err(AppError::from))
        .collect()
}

/// Parse a comma-separated list of categories, e.g. `aws_s3,ali_oss`
pub fn parse_categories(list: &str) -> Result<Vec<AttachmentCategory>, AppError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|e| AppError::Configuration {
                message: format!("{}", e),
            })
        })
        .collect()
}

/// Convenience functions for common configurations
///
/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new().build().await
}

/// Create application from environment variables
///
/// `ATTACHMENT_BACKENDS` lists the categories to serve; each reads its
/// options from the environment (`AWS_S3_BUCKET_NAME`, ...). Without it a
/// single in-memory backend is served. `DATABASE_URL` selects the
/// PostgreSQL catalog.
pub async fn create_app_from_env() -> Result<AppServices, AppError> {
    let backends = match std::env::var("ATTACHMENT_BACKENDS") {
        Ok(list) => load_backends(&parse_categories(&list)?, &EnvOptions::new())?,
        Err(_) => AppConfig::default().backends,
    };

    let catalog_backend = match std::env::var("DATABASE_URL") {
        Ok(connection_string) => CatalogBackend::Database { connection_string },
        Err(_) => CatalogBackend::InMemory,
    };

    AppBuilder::new()
        .with_backends(backends)
        .with_catalog_backend(catalog_backend)
        .build()
        .await
}
