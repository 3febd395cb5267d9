pub mod content_type;
mod file_handlers;
mod upload_service_impl;

pub use content_type::detect_content_type;
pub use file_handlers::FileHandlers;
pub use upload_service_impl::{UploadServiceBuilder, UploadServiceImpl};
