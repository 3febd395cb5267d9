mod in_memory_attachment_catalog;
mod sql_attachment_catalog;

pub use in_memory_attachment_catalog::InMemoryAttachmentCatalog;
pub use sql_attachment_catalog::SqlAttachmentCatalog;
