mod attachment_catalog;

pub use attachment_catalog::{AttachmentCatalog, CatalogPredicate};
