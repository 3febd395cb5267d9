use bytes::Bytes;

/// A file handed over by the ingestion layer for storage.
#[derive(Debug, Clone, Default)]
pub struct UploadFile {
    pub original_name: Option<String>,
    pub declared_content_type: Option<String>,
    /// File contents; `None` when the caller supplied no stream at all
    pub content: Option<Bytes>,
}

impl UploadFile {
    pub fn new(original_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            original_name: Some(original_name.into()),
            declared_content_type: None,
            content: Some(content.into()),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.declared_content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> u64 {
        self.content.as_ref().map_or(0, |c| c.len() as u64)
    }

    /// Name used in diagnostics, even when the caller sent none
    pub fn display_name(&self) -> &str {
        self.original_name.as_deref().unwrap_or("<unnamed>")
    }
}
