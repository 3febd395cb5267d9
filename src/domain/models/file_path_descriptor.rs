use crate::domain::{
    errors::{AttachmentResult, UploadError},
    models::ExistencePredicate,
    value_objects::{ObjectKey, normalize_prefix},
};

/// Default bound on existence checks before giving up on finding a free key
pub const DEFAULT_MAX_RENAME_ATTEMPTS: u32 = 100;

const RENAME_TOKEN_LEN: usize = 8;

/// Replaced by `_` in file names: characters object stores escape inside keys
/// or that a URL cannot carry verbatim.
const RESERVED_KEY_CHARS: &[char] = &[
    '%', '#', '?', '[', ']', '{', '}', '^', '`', '"', '<', '>', '|', '~', '*', '\\',
];

/// Where an uploaded file lives: its object key and its public URL.
///
/// Built once per upload by [`FilePathDescriptorBuilder`] and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePathDescriptor {
    base_path: String,
    sub_path: String,
    original_name: String,
    name: String,
    extension: String,
    relative_path: ObjectKey,
    full_path: String,
}

impl FilePathDescriptor {
    pub fn builder() -> FilePathDescriptorBuilder {
        FilePathDescriptorBuilder::default()
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn sub_path(&self) -> &str {
        &self.sub_path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// File name actually stored, extension included
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased extension without the dot, empty when the file has none
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The object key
    pub fn relative_path(&self) -> &ObjectKey {
        &self.relative_path
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }
}

/// Builder resolving a collision-free [`FilePathDescriptor`].
#[derive(Debug, Clone)]
pub struct FilePathDescriptorBuilder {
    base_path: String,
    sub_path: String,
    original_name: String,
    automatic_rename: bool,
    max_rename_attempts: u32,
}

impl Default for FilePathDescriptorBuilder {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            sub_path: String::new(),
            original_name: String::new(),
            automatic_rename: false,
            max_rename_attempts: DEFAULT_MAX_RENAME_ATTEMPTS,
        }
    }
}

impl FilePathDescriptorBuilder {
    /// Protocol and domain, e.g. `https://cdn.example.com/`
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Namespace under which keys are created
    pub fn sub_path(mut self, sub_path: impl Into<String>) -> Self {
        self.sub_path = sub_path.into();
        self
    }

    pub fn original_name(mut self, original_name: impl Into<String>) -> Self {
        self.original_name = original_name.into();
        self
    }

    /// When disabled the first candidate is used as is and may overwrite an
    /// existing object.
    pub fn automatic_rename(mut self, automatic_rename: bool) -> Self {
        self.automatic_rename = automatic_rename;
        self
    }

    pub fn max_rename_attempts(mut self, attempts: u32) -> Self {
        self.max_rename_attempts = attempts;
        self
    }

    /// Resolve the descriptor, asking `exists` about each candidate key until
    /// one is free.
    pub async fn build<P>(self, exists: &P) -> AttachmentResult<FilePathDescriptor>
    where
        P: ExistencePredicate + ?Sized,
    {
        let file_name = sanitize_file_name(strip_directories(&self.original_name));
        if file_name.is_empty() {
            return Err(UploadError::invalid_input("original file name must not be empty"));
        }

        let (base_name, extension) = split_extension(&file_name);
        let sub_path = normalize_prefix(&self.sub_path);

        let mut name = join_name(base_name, &extension);
        let mut relative_path = self.key_for(&sub_path, &name)?;

        if self.automatic_rename {
            let mut attempts = 0;
            loop {
                if attempts >= self.max_rename_attempts {
                    return Err(UploadError::NamingExhausted {
                        original_name: self.original_name.clone(),
                        attempts,
                    });
                }
                attempts += 1;

                let taken = exists
                    .exists(relative_path.as_str())
                    .await
                    .map_err(|source| UploadError::Transfer {
                        filename: self.original_name.clone(),
                        source,
                    })?;
                if !taken {
                    break;
                }

                tracing::debug!(key = %relative_path, attempts, "storage key taken, renaming");
                name = join_name(&format!("{}-{}", base_name, rename_token()), &extension);
                relative_path = self.key_for(&sub_path, &name)?;
            }
        }

        let full_path = join_url(&self.base_path, relative_path.as_str());

        Ok(FilePathDescriptor {
            base_path: self.base_path,
            sub_path,
            original_name: self.original_name,
            name,
            extension,
            relative_path,
            full_path,
        })
    }

    fn key_for(&self, sub_path: &str, name: &str) -> AttachmentResult<ObjectKey> {
        ObjectKey::under_prefix(sub_path, name).map_err(|e| {
            UploadError::invalid_input(format!(
                "cannot derive a storage key for '{}': {}",
                self.original_name, e
            ))
        })
    }
}

/// Drop any client-side directory components (`C:\photos\a.png` -> `a.png`).
fn strip_directories(original_name: &str) -> &str {
    let trimmed = original_name.trim();
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed)
        .trim()
}

/// The key names exactly the location written, so nothing in it may be
/// rewritten by the store on the way in.
fn sanitize_file_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_control() || RESERVED_KEY_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Split into base name and lower-cased extension. A leading dot marks a
/// hidden file, not an extension.
fn split_extension(file_name: &str) -> (&str, String) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => (&file_name[..idx], file_name[idx + 1..].to_lowercase()),
        _ => (file_name, String::new()),
    }
}

fn join_name(base_name: &str, extension: &str) -> String {
    if extension.is_empty() {
        base_name.to_string()
    } else {
        format!("{}.{}", base_name, extension)
    }
}

fn join_url(base_path: &str, relative_path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        relative_path.to_string()
    } else {
        format!("{}/{}", base, relative_path)
    }
}

fn rename_token() -> String {
    let mut token = uuid::Uuid::new_v4().simple().to_string();
    token.truncate(RENAME_TOKEN_LEN);
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn never(_: &str) -> bool {
        false
    }

    #[tokio::test]
    async fn test_extension_is_lower_cased() {
        let descriptor = FilePathDescriptor::builder()
            .base_path("https://cdn.example.com/")
            .original_name("photo.PNG")
            .build(&never)
            .await
            .unwrap();

        assert_eq!(descriptor.extension(), "png");
        assert_eq!(descriptor.name(), "photo.png");
        assert_eq!(descriptor.relative_path().as_str(), "photo.png");
        assert_eq!(descriptor.full_path(), "https://cdn.example.com/photo.png");
    }

    #[tokio::test]
    async fn test_extension_uses_last_dot() {
        let descriptor = FilePathDescriptor::builder()
            .original_name("archive.tar.GZ")
            .build(&never)
            .await
            .unwrap();

        assert_eq!(descriptor.extension(), "gz");
        assert_eq!(descriptor.name(), "archive.tar.gz");
    }

    #[tokio::test]
    async fn test_missing_extension_is_empty() {
        for original in ["README", ".env"] {
            let descriptor = FilePathDescriptor::builder()
                .original_name(original)
                .build(&never)
                .await
                .unwrap();
            assert_eq!(descriptor.extension(), "");
            assert_eq!(descriptor.name(), original);
        }
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() {
        for original in ["", "   ", "uploads/"] {
            let err = FilePathDescriptor::builder()
                .original_name(original)
                .build(&never)
                .await
                .unwrap_err();
            assert!(matches!(err, UploadError::InvalidInput { .. }), "{original:?}");
        }
    }

    #[tokio::test]
    async fn test_client_directories_are_stripped() {
        let descriptor = FilePathDescriptor::builder()
            .sub_path("halo")
            .original_name("C:\\Users\\me\\cat.jpg")
            .build(&never)
            .await
            .unwrap();

        assert_eq!(descriptor.relative_path().as_str(), "halo/cat.jpg");
    }

    #[tokio::test]
    async fn test_reserved_characters_are_replaced() {
        for (original, expected) in [
            ("100%.png", "halo/100_.png"),
            ("a#1.png", "halo/a_1.png"),
            ("x[1].PNG", "halo/x_1_.png"),
            ("what?.txt", "halo/what_.txt"),
            ("报告 2024.pdf", "halo/报告 2024.pdf"),
        ] {
            let descriptor = FilePathDescriptor::builder()
                .base_path("https://cdn.example.com")
                .sub_path("halo")
                .original_name(original)
                .build(&never)
                .await
                .unwrap();

            assert_eq!(descriptor.relative_path().as_str(), expected);
            assert_eq!(descriptor.original_name(), original);
            assert_eq!(
                descriptor.full_path(),
                format!("https://cdn.example.com/{}", expected)
            );
        }
    }

    #[tokio::test]
    async fn test_dot_names_are_rejected() {
        for original in [".", ".."] {
            let err = FilePathDescriptor::builder()
                .original_name(original)
                .build(&never)
                .await
                .unwrap_err();
            assert!(matches!(err, UploadError::InvalidInput { .. }), "{original:?}");
        }
    }

    #[tokio::test]
    async fn test_separators_are_never_doubled() {
        for (base, sub) in [
            ("https://cdn.example.com", "uploads"),
            ("https://cdn.example.com/", "/uploads"),
            ("https://cdn.example.com/", "/uploads/"),
            ("https://cdn.example.com//", "//uploads//"),
        ] {
            let descriptor = FilePathDescriptor::builder()
                .base_path(base)
                .sub_path(sub)
                .original_name("a.txt")
                .build(&never)
                .await
                .unwrap();

            assert_eq!(descriptor.relative_path().as_str(), "uploads/a.txt");
            assert_eq!(
                descriptor.full_path(),
                "https://cdn.example.com/uploads/a.txt",
                "base={base:?} sub={sub:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_without_rename_predicate_is_not_consulted() {
        let calls = AtomicU32::new(0);
        let always = |_: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            true
        };

        let descriptor = FilePathDescriptor::builder()
            .original_name("a.txt")
            .automatic_rename(false)
            .build(&always)
            .await
            .unwrap();

        assert_eq!(descriptor.name(), "a.txt");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rename_returns_first_free_candidate() {
        let calls = AtomicU32::new(0);
        let collide_three_times = |_: &str| calls.fetch_add(1, Ordering::SeqCst) < 3;

        let descriptor = FilePathDescriptor::builder()
            .sub_path("uploads")
            .original_name("Report.PDF")
            .automatic_rename(true)
            .build(&collide_three_times)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_ne!(descriptor.name(), "Report.pdf");
        assert!(descriptor.name().starts_with("Report-"));
        assert!(descriptor.name().ends_with(".pdf"));
        assert_eq!(
            descriptor.name().len(),
            "Report-".len() + RENAME_TOKEN_LEN + ".pdf".len()
        );
        assert_eq!(
            descriptor.relative_path().as_str(),
            format!("uploads/{}", descriptor.name())
        );
    }

    #[tokio::test]
    async fn test_always_taken_exhausts_within_bound() {
        let calls = AtomicU32::new(0);
        let always = |_: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            true
        };

        let err = FilePathDescriptor::builder()
            .original_name("a.txt")
            .automatic_rename(true)
            .max_rename_attempts(100)
            .build(&always)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            UploadError::NamingExhausted {
                original_name: "a.txt".to_string(),
                attempts: 100
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 100);
    }

    #[tokio::test]
    async fn test_predicate_failure_is_reported_with_filename() {
        struct Unavailable;

        #[async_trait::async_trait]
        impl ExistencePredicate for Unavailable {
            async fn exists(&self, _: &str) -> crate::domain::errors::TransportResult<bool> {
                Err(crate::domain::errors::TransportError::Catalog {
                    message: "connection refused".to_string(),
                })
            }
        }

        let err = FilePathDescriptor::builder()
            .original_name("a.txt")
            .automatic_rename(true)
            .build(&Unavailable)
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Transfer { ref filename, .. } if filename == "a.txt"));
    }
}
