use crate::domain::errors::ValidationError;

const MAX_KEY_LEN: usize = 1024;

/// A validated object key (path) in the storage system
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a new ObjectKey with validation
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }

        if value.len() > MAX_KEY_LEN {
            return Err(ValidationError::ObjectKeyTooLong {
                actual: value.len(),
                max: MAX_KEY_LEN,
            });
        }

        if let Some(c) = value.chars().find(|c| c.is_control()) {
            return Err(ValidationError::InvalidObjectKeyCharacter(c));
        }

        if value.starts_with('/') {
            return Err(ValidationError::ObjectKeyStartsWithSlash);
        }

        if value.contains("//") {
            return Err(ValidationError::ObjectKeyContainsDoubleSlash);
        }

        if value.ends_with('/') {
            return Err(ValidationError::ObjectKeyEndsWithSlash);
        }

        if let Some(segment) = value.split('/').find(|s| *s == "." || *s == "..") {
            return Err(ValidationError::ObjectKeyRelativeSegment(segment.to_string()));
        }

        Ok(Self(value))
    }

    /// Build a key from a namespace prefix and a file name, with exactly one
    /// separator between them.
    pub fn under_prefix(prefix: &str, file_name: &str) -> Result<Self, ValidationError> {
        let mut key = normalize_prefix(prefix);
        key.push_str(file_name.trim_start_matches('/'));
        Self::new(key)
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a key prefix: no leading separator, no empty segments, and a
/// single trailing `/` unless the prefix is empty.
///
/// Backslashes are treated as separators so that prefixes typed on Windows
/// admin consoles behave the same.
pub fn normalize_prefix(prefix: &str) -> String {
    let mut normalized = String::with_capacity(prefix.len() + 1);
    for segment in prefix
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        normalized.push_str(segment);
        normalized.push('/');
    }
    normalized
}
