use crate::domain::errors::ValidationError;

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 63;

/// A validated bucket name, following the naming rules shared by S3 and
/// Aliyun OSS.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketName(String);

impl BucketName {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.len() < MIN_LEN {
            return Err(ValidationError::BucketNameTooShort {
                actual: value.len(),
                min: MIN_LEN,
            });
        }

        if value.len() > MAX_LEN {
            return Err(ValidationError::BucketNameTooLong {
                actual: value.len(),
                max: MAX_LEN,
            });
        }

        let edge_ok =
            |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        if !edge_ok(value.chars().next()) {
            return Err(ValidationError::BucketNameInvalidStart);
        }
        if !edge_ok(value.chars().last()) {
            return Err(ValidationError::BucketNameInvalidEnd);
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-')
        {
            return Err(ValidationError::BucketNameInvalidCharacter(c));
        }

        if value.contains("--") {
            return Err(ValidationError::BucketNameConsecutiveHyphens);
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for BucketName {
    type Error = ValidationError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        BucketName::new(name.trim().to_string())
    }
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
