use std::collections::HashMap;

use crate::domain::{
    errors::{AttachmentResult, UploadError},
    models::DEFAULT_MAX_RENAME_ATTEMPTS,
    value_objects::{AttachmentCategory, BucketName},
};

pub const PROTOCOL_HTTPS: &str = "https://";
pub const PROTOCOL_HTTP: &str = "http://";
pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// Source of named configuration options (environment, option table, ...)
pub trait OptionSource: Send + Sync {
    /// Raw lookup; `None` when the option is not set
    fn get(&self, name: &str) -> Option<String>;

    /// Look up an option that must be present and non-blank
    fn get_required(&self, name: &str) -> AttachmentResult<String> {
        self.get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| UploadError::ConfigurationMissing {
                option: name.to_string(),
            })
    }

    /// Look up an option, falling back to `default` when unset or blank
    fn get_or_default(&self, name: &str, default: &str) -> String {
        self.get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    }
}

/// Options read from the process environment.
///
/// `aws_s3_bucket_name` is looked up as `{PREFIX}AWS_S3_BUCKET_NAME`.
#[derive(Debug, Clone, Default)]
pub struct EnvOptions {
    prefix: String,
}

impl EnvOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl OptionSource for EnvOptions {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(format!("{}{}", self.prefix, name.to_ascii_uppercase())).ok()
    }
}

/// Options held in memory, e.g. loaded from an option table
#[derive(Debug, Clone, Default)]
pub struct MapOptions(HashMap<String, String>);

impl MapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }
}

impl FromIterator<(String, String)> for MapOptions {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl OptionSource for MapOptions {
    fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// Credentials passed through to the store client builder
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub access_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("access_secret", &"***")
            .finish()
    }
}

/// Typed settings for one storage backend, validated once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub category: AttachmentCategory,
    /// `https://` or `http://`
    pub protocol: String,
    /// Public domain objects are served from, without protocol
    pub domain: String,
    pub region: String,
    pub bucket: Option<BucketName>,
    pub credentials: Option<Credentials>,
    /// Namespace prefix for object keys
    pub prefix: String,
    /// Custom API endpoint for S3-compatible providers
    pub endpoint: Option<String>,
    /// Directory holding the objects of the local backend
    pub root_dir: Option<String>,
    pub automatic_rename: bool,
    /// Ask the store to refuse overwrites (conditional put)
    pub conditional_put: bool,
    pub max_rename_attempts: u32,
    pub max_conflict_retries: u32,
}

impl StoreSettings {
    /// Read and validate the settings of `category` from `options`.
    ///
    /// Option names are the category prefix followed by the setting, e.g.
    /// `aws_s3_bucket_name`. Fails before any network call is made.
    pub fn from_options(
        category: AttachmentCategory,
        options: &dyn OptionSource,
    ) -> AttachmentResult<Self> {
        let name = |setting: &str| format!("{}{}", category.option_prefix(), setting);

        let protocol = options.get_or_default(&name("domain_protocol"), PROTOCOL_HTTPS);
        let protocol = normalize_protocol(&protocol).ok_or_else(|| {
            UploadError::InvalidConfiguration {
                option: name("domain_protocol"),
                reason: format!("unsupported protocol '{}'", protocol),
            }
        })?;

        let domain = options.get_required(&name("domain"))?;
        let domain = domain
            .trim_start_matches(PROTOCOL_HTTPS)
            .trim_start_matches(PROTOCOL_HTTP)
            .trim_end_matches('/')
            .to_string();
        if domain.is_empty() {
            return Err(UploadError::InvalidConfiguration {
                option: name("domain"),
                reason: "domain is empty".to_string(),
            });
        }

        let root_dir = if category == AttachmentCategory::Local {
            Some(options.get_required(&name("root_dir"))?)
        } else {
            None
        };

        let needs_remote = !matches!(
            category,
            AttachmentCategory::InMemory | AttachmentCategory::Local
        );

        let (bucket, credentials) = if needs_remote {
            let bucket_option = name("bucket_name");
            let bucket = BucketName::try_from(options.get_required(&bucket_option)?.as_str())
                .map_err(|e| UploadError::InvalidConfiguration {
                    option: bucket_option,
                    reason: e.to_string(),
                })?;
            let credentials = Credentials {
                access_key: options.get_required(&name("access_key"))?,
                access_secret: options.get_required(&name("access_secret"))?,
            };
            (Some(bucket), Some(credentials))
        } else {
            (None, None)
        };

        Ok(Self {
            category,
            protocol: protocol.to_string(),
            domain,
            region: options.get_or_default(&name("region"), DEFAULT_REGION),
            bucket,
            credentials,
            prefix: options.get_or_default(&name("prefix"), ""),
            endpoint: options
                .get(&name("endpoint"))
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            root_dir,
            automatic_rename: parse_flag(options, &name("automatic_rename"), true)?,
            conditional_put: parse_flag(options, &name("conditional_put"), true)?,
            max_rename_attempts: parse_count(
                options,
                &name("max_rename_attempts"),
                DEFAULT_MAX_RENAME_ATTEMPTS,
            )?,
            max_conflict_retries: parse_count(
                options,
                &name("max_conflict_retries"),
                DEFAULT_MAX_CONFLICT_RETRIES,
            )?,
        })
    }

    /// Settings for an in-memory store, used by tests and local development
    pub fn in_memory(domain: impl Into<String>) -> Self {
        Self {
            category: AttachmentCategory::InMemory,
            protocol: PROTOCOL_HTTP.to_string(),
            domain: domain.into(),
            region: DEFAULT_REGION.to_string(),
            bucket: None,
            credentials: None,
            prefix: String::new(),
            endpoint: None,
            root_dir: None,
            automatic_rename: true,
            conditional_put: true,
            max_rename_attempts: DEFAULT_MAX_RENAME_ATTEMPTS,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Public URL prefix objects are reachable under, e.g. `https://cdn.example.com/`
    pub fn base_path(&self) -> String {
        format!("{}{}/", self.protocol, self.domain)
    }
}

fn normalize_protocol(protocol: &str) -> Option<&'static str> {
    match protocol.trim().to_ascii_lowercase().as_str() {
        "https://" | "https" => Some(PROTOCOL_HTTPS),
        "http://" | "http" => Some(PROTOCOL_HTTP),
        _ => None,
    }
}

fn parse_flag(options: &dyn OptionSource, name: &str, default: bool) -> AttachmentResult<bool> {
    match options.get(name).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) if matches!(v.as_str(), "true" | "1" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "false" | "0" | "no" | "off") => Ok(false),
        Some(v) => Err(UploadError::InvalidConfiguration {
            option: name.to_string(),
            reason: format!("expected a boolean, got '{}'", v),
        }),
    }
}

fn parse_count(options: &dyn OptionSource, name: &str, default: u32) -> AttachmentResult<u32> {
    let raw = options.get_or_default(name, &default.to_string());
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(UploadError::InvalidConfiguration {
            option: name.to_string(),
            reason: format!("expected a positive integer, got '{}'", raw),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_options() -> MapOptions {
        MapOptions::new()
            .set("aws_s3_domain", "cdn.example.com")
            .set("aws_s3_bucket_name", "halo-attachments")
            .set("aws_s3_access_key", "AKIA")
            .set("aws_s3_access_secret", "secret")
    }

    #[test]
    fn test_defaults_are_applied() {
        let settings =
            StoreSettings::from_options(AttachmentCategory::AwsS3, &s3_options()).unwrap();

        assert_eq!(settings.protocol, PROTOCOL_HTTPS);
        assert_eq!(settings.region, "us-west-2");
        assert_eq!(settings.prefix, "");
        assert!(settings.automatic_rename);
        assert!(settings.conditional_put);
        assert_eq!(settings.max_rename_attempts, 100);
        assert_eq!(settings.base_path(), "https://cdn.example.com/");
        assert_eq!(settings.bucket.unwrap().as_str(), "halo-attachments");
    }

    #[test]
    fn test_missing_required_option() {
        for missing in [
            "aws_s3_domain",
            "aws_s3_bucket_name",
            "aws_s3_access_key",
            "aws_s3_access_secret",
        ] {
            let options: MapOptions = s3_options()
                .0
                .into_iter()
                .filter(|(k, _)| k != missing)
                .collect();

            let err = StoreSettings::from_options(AttachmentCategory::AwsS3, &options).unwrap_err();
            assert_eq!(
                err,
                UploadError::ConfigurationMissing {
                    option: missing.to_string()
                }
            );
        }
    }

    #[test]
    fn test_blank_required_option_counts_as_missing() {
        let options = s3_options().set("aws_s3_access_key", "   ");
        let err = StoreSettings::from_options(AttachmentCategory::AwsS3, &options).unwrap_err();
        assert!(matches!(err, UploadError::ConfigurationMissing { .. }));
    }

    #[test]
    fn test_domain_and_protocol_are_normalized() {
        let options = s3_options()
            .set("aws_s3_domain", "https://cdn.example.com/")
            .set("aws_s3_domain_protocol", "HTTP");
        let settings =
            StoreSettings::from_options(AttachmentCategory::AwsS3, &options).unwrap();
        assert_eq!(settings.base_path(), "http://cdn.example.com/");
    }

    #[test]
    fn test_protocol_is_read_from_domain_protocol() {
        let options = s3_options().set("aws_s3_domain_protocol", "http://");
        let settings =
            StoreSettings::from_options(AttachmentCategory::AwsS3, &options).unwrap();
        assert_eq!(settings.protocol, PROTOCOL_HTTP);

        let options = MapOptions::new()
            .set("minio_domain", "files.local")
            .set("minio_bucket_name", "attachments")
            .set("minio_access_key", "key")
            .set("minio_access_secret", "secret")
            .set("minio_domain_protocol", "ftp");
        assert_eq!(
            StoreSettings::from_options(AttachmentCategory::Minio, &options).unwrap_err(),
            UploadError::InvalidConfiguration {
                option: "minio_domain_protocol".to_string(),
                reason: "unsupported protocol 'ftp'".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let options = s3_options().set("aws_s3_domain_protocol", "ftp://");
        assert!(matches!(
            StoreSettings::from_options(AttachmentCategory::AwsS3, &options),
            Err(UploadError::InvalidConfiguration { .. })
        ));

        let options = s3_options().set("aws_s3_bucket_name", "Not_A_Bucket");
        assert!(matches!(
            StoreSettings::from_options(AttachmentCategory::AwsS3, &options),
            Err(UploadError::InvalidConfiguration { .. })
        ));

        let options = s3_options().set("aws_s3_automatic_rename", "maybe");
        assert!(matches!(
            StoreSettings::from_options(AttachmentCategory::AwsS3, &options),
            Err(UploadError::InvalidConfiguration { .. })
        ));

        let options = s3_options().set("aws_s3_max_rename_attempts", "0");
        assert!(matches!(
            StoreSettings::from_options(AttachmentCategory::AwsS3, &options),
            Err(UploadError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_in_memory_needs_only_domain() {
        let options = MapOptions::new().set("in_memory_domain", "localhost:3000");
        let settings =
            StoreSettings::from_options(AttachmentCategory::InMemory, &options).unwrap();
        assert!(settings.bucket.is_none());
        assert!(settings.credentials.is_none());
    }

    #[test]
    fn test_local_needs_root_dir() {
        let options = MapOptions::new().set("local_domain", "files.example.com");
        assert_eq!(
            StoreSettings::from_options(AttachmentCategory::Local, &options).unwrap_err(),
            UploadError::ConfigurationMissing {
                option: "local_root_dir".to_string()
            }
        );

        let options = options.set("local_root_dir", "/var/lib/attachments");
        let settings = StoreSettings::from_options(AttachmentCategory::Local, &options).unwrap();
        assert_eq!(settings.root_dir.as_deref(), Some("/var/lib/attachments"));
        assert!(settings.bucket.is_none());
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let credentials = Credentials {
            access_key: "AKIA".to_string(),
            access_secret: "hunter2".to_string(),
        };
        let printed = format!("{:?}", credentials);
        assert!(printed.contains("AKIA"));
        assert!(!printed.contains("hunter2"));
    }
}
