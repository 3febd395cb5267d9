//! Builders for S3-compatible stores: AWS S3, Aliyun OSS and MinIO all speak
//! the S3 API and differ only in endpoint and addressing style.

use object_store::{ObjectStore as ApacheObjectStore, aws::AmazonS3Builder};
use std::sync::Arc;

use super::error::StoreError;
use crate::{config::StoreSettings, domain::value_objects::AttachmentCategory};

/// Configuration for an S3-compatible storage backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: Option<String>,
    pub virtual_hosted_style: bool,
}

impl S3Config {
    /// Derive the S3 client configuration for a validated backend
    pub fn from_settings(settings: &StoreSettings) -> Result<Self, StoreError> {
        let category = settings.category.as_str();
        let bucket = settings.bucket.as_ref().ok_or(StoreError::MissingSetting {
            category,
            setting: "bucket_name",
        })?;
        let credentials = settings
            .credentials
            .as_ref()
            .ok_or(StoreError::MissingSetting {
                category,
                setting: "access_key",
            })?;

        let (endpoint, virtual_hosted_style) = match settings.category {
            AttachmentCategory::AwsS3 => (settings.endpoint.clone(), false),
            AttachmentCategory::AliOss => (
                Some(settings.endpoint.clone().unwrap_or_else(|| {
                    format!("https://oss-{}.aliyuncs.com", settings.region)
                })),
                true,
            ),
            AttachmentCategory::Minio => (
                Some(settings.endpoint.clone().ok_or(StoreError::MissingSetting {
                    category,
                    setting: "endpoint",
                })?),
                false,
            ),
            other => return Err(StoreError::UnsupportedBackend(other.to_string())),
        };

        Ok(Self {
            bucket: bucket.to_string(),
            region: settings.region.clone(),
            access_key: credentials.access_key.clone(),
            secret_key: credentials.access_secret.clone(),
            endpoint,
            virtual_hosted_style,
        })
    }
}

/// Create an S3 store from configuration
pub fn create_s3_store(config: &S3Config) -> Result<Arc<dyn ApacheObjectStore>, StoreError> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region)
        .with_access_key_id(&config.access_key)
        .with_secret_access_key(&config.secret_key)
        .with_virtual_hosted_style_request(config.virtual_hosted_style);

    if let Some(endpoint) = &config.endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_allow_http(endpoint.starts_with("http://"));
    }

    let store = builder.build()?;

    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MapOptions, StoreSettings};

    fn settings(category: AttachmentCategory, extra: &[(&str, &str)]) -> StoreSettings {
        let prefix = category.option_prefix();
        let mut options = MapOptions::new()
            .set(format!("{prefix}domain"), "files.example.com")
            .set(format!("{prefix}bucket_name"), "attachments")
            .set(format!("{prefix}access_key"), "key")
            .set(format!("{prefix}access_secret"), "secret")
            .set(format!("{prefix}region"), "cn-hangzhou");
        for (name, value) in extra {
            options = options.set(format!("{prefix}{name}"), *value);
        }
        StoreSettings::from_options(category, &options).unwrap()
    }

    #[test]
    fn test_aliyun_defaults_to_regional_endpoint() {
        let config = S3Config::from_settings(&settings(AttachmentCategory::AliOss, &[])).unwrap();
        assert_eq!(
            config.endpoint.as_deref(),
            Some("https://oss-cn-hangzhou.aliyuncs.com")
        );
        assert!(config.virtual_hosted_style);
    }

    #[test]
    fn test_minio_requires_endpoint() {
        let err = S3Config::from_settings(&settings(AttachmentCategory::Minio, &[])).unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingSetting {
                setting: "endpoint",
                ..
            }
        ));

        let config = S3Config::from_settings(&settings(
            AttachmentCategory::Minio,
            &[("endpoint", "http://localhost:9000")],
        ))
        .unwrap();
        assert!(!config.virtual_hosted_style);
    }

    #[test]
    fn test_build_s3_store() {
        let config = S3Config::from_settings(&settings(AttachmentCategory::AwsS3, &[])).unwrap();
        assert_eq!(config.endpoint, None);
        assert!(create_s3_store(&config).is_ok());
    }
}
