//! Storage configuration types.

use std::path::PathBuf;

use helptax_shared::config::StorageSettings;

/// Storage provider configuration.
#[derive(Debug, Clone)]
pub enum StorageProvider {
    /// S3-compatible storage: AWS S3, Cloudflare R2, MinIO, DigitalOcean Spaces.
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// Bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Local filesystem (development only).
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Provider name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }
}

/// Invoice storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// URL prefix under which stored keys are served.
    pub public_base_url: String,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Allowed MIME types for upload.
    pub allowed_mime_types: Vec<String>,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

    /// Create a new storage config with default limits.
    #[must_use]
    pub fn new(provider: StorageProvider, public_base_url: impl Into<String>) -> Self {
        Self {
            provider,
            public_base_url: public_base_url.into(),
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: Self::default_mime_types(),
        }
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Invoices are PDFs or scans.
    #[must_use]
    pub fn default_mime_types() -> Vec<String> {
        ["application/pdf", "image/png", "image/jpeg", "image/webp"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Check if a MIME type is allowed.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.iter().any(|t| t == mime_type)
    }
}

impl From<&StorageSettings> for StorageConfig {
    fn from(settings: &StorageSettings) -> Self {
        match settings {
            StorageSettings::Local {
                root,
                public_base_url,
                max_file_size,
            } => Self::new(StorageProvider::local_fs(root), public_base_url.clone())
                .with_max_file_size(max_file_size.unwrap_or(Self::DEFAULT_MAX_FILE_SIZE)),
            StorageSettings::S3 {
                endpoint,
                bucket,
                region,
                access_key_id,
                secret_access_key,
                public_base_url,
                max_file_size,
            } => Self::new(
                StorageProvider::S3 {
                    endpoint: endpoint.clone(),
                    bucket: bucket.clone(),
                    access_key_id: access_key_id.clone(),
                    secret_access_key: secret_access_key.clone(),
                    region: region.clone(),
                },
                public_base_url.clone(),
            )
            .with_max_file_size(max_file_size.unwrap_or(Self::DEFAULT_MAX_FILE_SIZE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorageConfig::new(StorageProvider::local_fs("./media"), "http://localhost/media");
        assert_eq!(config.max_file_size, StorageConfig::DEFAULT_MAX_FILE_SIZE);
        assert!(config.is_mime_type_allowed("application/pdf"));
        assert!(config.is_mime_type_allowed("image/jpeg"));
        assert!(!config.is_mime_type_allowed("text/html"));
        assert!(!config.is_mime_type_allowed("application/x-msdownload"));
    }

    #[test]
    fn test_from_settings() {
        let settings = StorageSettings::S3 {
            endpoint: "https://s3.eu-west-1.amazonaws.com".to_string(),
            bucket: "helptax-facturas".to_string(),
            region: "eu-west-1".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            public_base_url: "https://cdn.example.com".to_string(),
            max_file_size: Some(2048),
        };

        let config = StorageConfig::from(&settings);
        assert_eq!(config.provider.name(), "s3");
        assert_eq!(config.max_file_size, 2048);
        assert_eq!(config.public_base_url, "https://cdn.example.com");
    }
}
