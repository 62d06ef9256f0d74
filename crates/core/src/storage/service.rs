//! Storage service implementation using Apache OpenDAL.

use bytes::Bytes;
use chrono::{Datelike, NaiveDate};
use opendal::{ErrorKind, Operator, services};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Prefix for every invoice key.
pub const INVOICE_PREFIX: &str = "facturas";

/// An invoice file received from a client.
#[derive(Clone)]
pub struct InvoiceUpload {
    /// Original filename.
    pub filename: String,
    /// Content type (MIME type).
    pub content_type: String,
    /// File contents.
    pub data: Bytes,
}

impl std::fmt::Debug for InvoiceUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoiceUpload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Storage service for expense invoices.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl std::fmt::Debug for StorageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageService")
            .field("provider", &self.config.provider.name())
            .field("public_base_url", &self.config.public_base_url)
            .finish_non_exhaustive()
    }
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Operator::new(builder).map(|b| b.finish())
            }
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::Configuration("invalid path".to_string()))?;
                Operator::new(services::Fs::default().root(root)).map(|b| b.finish())
            }
        };

        operator.map_err(|e| StorageError::Configuration(e.to_string()))
    }

    /// Validate an upload against the configured limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is empty, too large or of a refused type.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size == 0 {
            return Err(StorageError::EmptyFile);
        }
        if size > self.config.max_file_size {
            return Err(StorageError::FileTooLarge {
                size,
                max: self.config.max_file_size,
            });
        }
        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::InvalidMimeType {
                mime_type: content_type.to_string(),
            });
        }

        Ok(())
    }

    /// Storage key for an invoice uploaded on `date`.
    ///
    /// Format: `facturas/{YYYY}/{MM}/{id}_{sanitized_filename}`
    #[must_use]
    pub fn invoice_key(date: NaiveDate, id: Uuid, filename: &str) -> String {
        format!(
            "{INVOICE_PREFIX}/{:04}/{:02}/{id}_{}",
            date.year(),
            date.month(),
            sanitize_filename(filename)
        )
    }

    /// Validates and writes an invoice, returning its key.
    ///
    /// # Errors
    ///
    /// Returns a validation error or the backend failure.
    pub async fn store_invoice(
        &self,
        upload: InvoiceUpload,
        date: NaiveDate,
    ) -> Result<String, StorageError> {
        let size = u64::try_from(upload.data.len()).unwrap_or(u64::MAX);
        self.validate_upload(&upload.content_type, size)?;

        let key = Self::invoice_key(date, Uuid::now_v7(), &upload.filename);
        self.operator
            .write_with(&key, upload.data)
            .content_type(&upload.content_type)
            .await?;

        Ok(key)
    }

    /// Public URL of a stored key.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.config.public_base_url.trim_end_matches('/'))
    }

    /// Delete a file from storage. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if a file exists in storage.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than a missing key.
    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self.operator.stat(key).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub const fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Sanitize filename for storage key.
///
/// Only ASCII alphanumerics, dots, hyphens and underscores survive; the
/// result is capped at 100 characters.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(100)
        .collect();

    if sanitized.trim_matches('.').is_empty() {
        "factura".to_string()
    } else {
        sanitized
    }
}
