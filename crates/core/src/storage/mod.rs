//! Invoice storage using Apache OpenDAL.
//!
//! Vendor-agnostic object storage:
//! - S3-compatible: AWS S3, Cloudflare R2, MinIO, DigitalOcean Spaces
//! - Local filesystem (development only)
//!
//! Keys are date-partitioned (`facturas/YYYY/MM/...`). The service only
//! writes and deletes; files are served from `public_base_url`.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{INVOICE_PREFIX, InvoiceUpload, StorageService, sanitize_filename};
