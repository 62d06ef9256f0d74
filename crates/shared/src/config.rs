//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Invoice storage; uploads are refused when absent.
    #[serde(default)]
    pub storage: Option<StorageSettings>,
    /// Tax policy knobs.
    #[serde(default)]
    pub tax: TaxSettings,
    /// Cross-origin settings for the browser frontend.
    #[serde(default)]
    pub cors: CorsSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body, in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_body_limit() -> usize {
    12 * 1024 * 1024
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration as read from config sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token expiration in seconds.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    3600 // 1 hour
}

fn default_refresh_token_expiry() -> u64 {
    604_800 // 7 days
}

/// Invoice storage backend selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum StorageSettings {
    /// Local directory, for development.
    Local {
        /// Root directory for stored files.
        root: String,
        /// URL prefix that serves `root`.
        public_base_url: String,
        /// Maximum upload size in bytes.
        max_file_size: Option<u64>,
    },
    /// S3-compatible bucket.
    S3 {
        /// Endpoint URL.
        endpoint: String,
        /// Bucket name.
        bucket: String,
        /// Region.
        region: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// URL prefix that serves the bucket.
        public_base_url: String,
        /// Maximum upload size in bytes.
        max_file_size: Option<u64>,
    },
}

/// Tax policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxSettings {
    /// Percentage of quarterly net profit reported as withholding due.
    #[serde(default = "default_withholding_due_percent")]
    pub withholding_due_percent: u32,
}

impl Default for TaxSettings {
    fn default() -> Self {
        Self {
            withholding_due_percent: default_withholding_due_percent(),
        }
    }
}

fn default_withholding_due_percent() -> u32 {
    20
}

/// CORS configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins; any origin is allowed when empty.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier ones: `config/default`,
    /// `config/{RUN_MODE}`, then `HELPTAX__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("HELPTAX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_env_applies_defaults() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("test-nonexistent")),
                ("HELPTAX__DATABASE__URL", Some("postgres://localhost/helptax")),
                ("HELPTAX__JWT__SECRET", Some("s3cret")),
                ("HELPTAX__TAX__WITHHOLDING_DUE_PERCENT", None::<&str>),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/helptax");
                assert_eq!(config.jwt.secret, "s3cret");
                assert_eq!(config.jwt.access_token_expiry_secs, 3600);
                assert_eq!(config.server.port, 8000);
                assert_eq!(config.tax.withholding_due_percent, 20);
                assert!(config.storage.is_none());
                assert!(config.cors.allowed_origins.is_empty());
            },
        );
    }

    #[test]
    fn test_withholding_rate_is_configurable() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("test-nonexistent")),
                ("HELPTAX__DATABASE__URL", Some("postgres://localhost/helptax")),
                ("HELPTAX__JWT__SECRET", Some("s3cret")),
                ("HELPTAX__TAX__WITHHOLDING_DUE_PERCENT", Some("15")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.tax.withholding_due_percent, 15);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("test-nonexistent")),
                ("HELPTAX__DATABASE__URL", None::<&str>),
                ("HELPTAX__JWT__SECRET", Some("s3cret")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
