//! JWT token generation and validation.
//!
//! Issues access/refresh pairs. Both halves are HS256 tokens signed with the
//! same secret; the `typ` claim tells them apart.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{Claims, TokenKind, TokenPair};
use crate::config::JwtSettings;

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expires_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expires_secs: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_expires_secs: 3600,
            refresh_token_expires_secs: 604_800,
        }
    }
}

impl TryFrom<&JwtSettings> for JwtConfig {
    type Error = ::config::ConfigError;

    /// Rejects zero or out-of-range lifetimes; a session must expire after
    /// it is created.
    fn try_from(settings: &JwtSettings) -> Result<Self, Self::Error> {
        let lifetime = |name: &str, secs: u64| {
            i64::try_from(secs)
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ::config::ConfigError::Message(format!(
                        "jwt.{name} must be between 1 and {} seconds",
                        i64::MAX
                    ))
                })
        };

        Ok(Self {
            secret: settings.secret.clone(),
            access_token_expires_secs: lifetime(
                "access_token_expiry_secs",
                settings.access_token_expiry_secs,
            )?,
            refresh_token_expires_secs: lifetime(
                "refresh_token_expiry_secs",
                settings.refresh_token_expiry_secs,
            )?,
        })
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is valid but of the wrong kind for this use.
    #[error("wrong token type")]
    WrongKind,
}

/// A refresh token together with its expiry, for session bookkeeping.
#[derive(Debug, Clone)]
pub struct IssuedPair {
    /// Token strings.
    pub tokens: TokenPair,
    /// When the refresh half stops being accepted.
    pub refresh_expires_at: DateTime<Utc>,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_secs", &self.config.access_token_expires_secs)
            .field("refresh_secs", &self.config.refresh_token_expires_secs)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Generates an access token for a user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String, JwtError> {
        let expires_at = Utc::now() + Duration::seconds(self.config.access_token_expires_secs);
        self.sign(&Claims::new(user_id, TokenKind::Access, expires_at))
    }

    /// Issues a fresh access/refresh pair.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn issue_pair(&self, user_id: Uuid) -> Result<IssuedPair, JwtError> {
        let access = self.generate_access_token(user_id)?;
        let refresh_expires_at =
            Utc::now() + Duration::seconds(self.config.refresh_token_expires_secs);
        let refresh = self.sign(&Claims::new(
            user_id,
            TokenKind::Refresh,
            refresh_expires_at,
        ))?;

        Ok(IssuedPair {
            tokens: TokenPair { access, refresh },
            refresh_expires_at,
        })
    }

    /// Validates and decodes a token of any kind.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired, or
    /// `JwtError::DecodingError` if it is malformed or badly signed.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }

    /// Validates a token and requires it to be of the given kind.
    ///
    /// # Errors
    ///
    /// Same as [`Self::validate_token`], plus `JwtError::WrongKind`.
    pub fn validate_kind(&self, token: &str, kind: TokenKind) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.typ == kind {
            Ok(claims)
        } else {
            Err(JwtError::WrongKind)
        }
    }
}
