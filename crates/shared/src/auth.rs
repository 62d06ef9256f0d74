//! Authentication types for JWT and tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which half of a token pair a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived token sent as `Authorization: Bearer`.
    Access,
    /// Long-lived token exchanged for new access tokens.
    Refresh,
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Token kind.
    pub typ: TokenKind,
    /// Unique token ID.
    pub jti: Uuid,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, typ: TokenKind, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id,
            typ,
            jti: Uuid::new_v4(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns true for access tokens.
    #[must_use]
    pub fn is_access(&self) -> bool {
        self.typ == TokenKind::Access
    }
}

/// Token pair returned after login or registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived).
    pub access: String,
    /// Refresh token (long-lived).
    pub refresh: String,
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    #[serde(default)]
    pub email: Option<String>,
    /// User password.
    #[serde(default)]
    pub password: Option<String>,
}

/// Registration request payload.
///
/// Every field is optional at the serde level so missing ones can be
/// reported together instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    /// Login email.
    pub email: Option<String>,
    /// Password.
    pub password1: Option<String>,
    /// Password confirmation.
    pub password2: Option<String>,
    /// Fiscal name.
    pub nombre_fiscal: Option<String>,
    /// Tax ID.
    pub nif: Option<String>,
    /// Street address.
    pub direccion: Option<String>,
    /// Postal code.
    pub codigo_postal: Option<String>,
    /// City.
    pub ciudad: Option<String>,
    /// Province.
    pub provincia: Option<String>,
    /// Default withholding percentage.
    pub tipo_irpf_default: Option<i32>,
}

/// Refresh token request.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token.
    pub refresh: String,
}

/// Logout request.
#[derive(Debug, Clone, Deserialize)]
pub struct LogoutRequest {
    /// The refresh token to revoke.
    pub refresh: String,
}

/// Profile fields echoed in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    /// Fiscal name.
    pub nombre_fiscal: String,
    /// Tax ID.
    pub nif: String,
    /// City.
    pub ciudad: String,
}

/// User info returned in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUserInfo {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
    /// Profile, absent for accounts created without one.
    pub perfil: Option<ProfileSummary>,
}

/// Login and registration response payload.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// Access token.
    pub access: String,
    /// Refresh token.
    pub refresh: String,
    /// Authenticated user.
    pub user: AuthUserInfo,
}

impl AuthResponse {
    /// Builds a response from a freshly issued pair.
    #[must_use]
    pub fn new(tokens: TokenPair, user: AuthUserInfo) -> Self {
        Self {
            access: tokens.access,
            refresh: tokens.refresh,
            user,
        }
    }
}

/// Tax ID existence check request.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckNifRequest {
    /// Tax ID to look up.
    #[serde(default)]
    pub nif: String,
}
