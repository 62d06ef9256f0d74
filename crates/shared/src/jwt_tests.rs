//! Unit tests for JWT functionality.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::{Claims, TokenKind};
use crate::config::JwtSettings;
use crate::jwt::{JwtConfig, JwtError, JwtService};

fn create_test_service() -> JwtService {
    JwtService::new(JwtConfig {
        secret: "test-secret-key-for-testing".to_string(),
        access_token_expires_secs: 900,
        refresh_token_expires_secs: 604_800,
    })
}

#[test]
fn test_claims_new_sets_correct_fields() {
    let user_id = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::hours(1);

    let claims = Claims::new(user_id, TokenKind::Access, expires_at);

    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.user_id(), user_id);
    assert!(claims.is_access());
    assert!(claims.iat <= Utc::now().timestamp());
    assert_eq!(claims.exp, expires_at.timestamp());
}

#[test]
fn test_claims_have_unique_ids() {
    let user_id = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::hours(1);

    let a = Claims::new(user_id, TokenKind::Refresh, expires_at);
    let b = Claims::new(user_id, TokenKind::Refresh, expires_at);

    assert_ne!(a.jti, b.jti);
}

#[test]
fn test_access_token_round_trip() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();

    let token = service.generate_access_token(user_id).unwrap();
    let claims = service.validate_kind(&token, TokenKind::Access).unwrap();

    assert_eq!(claims.user_id(), user_id);
}

#[test]
fn test_issue_pair_kinds() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();

    let issued = service.issue_pair(user_id).unwrap();

    assert_ne!(issued.tokens.access, issued.tokens.refresh);
    assert!(issued.refresh_expires_at > Utc::now() + Duration::days(6));
    assert!(matches!(
        service.validate_kind(&issued.tokens.refresh, TokenKind::Access),
        Err(JwtError::WrongKind)
    ));
    let refresh = service
        .validate_kind(&issued.tokens.refresh, TokenKind::Refresh)
        .unwrap();
    assert_eq!(refresh.user_id(), user_id);
}

#[test]
fn test_invalid_token() {
    let service = create_test_service();
    let result = service.validate_token("invalid.token.here");
    assert!(matches!(result, Err(JwtError::DecodingError(_))));
}

#[test]
fn test_token_from_other_secret_rejected() {
    let service = create_test_service();
    let other = JwtService::new(JwtConfig {
        secret: "another-secret".to_string(),
        ..JwtConfig::default()
    });

    let token = other.generate_access_token(Uuid::new_v4()).unwrap();
    assert!(service.validate_token(&token).is_err());
}

#[test]
fn test_expired_token() {
    let service = JwtService::new(JwtConfig {
        secret: "test-secret-key-for-testing".to_string(),
        access_token_expires_secs: -600,
        refresh_token_expires_secs: 604_800,
    });

    let token = service.generate_access_token(Uuid::new_v4()).unwrap();
    assert!(matches!(service.validate_token(&token), Err(JwtError::Expired)));
}

#[test]
fn test_debug_hides_secret() {
    let service = create_test_service();
    let debug = format!("{service:?}");
    assert!(!debug.contains("test-secret-key-for-testing"));
    assert!(debug.contains("[hidden]"));
}

fn settings(access: u64, refresh: u64) -> JwtSettings {
    JwtSettings {
        secret: "test-secret-key-for-testing".to_string(),
        access_token_expiry_secs: access,
        refresh_token_expiry_secs: refresh,
    }
}

#[test]
fn test_sub_day_refresh_lifetime_is_kept() {
    let config = JwtConfig::try_from(&settings(30, 3600)).unwrap();
    assert_eq!(config.access_token_expires_secs, 30);
    assert_eq!(config.refresh_token_expires_secs, 3600);

    let before = Utc::now();
    let pair = JwtService::new(config).issue_pair(Uuid::new_v4()).unwrap();
    let lifetime = pair.refresh_expires_at - before;
    assert!(lifetime > Duration::minutes(59));
    assert!(lifetime <= Duration::minutes(61));
}

#[test]
fn test_zero_lifetime_rejected() {
    assert!(JwtConfig::try_from(&settings(0, 3600)).is_err());
    assert!(JwtConfig::try_from(&settings(3600, 0)).is_err());
}

#[test]
fn test_lifetime_beyond_i64_rejected() {
    assert!(JwtConfig::try_from(&settings(3600, u64::MAX)).is_err());
}
