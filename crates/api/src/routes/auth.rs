//! Authentication routes: login, registration, token refresh and logout.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    routing::post,
};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    AppState,
    error::ApiResult,
    extractors::JsonBody,
    middleware::AuthUser,
};
use helptax_core::auth::{hash_password, validate_registration, verify_password};
use helptax_db::{
    ProfileRepository, SessionRepository, UserRepository,
    entities::{perfiles_autonomos, users},
};
use helptax_shared::{
    AppError, TokenKind,
    auth::{
        AuthResponse, AuthUserInfo, CheckNifRequest, LoginRequest, LogoutRequest, ProfileSummary,
        RefreshRequest, RegisterRequest,
    },
    types::UserId,
};

const INVALID_CREDENTIALS: &str = "Credenciales inválidas";

/// Routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login/", post(login))
        .route("/auth/registration/", post(register))
        .route("/auth/refresh/", post(refresh))
        .route("/check-nif/", post(check_nif))
}

/// Routes that need the auth middleware.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/logout/", post(logout))
}

fn profile_summary(perfil: &perfiles_autonomos::Model) -> ProfileSummary {
    ProfileSummary {
        nombre_fiscal: perfil.nombre_fiscal.clone(),
        nif: perfil.nif.clone(),
        ciudad: perfil.ciudad.clone(),
    }
}

fn user_agent(headers: &HeaderMap) -> Option<&str> {
    headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
}

/// Issues a token pair and records its refresh session.
async fn start_session(
    state: &AppState,
    user: &users::Model,
    perfil: Option<&perfiles_autonomos::Model>,
    headers: &HeaderMap,
) -> ApiResult<AuthResponse> {
    let issued = state.jwt_service.issue_pair(user.id)?;

    SessionRepository::new((*state.db).clone())
        .create(
            UserId::from_uuid(user.id),
            &issued.tokens.refresh,
            issued.refresh_expires_at,
            user_agent(headers),
        )
        .await?;

    Ok(AuthResponse::new(
        issued.tokens,
        AuthUserInfo {
            id: user.id,
            email: user.email.clone(),
            perfil: perfil.map(profile_summary),
        },
    ))
}

/// POST /auth/login/
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (Some(email), Some(password)) = (
        payload.email.as_deref().map(str::trim).filter(|e| !e.is_empty()),
        payload.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation("Email y contraseña son requeridos".into()).into());
    };

    let user_repo = UserRepository::new((*state.db).clone());

    let Some(user) = user_repo.find_by_email(email).await? else {
        info!("Login attempt for unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()).into());
    };

    if !user.is_active {
        info!(user_id = %user.id, "Login attempt on disabled account");
        return Err(AppError::Unauthorized("Cuenta desactivada".into()).into());
    }

    if !verify_password(password, &user.password_hash)? {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()).into());
    }

    let user_id = UserId::from_uuid(user.id);
    let perfil = ProfileRepository::new((*state.db).clone())
        .find_by_user(user_id)
        .await?;
    let response = start_session(&state, &user, perfil.as_ref(), &headers).await?;
    user_repo.touch_last_login(user_id).await?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(response))
}

/// POST /auth/registration/
async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let account = validate_registration(&payload)?;
    let password_hash = hash_password(&account.password)?;

    let (user, perfil) = UserRepository::new((*state.db).clone())
        .create_with_profile(&account.email, &password_hash, &account.profile)
        .await?;

    let response = start_session(&state, &user, Some(&perfil), &headers).await?;

    info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/refresh/
async fn refresh(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RefreshRequest>,
) -> ApiResult<Json<Value>> {
    let claims = state
        .jwt_service
        .validate_kind(&payload.refresh, TokenKind::Refresh)?;

    let session = SessionRepository::new((*state.db).clone())
        .find_live(&payload.refresh)
        .await?
        .filter(|s| s.user_id == claims.sub)
        .ok_or_else(|| AppError::Unauthorized("Sesión no válida o expirada".into()))?;

    let user = UserRepository::new((*state.db).clone())
        .find_by_id(UserId::from_uuid(session.user_id))
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Unauthorized("Sesión no válida o expirada".into()))?;

    let access = state.jwt_service.generate_access_token(user.id)?;
    Ok(Json(json!({ "access": access })))
}

/// POST /auth/logout/
///
/// Revoking an unknown or foreign token is not an error; the caller ends up
/// logged out either way.
async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<LogoutRequest>,
) -> ApiResult<Json<Value>> {
    let revoked = SessionRepository::new((*state.db).clone())
        .revoke_by_token(auth.user_id(), &payload.refresh)
        .await?;

    info!(user_id = %auth.user_id(), revoked, "User logged out");
    Ok(Json(json!({ "detail": "Sesión cerrada correctamente" })))
}

/// POST /check-nif/
///
/// Registration never stores a blank NIF, so a blank query answers `false`
/// without a lookup.
async fn check_nif(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CheckNifRequest>,
) -> ApiResult<Json<Value>> {
    let nif = payload.nif.trim();
    if nif.is_empty() {
        return Ok(Json(json!({ "exists": false })));
    }

    let exists = ProfileRepository::new((*state.db).clone())
        .nif_exists(nif)
        .await?;

    Ok(Json(json!({ "exists": exists })))
}
