//! Current user, fiscal profile and session check routes.

use axum::{Json, Router, extract::State, routing::get};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, extractors::JsonBody, middleware::AuthUser};
use helptax_core::auth::ProfileInput;
use helptax_db::{
    ProfileRepository, UserRepository,
    entities::{perfiles_autonomos, users},
};
use helptax_shared::{AppError, FieldError};

const MAX_NAME: usize = 150;

/// Creates the user routes (auth middleware applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/me/", get(get_me).put(update_me).patch(update_me))
        .route(
            "/user/perfil/",
            get(get_profile).put(update_profile).patch(update_profile),
        )
        .route("/check-auth/", get(check_auth))
}

/// Fiscal profile as returned to clients.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// Profile ID.
    pub id: Uuid,
    /// Owner's login email.
    pub email: String,
    /// Fiscal name.
    pub nombre_fiscal: String,
    /// Tax ID.
    pub nif: String,
    /// Street address.
    pub direccion: String,
    /// Postal code.
    pub codigo_postal: String,
    /// City.
    pub ciudad: String,
    /// Province.
    pub provincia: String,
    /// Default withholding percentage.
    pub tipo_irpf_default: i32,
    /// VAT regime.
    pub regimen_iva: String,
    /// Registration date.
    pub fecha_alta: NaiveDate,
    /// Whether the profile is active.
    pub activo: bool,
}

impl ProfileResponse {
    fn new(perfil: perfiles_autonomos::Model, email: &str) -> Self {
        Self {
            id: perfil.id,
            email: email.to_string(),
            nombre_fiscal: perfil.nombre_fiscal,
            nif: perfil.nif,
            direccion: perfil.direccion,
            codigo_postal: perfil.codigo_postal,
            ciudad: perfil.ciudad,
            provincia: perfil.provincia,
            tipo_irpf_default: perfil.tipo_irpf_default,
            regimen_iva: perfil.regimen_iva,
            fecha_alta: perfil.fecha_alta,
            activo: perfil.activo,
        }
    }
}

/// Current user with their profile.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Fiscal profile, if any.
    pub perfil: Option<ProfileResponse>,
}

impl UserResponse {
    fn new(user: users::Model, perfil: Option<perfiles_autonomos::Model>) -> Self {
        let perfil = perfil.map(|p| ProfileResponse::new(p, &user.email));
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            perfil,
        }
    }
}

/// Body of `PUT /user/me/`; only names are editable.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
}

impl UpdateUserRequest {
    fn check(&self) -> Result<(), AppError> {
        let errors: Vec<FieldError> = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .as_ref()
                .filter(|v| v.trim().chars().count() > MAX_NAME)
                .map(|_| {
                    FieldError::new(
                        field,
                        format!("Ensure this field has no more than {MAX_NAME} characters."),
                    )
                })
        })
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidFields(errors))
        }
    }
}

async fn load_me(state: &AppState, auth: &AuthUser) -> ApiResult<UserResponse> {
    let (user, perfil) = UserRepository::new((*state.db).clone())
        .find_with_profile(auth.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".into()))?;

    Ok(UserResponse::new(user, perfil))
}

/// GET /user/me/
async fn get_me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserResponse>> {
    Ok(Json(load_me(&state, &auth).await?))
}

/// PUT /user/me/
async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    payload.check()?;

    UserRepository::new((*state.db).clone())
        .update_names(
            auth.user_id(),
            payload.first_name.as_deref(),
            payload.last_name.as_deref(),
        )
        .await?;

    info!(user_id = %auth.user_id(), "User names updated");
    Ok(Json(load_me(&state, &auth).await?))
}

async fn owner_email(state: &AppState, auth: &AuthUser) -> ApiResult<String> {
    let user = UserRepository::new((*state.db).clone())
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".into()))?;

    Ok(user.email)
}

/// GET /user/perfil/
async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let perfil = ProfileRepository::new((*state.db).clone())
        .find_by_user(auth.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("Perfil no encontrado".into()))?;
    let email = owner_email(&state, &auth).await?;

    Ok(Json(ProfileResponse::new(perfil, &email)))
}

/// PUT /user/perfil/
///
/// Omitted fields keep their stored values.
async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(input): JsonBody<ProfileInput>,
) -> ApiResult<Json<ProfileResponse>> {
    let profiles = ProfileRepository::new((*state.db).clone());
    let current = profiles
        .find_by_user(auth.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("Perfil no encontrado".into()))?;

    let draft = input
        .apply_to(&current.to_draft())
        .map_err(AppError::InvalidFields)?;
    let perfil = profiles.update(auth.user_id(), &draft).await?;
    let email = owner_email(&state, &auth).await?;

    info!(user_id = %auth.user_id(), "Profile updated");
    Ok(Json(ProfileResponse::new(perfil, &email)))
}

/// GET /check-auth/
async fn check_auth(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Value>> {
    let (user, perfil) = UserRepository::new((*state.db).clone())
        .find_with_profile(auth.user_id())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado".into()))?;

    Ok(Json(json!({
        "is_authenticated": true,
        "email": user.email,
        "nombre": perfil.map(|p| p.nombre_fiscal),
    })))
}
