//! Income routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::PeriodQuery;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{JsonBody, PathId, QueryParams},
    middleware::AuthUser,
};
use helptax_core::fiscal::PeriodFilter;
use helptax_core::records::{IncomeInput, TaxLine, Validate, validate_batch};
use helptax_db::{IncomeRepository, entities::ingresos};
use helptax_shared::{
    AppError, FieldError,
    types::{IncomeId, serialize_money},
};

/// Creates the income routes (auth middleware applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ingresos/", get(list_incomes).post(create_income))
        .route("/ingresos/bulk_create/", post(bulk_create_incomes))
        .route(
            "/ingresos/{id}/",
            get(get_income)
                .put(replace_income)
                .patch(patch_income)
                .delete(delete_income),
        )
}

/// Income as returned to clients, with derived tax amounts.
#[derive(Debug, Serialize)]
pub struct IncomeResponse {
    /// Record ID.
    pub id: Uuid,
    /// Invoice date.
    pub fecha: NaiveDate,
    /// Description.
    pub descripcion: String,
    /// Client name.
    pub cliente: String,
    /// Base amount.
    #[serde(serialize_with = "serialize_money")]
    pub importe: Decimal,
    /// VAT percentage.
    pub iva_porcentaje: i32,
    /// VAT amount.
    #[serde(serialize_with = "serialize_money")]
    pub iva_importe: Decimal,
    /// Withholding percentage.
    pub irpf_porcentaje: i32,
    /// Withholding amount.
    #[serde(serialize_with = "serialize_money")]
    pub irpf_importe: Decimal,
    /// Base plus VAT.
    #[serde(serialize_with = "serialize_money")]
    pub total: Decimal,
    /// Quarter.
    pub trimestre: i32,
    /// Year.
    #[serde(rename = "año")]
    pub year: i32,
}

impl From<&ingresos::Model> for IncomeResponse {
    fn from(row: &ingresos::Model) -> Self {
        Self {
            id: row.id,
            fecha: row.fecha,
            descripcion: row.descripcion.clone(),
            cliente: row.cliente.clone(),
            importe: row.importe,
            iva_porcentaje: row.iva_porcentaje,
            iva_importe: row.vat_amount(),
            irpf_porcentaje: row.irpf_porcentaje,
            irpf_importe: row.withholding_amount(),
            total: row.total(),
            trimestre: row.trimestre,
            year: row.year,
        }
    }
}

/// Body of `POST /ingresos/bulk_create/`.
#[derive(Debug, Deserialize)]
pub struct BulkIncomeRequest {
    /// Incomes to create together.
    pub ingresos: Option<Vec<IncomeInput>>,
}

fn respond(rows: &[ingresos::Model]) -> Json<Vec<IncomeResponse>> {
    Json(rows.iter().map(IncomeResponse::from).collect())
}

/// GET /ingresos/
async fn list_incomes(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> ApiResult<Json<Vec<IncomeResponse>>> {
    let filter = PeriodFilter::parse(query.trimestre.as_deref(), query.year.as_deref())?;
    let rows = IncomeRepository::new((*state.db).clone())
        .list(auth.user_id(), filter)
        .await?;

    Ok(respond(&rows))
}

/// POST /ingresos/
async fn create_income(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(input): JsonBody<IncomeInput>,
) -> ApiResult<(StatusCode, Json<IncomeResponse>)> {
    let draft = input.validate().map_err(AppError::InvalidFields)?;
    let row = IncomeRepository::new((*state.db).clone())
        .create(auth.user_id(), &draft)
        .await?;

    info!(user_id = %auth.user_id(), income_id = %row.id, "Income created");
    Ok((StatusCode::CREATED, Json(IncomeResponse::from(&row))))
}

/// POST /ingresos/bulk_create/
///
/// All items are validated before anything is written, and the writes share
/// one transaction.
async fn bulk_create_incomes(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<BulkIncomeRequest>,
) -> ApiResult<(StatusCode, Json<Vec<IncomeResponse>>)> {
    let items = payload.ingresos.ok_or_else(|| {
        AppError::InvalidFields(vec![FieldError::new(
            "ingresos",
            "This field is required.",
        )])
    })?;
    let drafts = validate_batch("ingresos", &items).map_err(AppError::InvalidFields)?;

    let rows = IncomeRepository::new((*state.db).clone())
        .bulk_create(auth.user_id(), &drafts)
        .await?;

    info!(user_id = %auth.user_id(), count = rows.len(), "Incomes bulk created");
    Ok((StatusCode::CREATED, respond(&rows)))
}

/// GET /ingresos/{id}/
async fn get_income(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(id): PathId<IncomeId>,
) -> ApiResult<Json<IncomeResponse>> {
    let row = IncomeRepository::new((*state.db).clone())
        .find(auth.user_id(), id)
        .await?;

    Ok(Json(IncomeResponse::from(&row)))
}

async fn save(
    state: &AppState,
    auth: &AuthUser,
    id: IncomeId,
    input: &IncomeInput,
) -> ApiResult<Json<IncomeResponse>> {
    let draft = input.validate().map_err(AppError::InvalidFields)?;
    let row = IncomeRepository::new((*state.db).clone())
        .update(auth.user_id(), id, &draft)
        .await?;

    info!(user_id = %auth.user_id(), income_id = %row.id, "Income updated");
    Ok(Json(IncomeResponse::from(&row)))
}

/// PUT /ingresos/{id}/
async fn replace_income(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(id): PathId<IncomeId>,
    JsonBody(input): JsonBody<IncomeInput>,
) -> ApiResult<Json<IncomeResponse>> {
    let current = IncomeRepository::new((*state.db).clone())
        .find(auth.user_id(), id)
        .await?;
    let replacement = input.replacing(current.to_input());

    save(&state, &auth, id, &replacement).await
}

/// PATCH /ingresos/{id}/
async fn patch_income(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(id): PathId<IncomeId>,
    JsonBody(input): JsonBody<IncomeInput>,
) -> ApiResult<Json<IncomeResponse>> {
    let current = IncomeRepository::new((*state.db).clone())
        .find(auth.user_id(), id)
        .await?;
    let merged = input.merged_onto(current.to_input());

    save(&state, &auth, id, &merged).await
}

/// DELETE /ingresos/{id}/
async fn delete_income(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(id): PathId<IncomeId>,
) -> ApiResult<StatusCode> {
    IncomeRepository::new((*state.db).clone())
        .delete(auth.user_id(), id)
        .await?;

    info!(user_id = %auth.user_id(), income_id = %id, "Income deleted");
    Ok(StatusCode::NO_CONTENT)
}
