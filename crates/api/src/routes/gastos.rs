//! Expense routes, including invoice uploads.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::PeriodQuery;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ExpensePayload, JsonBody, PathId, QueryParams},
    middleware::AuthUser,
};
use helptax_core::fiscal::PeriodFilter;
use helptax_core::records::{ExpenseInput, TaxLine, Validate, validate_batch};
use helptax_core::storage::{InvoiceUpload, StorageService};
use helptax_db::{ExpenseRepository, UpdatedExpense, entities::gastos};
use helptax_shared::{
    AppError, FieldError,
    types::{ExpenseId, serialize_money},
};

/// Creates the expense routes (auth middleware applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/gastos/", get(list_expenses).post(create_expense))
        .route("/gastos/bulk_create/", post(bulk_create_expenses))
        .route(
            "/gastos/{id}/",
            get(get_expense)
                .put(replace_expense)
                .patch(patch_expense)
                .delete(delete_expense),
        )
}

/// Expense as returned to clients.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// Record ID.
    pub id: Uuid,
    /// Invoice date.
    pub fecha: NaiveDate,
    /// Description.
    pub descripcion: String,
    /// Supplier name.
    pub proveedor: String,
    /// Base amount.
    #[serde(serialize_with = "serialize_money")]
    pub importe: Decimal,
    /// VAT percentage.
    pub iva_porcentaje: i32,
    /// VAT amount.
    #[serde(serialize_with = "serialize_money")]
    pub iva_importe: Decimal,
    /// Base plus VAT.
    #[serde(serialize_with = "serialize_money")]
    pub total: Decimal,
    /// Storage key of the invoice.
    pub factura: Option<String>,
    /// Public URL of the invoice.
    pub factura_url: Option<String>,
    /// Quarter.
    pub trimestre: i32,
    /// Year.
    #[serde(rename = "año")]
    pub year: i32,
}

impl ExpenseResponse {
    /// Builds the response; `factura_url` needs the storage that holds the key.
    #[must_use]
    pub fn new(row: &gastos::Model, storage: Option<&StorageService>) -> Self {
        let factura_url = row
            .factura
            .as_deref()
            .zip(storage)
            .map(|(key, storage)| storage.public_url(key));

        Self {
            id: row.id,
            fecha: row.fecha,
            descripcion: row.descripcion.clone(),
            proveedor: row.proveedor.clone(),
            importe: row.importe,
            iva_porcentaje: row.iva_porcentaje,
            iva_importe: row.vat_amount(),
            total: row.total(),
            factura: row.factura.clone(),
            factura_url,
            trimestre: row.trimestre,
            year: row.year,
        }
    }
}

/// Body of `POST /gastos/bulk_create/`.
#[derive(Debug, Deserialize)]
pub struct BulkExpenseRequest {
    /// Expenses to create together.
    pub gastos: Option<Vec<ExpenseInput>>,
}

fn storage(state: &AppState) -> Option<&StorageService> {
    state.storage.as_deref()
}

/// Writes an upload, refusing it when no storage is configured.
async fn upload_invoice(state: &AppState, upload: InvoiceUpload) -> ApiResult<String> {
    let storage = storage(state).ok_or_else(|| {
        AppError::Unavailable("El almacenamiento de facturas no está configurado".into())
    })?;

    Ok(storage.store_invoice(upload, Utc::now().date_naive()).await?)
}

/// Best-effort removal; a leftover object is logged, not reported.
async fn discard_invoice(state: &AppState, key: &str) {
    if let Some(storage) = storage(state)
        && let Err(e) = storage.delete(key).await
    {
        warn!(key = %key, error = %e, "Failed to delete invoice");
    }
}

/// GET /gastos/
async fn list_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> ApiResult<Json<Vec<ExpenseResponse>>> {
    let filter = PeriodFilter::parse(query.trimestre.as_deref(), query.year.as_deref())?;
    let rows = ExpenseRepository::new((*state.db).clone())
        .list(auth.user_id(), filter)
        .await?;

    Ok(Json(
        rows.iter()
            .map(|row| ExpenseResponse::new(row, storage(&state)))
            .collect(),
    ))
}

/// POST /gastos/
async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: ExpensePayload,
) -> ApiResult<(StatusCode, Json<ExpenseResponse>)> {
    let draft = payload.input.validate().map_err(AppError::InvalidFields)?;

    let key = match payload.factura {
        Some(upload) => Some(upload_invoice(&state, upload).await?),
        None => None,
    };

    let row = match ExpenseRepository::new((*state.db).clone())
        .create(auth.user_id(), &draft, key.clone())
        .await
    {
        Ok(row) => row,
        Err(e) => {
            if let Some(key) = &key {
                discard_invoice(&state, key).await;
            }
            return Err(e.into());
        }
    };

    info!(
        user_id = %auth.user_id(),
        expense_id = %row.id,
        with_invoice = row.factura.is_some(),
        "Expense created"
    );
    Ok((
        StatusCode::CREATED,
        Json(ExpenseResponse::new(&row, storage(&state))),
    ))
}

/// POST /gastos/bulk_create/
///
/// Bulk rows carry no invoice.
async fn bulk_create_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<BulkExpenseRequest>,
) -> ApiResult<(StatusCode, Json<Vec<ExpenseResponse>>)> {
    let items = payload.gastos.ok_or_else(|| {
        AppError::InvalidFields(vec![FieldError::new("gastos", "This field is required.")])
    })?;
    let drafts = validate_batch("gastos", &items).map_err(AppError::InvalidFields)?;

    let rows = ExpenseRepository::new((*state.db).clone())
        .bulk_create(auth.user_id(), &drafts)
        .await?;

    info!(user_id = %auth.user_id(), count = rows.len(), "Expenses bulk created");
    Ok((
        StatusCode::CREATED,
        Json(
            rows.iter()
                .map(|row| ExpenseResponse::new(row, storage(&state)))
                .collect(),
        ),
    ))
}

/// GET /gastos/{id}/
async fn get_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(id): PathId<ExpenseId>,
) -> ApiResult<Json<ExpenseResponse>> {
    let row = ExpenseRepository::new((*state.db).clone())
        .find(auth.user_id(), id)
        .await?;

    Ok(Json(ExpenseResponse::new(&row, storage(&state))))
}

async fn save(
    state: &AppState,
    auth: &AuthUser,
    id: ExpenseId,
    input: &ExpenseInput,
    factura: Option<InvoiceUpload>,
) -> ApiResult<Json<ExpenseResponse>> {
    let draft = input.validate().map_err(AppError::InvalidFields)?;

    let key = match factura {
        Some(upload) => Some(upload_invoice(state, upload).await?),
        None => None,
    };

    let updated = ExpenseRepository::new((*state.db).clone())
        .update(auth.user_id(), id, &draft, key.clone())
        .await;

    let UpdatedExpense {
        expense,
        replaced_factura,
    } = match updated {
        Ok(updated) => updated,
        Err(e) => {
            if let Some(key) = &key {
                discard_invoice(state, key).await;
            }
            return Err(e.into());
        }
    };

    if let Some(old) = replaced_factura {
        discard_invoice(state, &old).await;
    }

    info!(user_id = %auth.user_id(), expense_id = %expense.id, "Expense updated");
    Ok(Json(ExpenseResponse::new(&expense, storage(state))))
}

/// PUT /gastos/{id}/
async fn replace_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(id): PathId<ExpenseId>,
    payload: ExpensePayload,
) -> ApiResult<Json<ExpenseResponse>> {
    let current = ExpenseRepository::new((*state.db).clone())
        .find(auth.user_id(), id)
        .await?;
    let replacement = payload.input.replacing(current.to_input());

    save(&state, &auth, id, &replacement, payload.factura).await
}

/// PATCH /gastos/{id}/
async fn patch_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(id): PathId<ExpenseId>,
    payload: ExpensePayload,
) -> ApiResult<Json<ExpenseResponse>> {
    let current = ExpenseRepository::new((*state.db).clone())
        .find(auth.user_id(), id)
        .await?;
    let merged = payload.input.merged_onto(current.to_input());

    save(&state, &auth, id, &merged, payload.factura).await
}

/// DELETE /gastos/{id}/
async fn delete_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(id): PathId<ExpenseId>,
) -> ApiResult<StatusCode> {
    let removed = ExpenseRepository::new((*state.db).clone())
        .delete(auth.user_id(), id)
        .await?;

    if let Some(key) = &removed.factura {
        discard_invoice(&state, key).await;
    }

    info!(user_id = %auth.user_id(), expense_id = %id, "Expense deleted");
    Ok(StatusCode::NO_CONTENT)
}
