//! Quarterly summary and dashboard routes.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{Datelike, Local};
use serde::Serialize;

use super::{PeriodQuery, gastos::ExpenseResponse, ingresos::IncomeResponse};
use crate::{AppState, error::ApiResult, extractors::QueryParams, middleware::AuthUser};
use helptax_core::dashboard::DashboardStats;
use helptax_core::fiscal::FiscalQuarter;
use helptax_core::summary::{QuarterlySummary, SummaryService};
use helptax_db::{DashboardRepository, ExpenseRepository, IncomeRepository};

/// Creates the summary routes (auth middleware applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/resumen/calcular/", get(calculate_summary))
        .route("/resumen/dashboard_stats/", get(dashboard_stats))
}

/// Summary totals plus the records they were computed from.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Totals.
    #[serde(flatten)]
    pub summary: QuarterlySummary,
    /// Incomes of the quarter.
    pub ingresos_detalle: Vec<IncomeResponse>,
    /// Expenses of the quarter.
    pub gastos_detalle: Vec<ExpenseResponse>,
}

fn current_year() -> i32 {
    Local::now().year()
}

/// GET /resumen/calcular/?trimestre=N&año=Y
///
/// The period is checked before any query runs.
async fn calculate_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> ApiResult<Json<SummaryResponse>> {
    let period = FiscalQuarter::from_query(
        query.trimestre.as_deref(),
        query.year.as_deref(),
        current_year(),
    )?;

    let owner = auth.user_id();
    let incomes_repo = IncomeRepository::new((*state.db).clone());
    let expenses_repo = ExpenseRepository::new((*state.db).clone());
    let (incomes, expenses) = tokio::try_join!(
        incomes_repo.in_quarter(owner, &period),
        expenses_repo.in_quarter(owner, &period),
    )?;

    let summary = SummaryService::calculate(&period, &incomes, &expenses, state.tax_policy);
    let storage = state.storage.as_deref();

    Ok(Json(SummaryResponse {
        summary,
        ingresos_detalle: incomes.iter().map(IncomeResponse::from).collect(),
        gastos_detalle: expenses
            .iter()
            .map(|row| ExpenseResponse::new(row, storage))
            .collect(),
    }))
}

/// GET /resumen/dashboard_stats/
async fn dashboard_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<DashboardStats>> {
    let stats = DashboardRepository::new((*state.db).clone())
        .stats(auth.user_id(), current_year())
        .await?;

    Ok(Json(stats))
}
