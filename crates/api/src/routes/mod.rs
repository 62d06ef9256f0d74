//! API route definitions.

use axum::{Router, middleware};
use serde::Deserialize;

use crate::{AppState, middleware::auth::auth_middleware};

pub mod auth;
pub mod gastos;
pub mod health;
pub mod ingresos;
pub mod resumen;
pub mod user;


/// `?trimestre=&año=` as received; parsing happens per endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// Quarter number.
    pub trimestre: Option<String>,
    /// Year.
    #[serde(rename = "año")]
    pub year: Option<String>,
}

/// Creates the API router; everything but login, registration, token
/// refresh, NIF lookup and health requires a bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(ingresos::routes())
        .merge(gastos::routes())
        .merge(resumen::routes())
        .merge(user::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::public_routes())
        .merge(protected_routes)
}
