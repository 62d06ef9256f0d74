//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api`
//! - Authentication middleware
//! - Request extractors
//! - Error responses

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use axum::{Router, extract::DefaultBodyLimit, http::HeaderValue};
use helptax_core::storage::StorageService;
use helptax_core::tax::TaxPolicy;
use helptax_shared::{AppConfig, JwtService};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Storage service for expense invoices (optional).
    pub storage: Option<Arc<StorageService>>,
    /// Rates applied by the quarterly summary.
    pub tax_policy: TaxPolicy,
}

/// HTTP-level router settings.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Allowed CORS origins; empty allows any.
    pub allowed_origins: Vec<String>,
    /// Maximum request body size, in bytes.
    pub body_limit_bytes: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            body_limit_bytes: 12 * 1024 * 1024,
        }
    }
}

impl From<&AppConfig> for RouterOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            allowed_origins: config.cors.allowed_origins.clone(),
            body_limit_bytes: config.server.body_limit_bytes,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| warn!(origin = %origin, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

/// Creates the main application router.
pub fn create_router(state: AppState, options: &RouterOptions) -> Router {
    Router::new()
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::max(options.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&options.allowed_origins))
        .with_state(state)
}
