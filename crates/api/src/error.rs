//! HTTP error responses.
//!
//! Every failure leaves the API as `{"error": CODE, "message": text, ...}`.
//! Field problems go under `fields`, bulk problems under `items`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use helptax_core::auth::{PasswordError, RegistrationError};
use helptax_core::fiscal::PeriodError;
use helptax_core::storage::StorageError;
use helptax_db::RecordError;
use helptax_shared::{AppError, JwtError};
use serde_json::{Map, Value, json};
use tracing::error;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// An `AppError` on its way to the client, with optional extra body keys.
#[derive(Debug)]
pub struct ApiError {
    inner: AppError,
    details: Map<String, Value>,
}

impl ApiError {
    /// Adds a top-level key to the error body.
    #[must_use]
    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }

    /// The wrapped application error.
    #[must_use]
    pub const fn inner(&self) -> &AppError {
        &self.inner
    }

    fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("error".into(), json!(self.inner.error_code()));
        body.insert("message".into(), json!(self.inner.client_message()));

        match &self.inner {
            AppError::InvalidFields(errors) if errors.iter().any(|e| e.index.is_some()) => {
                body.insert("items".into(), json!(errors));
            }
            AppError::InvalidFields(errors) => {
                body.insert("fields".into(), json!(errors));
            }
            AppError::Conflict { field, .. } => {
                body.insert("field".into(), json!(field));
            }
            _ => {}
        }

        body.extend(self.details.clone());
        Value::Object(body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.inner.is_server_error() {
            error!(error = %self.inner, "Request failed");
        }

        let status = StatusCode::from_u16(self.inner.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(inner: AppError) -> Self {
        Self {
            inner,
            details: Map::new(),
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        AppError::from(err).into()
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string()).into()
    }
}

impl From<PeriodError> for ApiError {
    fn from(err: PeriodError) -> Self {
        AppError::Validation(err.to_string()).into()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        if err.is_client_error() {
            AppError::InvalidFields(vec![helptax_shared::FieldError::new(
                "factura",
                err.to_string(),
            )])
            .into()
        } else {
            AppError::Internal(err.to_string()).into()
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::EncodingError(_) => AppError::Internal(err.to_string()).into(),
            JwtError::Expired => AppError::Unauthorized("Token has expired".into()).into(),
            JwtError::DecodingError(_) | JwtError::WrongKind => {
                AppError::Unauthorized("Invalid or malformed token".into()).into()
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string()).into()
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        let message = err.to_string();
        match err {
            RegistrationError::MissingFields(missing) => {
                Self::from(AppError::Validation(message)).with_detail("missing_fields", json!(missing))
            }
            RegistrationError::PasswordMismatch => AppError::Validation(message).into(),
            RegistrationError::Invalid(errors) => AppError::InvalidFields(errors).into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text()).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text()).into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        AppError::NotFound("No encontrado".into()).into()
    }
}
