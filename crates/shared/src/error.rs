//! Application-wide error types.

use serde::Serialize;
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// A single failed input field.
///
/// `index` is set when the field belongs to one item of a bulk payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Position of the offending item in a bulk payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Field name as it appears in the request body.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldError {
    /// Creates a field error for a single-record payload.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            index: None,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Tags this error with the position of its item in a bulk payload.
    #[must_use]
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(i) => write!(f, "[{i}].{}: {}", self.field, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Access denied.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or out-of-range request parameter.
    #[error("Validation error: {0}")]
    Validation(String),

    /// One or more body fields failed validation.
    #[error("Validation error: {} invalid field(s)", .0.len())]
    InvalidFields(Vec<FieldError>),

    /// A unique value (email, NIF) is already registered.
    #[error("Conflict on {field}: {message}")]
    Conflict {
        /// Field holding the duplicate value.
        field: String,
        /// Explanation shown to the client.
        message: String,
    },

    /// A required backing service is not configured.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) | Self::InvalidFields(_) | Self::Conflict { .. } => 400,
            Self::Unavailable(_) => 503,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) | Self::InvalidFields(_) => "VALIDATION_ERROR",
            Self::Conflict { .. } => "CONFLICT",
            Self::Unavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Database(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true when the error must be hidden from clients.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Message safe to return to a client.
    ///
    /// Server-side failures collapse to a fixed string; their detail only goes to logs.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "An internal error occurred".to_string(),
            Self::InvalidFields(_) => "Invalid input".to_string(),
            Self::Conflict { message, .. } => message.clone(),
            Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Validation(m)
            | Self::Unavailable(m) => m.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized(String::new()), 401, "UNAUTHORIZED")]
    #[case(AppError::Forbidden(String::new()), 403, "FORBIDDEN")]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::InvalidFields(vec![]), 400, "VALIDATION_ERROR")]
    #[case(
        AppError::Conflict { field: "nif".into(), message: String::new() },
        400,
        "CONFLICT"
    )]
    #[case(AppError::Unavailable(String::new()), 503, "SERVICE_UNAVAILABLE")]
    #[case(AppError::Database(String::new()), 500, "INTERNAL_ERROR")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_status_and_code(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_server_errors_are_opaque() {
        let err = AppError::Database("relation \"ingresos\" does not exist".into());
        assert!(err.is_server_error());
        assert_eq!(err.client_message(), "An internal error occurred");
        assert!(err.to_string().contains("ingresos"));
    }

    #[test]
    fn test_client_errors_keep_message() {
        let err = AppError::Validation("Trimestre debe ser 1, 2, 3 o 4".into());
        assert!(!err.is_server_error());
        assert_eq!(err.client_message(), "Trimestre debe ser 1, 2, 3 o 4");
    }

    #[test]
    fn test_field_error_display() {
        assert_eq!(
            FieldError::new("importe", "must be greater than 0").to_string(),
            "importe: must be greater than 0"
        );
        assert_eq!(
            FieldError::new("importe", "must be greater than 0")
                .at(2)
                .to_string(),
            "[2].importe: must be greater than 0"
        );
    }

    #[test]
    fn test_field_error_serializes_without_index() {
        let json = serde_json::to_value(FieldError::new("nif", "required")).unwrap();
        assert_eq!(json, serde_json::json!({"field": "nif", "message": "required"}));
    }
}
