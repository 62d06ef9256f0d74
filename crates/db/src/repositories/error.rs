//! Repository error type.

use helptax_shared::AppError;
use sea_orm::{DbErr, SqlErr};
use tracing::debug;

/// Unique constraints whose violation is reported back to clients.
const UNIQUE_FIELDS: [(&str, &str); 2] = [
    ("users_email_key", "email"),
    ("perfiles_autonomos_nif_key", "nif"),
];

/// Error types for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Row absent or owned by someone else.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A unique value is already taken.
    #[error("{field} already registered")]
    Duplicate {
        /// Request field holding the duplicate value.
        field: &'static str,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RecordError {
    /// Classifies a write failure, recognising known unique constraints.
    #[must_use]
    pub fn from_write(err: DbErr) -> Self {
        let field = match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => UNIQUE_FIELDS
                .iter()
                .find(|(constraint, _)| message.contains(constraint))
                .map(|(_, field)| *field),
            _ => None,
        };

        match field {
            Some(field) => {
                debug!(field, "Write rejected by unique constraint");
                Self::Duplicate { field }
            }
            None => Self::Database(err),
        }
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotFound(what) => Self::NotFound(format!("{what} no encontrado")),
            RecordError::Duplicate { field } => Self::Conflict {
                field: field.to_string(),
                message: match field {
                    "nif" => "Ya existe un perfil con este NIF".to_string(),
                    "email" => "Ya existe un usuario con este email".to_string(),
                    other => format!("{other} ya registrado"),
                },
            },
            RecordError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
