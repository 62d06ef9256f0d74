//! Tax rate errors.

use thiserror::Error;

/// Rejected tax percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaxError {
    /// VAT other than 0 or 21.
    #[error("IVA must be 0 or 21, got {0}")]
    InvalidVatRate(i32),

    /// Withholding outside 0..=20.
    #[error("IRPF must be between 0 and 20, got {0}")]
    InvalidWithholdingRate(i32),
}
