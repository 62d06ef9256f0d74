//! VAT (IVA) and withholding (IRPF) arithmetic.
//!
//! Percentages are whole numbers. A base with two fraction digits times an
//! integer percentage over 100 is always exact with at most four fraction
//! digits, so nothing here rounds.

mod error;
mod rates;

pub use error::TaxError;
pub use rates::{TaxPolicy, VatRate, WithholdingRate};

use rust_decimal::Decimal;

/// `base * percent / 100`, exact.
#[must_use]
pub fn percentage_of(base: Decimal, percent: u32) -> Decimal {
    base * Decimal::from(percent) / Decimal::ONE_HUNDRED
}
