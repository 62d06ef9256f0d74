//! Money amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount is a `rust_decimal::Decimal`; stored bases have two fraction
//! digits and fit `NUMERIC(10,2)`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Fraction digits kept by stored amounts.
pub const MONEY_SCALE: u32 = 2;

/// Total significant digits allowed by the storage column.
pub const MONEY_PRECISION: u32 = 10;

/// Why a decimal is not an acceptable base amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Zero or negative.
    #[error("must be greater than 0")]
    NotPositive,

    /// More than two fraction digits.
    #[error("must have at most 2 decimal places")]
    TooManyDecimals,

    /// Does not fit ten digits.
    #[error("must have at most 10 digits")]
    TooManyDigits,
}

/// A validated base amount: positive, two decimals at most, ten digits at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Validates a decimal as a base amount.
    ///
    /// # Errors
    ///
    /// Returns the first rule the value breaks.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }

        let normalized = value.normalize();
        if normalized.scale() > MONEY_SCALE {
            return Err(AmountError::TooManyDecimals);
        }

        let mut scaled = normalized;
        scaled.rescale(MONEY_SCALE);
        if scaled.mantissa().unsigned_abs() >= 10u128.pow(MONEY_PRECISION) {
            return Err(AmountError::TooManyDigits);
        }

        Ok(Self(scaled))
    }

    /// Returns the inner decimal.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Rounds to cents, ties to even.
#[must_use]
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Renders a value as a string with exactly two fraction digits.
#[must_use]
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_cents(value))
}

/// Serde helper for money fields in responses: `"1210.00"`.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize_money<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_money(*value))
}
