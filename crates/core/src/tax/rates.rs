//! Rate types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{TaxError, percentage_of};

/// VAT rates accepted on records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum VatRate {
    /// Exempt or reverse-charged operations.
    Exempt,
    /// General rate.
    #[default]
    General,
}

impl VatRate {
    /// Percentage value.
    #[must_use]
    pub const fn percent(self) -> u32 {
        match self {
            Self::Exempt => 0,
            Self::General => 21,
        }
    }

    /// VAT due on `base`.
    #[must_use]
    pub fn amount_on(self, base: Decimal) -> Decimal {
        percentage_of(base, self.percent())
    }
}

impl TryFrom<i32> for VatRate {
    type Error = TaxError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Exempt),
            21 => Ok(Self::General),
            other => Err(TaxError::InvalidVatRate(other)),
        }
    }
}

impl From<VatRate> for i32 {
    fn from(rate: VatRate) -> Self {
        match rate {
            VatRate::Exempt => 0,
            VatRate::General => 21,
        }
    }
}

/// Withholding percentage applied by the client, 0..=20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct WithholdingRate(u8);

impl WithholdingRate {
    /// Highest accepted percentage.
    pub const MAX: u8 = 20;

    /// No withholding.
    pub const NONE: Self = Self(0);

    /// Percentage value.
    #[must_use]
    pub fn percent(self) -> u32 {
        u32::from(self.0)
    }

    /// Amount withheld on `base`.
    #[must_use]
    pub fn amount_on(self, base: Decimal) -> Decimal {
        percentage_of(base, self.percent())
    }
}

impl Default for WithholdingRate {
    fn default() -> Self {
        Self(7)
    }
}

impl TryFrom<i32> for WithholdingRate {
    type Error = TaxError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|p| *p <= Self::MAX)
            .map(Self)
            .ok_or(TaxError::InvalidWithholdingRate(value))
    }
}

impl From<WithholdingRate> for i32 {
    fn from(rate: WithholdingRate) -> Self {
        Self::from(rate.0)
    }
}

/// How much of the quarterly net profit is reported as withholding due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxPolicy {
    withholding_due_percent: u32,
}

impl TaxPolicy {
    /// Creates a policy with the given percentage.
    #[must_use]
    pub const fn new(withholding_due_percent: u32) -> Self {
        Self {
            withholding_due_percent,
        }
    }

    /// Configured percentage.
    #[must_use]
    pub const fn withholding_due_percent(&self) -> u32 {
        self.withholding_due_percent
    }

    /// Withholding due for a net profit. Negative profit yields a negative figure.
    #[must_use]
    pub fn withholding_due(&self, net_profit: Decimal) -> Decimal {
        percentage_of(net_profit, self.withholding_due_percent)
    }
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self::new(20)
    }
}
