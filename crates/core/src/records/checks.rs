//! Field checks shared by income and expense validation.

use chrono::NaiveDate;
use helptax_shared::FieldError;
use helptax_shared::types::Amount;
use rust_decimal::Decimal;

use crate::fiscal::{FiscalQuarter, Quarter};
use crate::tax::{VatRate, WithholdingRate};

pub(super) const REQUIRED: &str = "This field is required.";

/// Description length limit.
pub(super) const MAX_DESCRIPTION: usize = 200;
/// Client and supplier name length limit.
pub(super) const MAX_PARTY: usize = 100;

/// Accumulates field errors while checking a payload.
#[derive(Debug, Default)]
pub(super) struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub(super) fn date(&mut self, field: &str, value: Option<NaiveDate>) -> Option<NaiveDate> {
        if value.is_none() {
            self.fail(field, REQUIRED);
        }
        value
    }

    pub(super) fn text(&mut self, field: &str, value: Option<&str>, max: usize) -> Option<String> {
        let Some(raw) = value else {
            self.fail(field, REQUIRED);
            return None;
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.fail(field, "This field may not be blank.");
            return None;
        }
        if trimmed.chars().count() > max {
            self.fail(field, format!("Ensure this field has no more than {max} characters."));
            return None;
        }

        Some(trimmed.to_string())
    }

    pub(super) fn amount(&mut self, field: &str, value: Option<Decimal>) -> Option<Amount> {
        let Some(raw) = value else {
            self.fail(field, REQUIRED);
            return None;
        };

        match Amount::new(raw) {
            Ok(amount) => Some(amount),
            Err(e) => {
                self.fail(field, e.to_string());
                None
            }
        }
    }

    pub(super) fn vat(&mut self, field: &str, value: Option<i32>) -> Option<VatRate> {
        match value.map(VatRate::try_from) {
            None => Some(VatRate::default()),
            Some(Ok(rate)) => Some(rate),
            Some(Err(e)) => {
                self.fail(field, e.to_string());
                None
            }
        }
    }

    pub(super) fn withholding(&mut self, field: &str, value: Option<i32>) -> Option<WithholdingRate> {
        match value.map(WithholdingRate::try_from) {
            None => Some(WithholdingRate::default()),
            Some(Ok(rate)) => Some(rate),
            Some(Err(e)) => {
                self.fail(field, e.to_string());
                None
            }
        }
    }

    /// Derives the period from `fecha`, checking any explicit `trimestre`/`año`.
    pub(super) fn period(
        &mut self,
        fecha: Option<NaiveDate>,
        trimestre: Option<i32>,
        year: Option<i32>,
    ) -> Option<FiscalQuarter> {
        let quarter = match trimestre.map(Quarter::try_from) {
            Some(Err(e)) => {
                self.fail("trimestre", e.to_string());
                return None;
            }
            Some(Ok(q)) => Some(q),
            None => None,
        };

        // Missing fecha is already reported by `date`.
        let fecha = fecha?;
        let derived = match FiscalQuarter::of_date(fecha) {
            Ok(fq) => fq,
            Err(e) => {
                self.fail("fecha", e.to_string());
                return None;
            }
        };

        let mut consistent = true;
        if quarter.is_some_and(|q| q != derived.quarter()) {
            self.fail(
                "trimestre",
                format!("Does not match fecha, which falls in {}.", derived.quarter()),
            );
            consistent = false;
        }
        if year.is_some_and(|y| y != derived.year()) {
            self.fail(
                "año",
                format!("Does not match fecha, which falls in {}.", derived.year()),
            );
            consistent = false;
        }

        consistent.then_some(derived)
    }

    pub(super) fn finish<T>(self, draft: Option<T>) -> Result<T, Vec<FieldError>> {
        match draft {
            Some(draft) if self.errors.is_empty() => Ok(draft),
            _ => Err(self.errors),
        }
    }
}
