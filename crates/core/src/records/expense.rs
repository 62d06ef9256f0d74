//! Expense (`Gasto`) payloads.

use chrono::NaiveDate;
use helptax_shared::FieldError;
use helptax_shared::types::Amount;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::checks::{Checks, MAX_DESCRIPTION, MAX_PARTY};
use super::{TaxLine, Validate};
use crate::fiscal::FiscalQuarter;
use crate::tax::VatRate;

/// Expense fields as sent by a client. The invoice file travels separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExpenseInput {
    /// Invoice date.
    pub fecha: Option<NaiveDate>,
    /// Free-text description.
    pub descripcion: Option<String>,
    /// Supplier name.
    pub proveedor: Option<String>,
    /// Base amount.
    pub importe: Option<Decimal>,
    /// VAT percentage, defaults to 21.
    pub iva_porcentaje: Option<i32>,
    /// Quarter; derived from `fecha` when omitted.
    pub trimestre: Option<i32>,
    /// Year; derived from `fecha` when omitted.
    #[serde(rename = "año")]
    pub year: Option<i32>,
}

impl ExpenseInput {
    /// Overlays a partial update on the stored values.
    ///
    /// A new `fecha` drops the stored period so it is derived again.
    #[must_use]
    pub fn merged_onto(self, current: Self) -> Self {
        let keep_period = self.fecha.is_none();
        Self {
            fecha: self.fecha.or(current.fecha),
            descripcion: self.descripcion.or(current.descripcion),
            proveedor: self.proveedor.or(current.proveedor),
            importe: self.importe.or(current.importe),
            iva_porcentaje: self.iva_porcentaje.or(current.iva_porcentaje),
            trimestre: self
                .trimestre
                .or(current.trimestre.filter(|_| keep_period)),
            year: self.year.or(current.year.filter(|_| keep_period)),
        }
    }

    /// Prepares a full replacement of a stored expense. See
    /// [`IncomeInput::replacing`](super::IncomeInput::replacing).
    #[must_use]
    pub fn replacing(self, current: Self) -> Self {
        let keep_period = self.fecha.is_some() && self.fecha == current.fecha;
        Self {
            iva_porcentaje: self.iva_porcentaje.or(current.iva_porcentaje),
            trimestre: self
                .trimestre
                .or(current.trimestre.filter(|_| keep_period)),
            year: self.year.or(current.year.filter(|_| keep_period)),
            ..self
        }
    }
}

/// A validated expense ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseDraft {
    /// Invoice date.
    pub fecha: NaiveDate,
    /// Description, trimmed.
    pub descripcion: String,
    /// Supplier name, trimmed.
    pub proveedor: String,
    /// Base amount.
    pub importe: Amount,
    /// VAT rate.
    pub iva: VatRate,
    /// Quarter the expense is declared in.
    pub period: FiscalQuarter,
}

impl Validate for ExpenseInput {
    type Draft = ExpenseDraft;

    fn validate(&self) -> Result<ExpenseDraft, Vec<FieldError>> {
        let mut checks = Checks::default();

        let fecha = checks.date("fecha", self.fecha);
        let descripcion = checks.text("descripcion", self.descripcion.as_deref(), MAX_DESCRIPTION);
        let proveedor = checks.text("proveedor", self.proveedor.as_deref(), MAX_PARTY);
        let importe = checks.amount("importe", self.importe);
        let iva = checks.vat("iva_porcentaje", self.iva_porcentaje);
        let period = checks.period(self.fecha, self.trimestre, self.year);

        let draft = match (fecha, descripcion, proveedor, importe, iva, period) {
            (Some(fecha), Some(descripcion), Some(proveedor), Some(importe), Some(iva), Some(period)) => {
                Some(ExpenseDraft {
                    fecha,
                    descripcion,
                    proveedor,
                    importe,
                    iva,
                    period,
                })
            }
            _ => None,
        };

        checks.finish(draft)
    }
}

impl TaxLine for ExpenseDraft {
    fn base(&self) -> Decimal {
        self.importe.value()
    }

    fn vat_percent(&self) -> u32 {
        self.iva.percent()
    }
}
