//! Income (`Ingreso`) payloads.

use chrono::NaiveDate;
use helptax_shared::FieldError;
use helptax_shared::types::Amount;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::checks::{Checks, MAX_DESCRIPTION, MAX_PARTY};
use super::{TaxLine, Validate};
use crate::fiscal::FiscalQuarter;
use crate::tax::{VatRate, WithholdingRate};

/// Income fields as sent by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IncomeInput {
    /// Invoice date.
    pub fecha: Option<NaiveDate>,
    /// Free-text description.
    pub descripcion: Option<String>,
    /// Client name.
    pub cliente: Option<String>,
    /// Base amount.
    pub importe: Option<Decimal>,
    /// VAT percentage, defaults to 21.
    pub iva_porcentaje: Option<i32>,
    /// Withholding percentage, defaults to 7.
    pub irpf_porcentaje: Option<i32>,
    /// Quarter; derived from `fecha` when omitted.
    pub trimestre: Option<i32>,
    /// Year; derived from `fecha` when omitted.
    #[serde(rename = "año")]
    pub year: Option<i32>,
}

impl IncomeInput {
    /// Overlays a partial update on the stored values.
    ///
    /// A new `fecha` drops the stored period so it is derived again.
    #[must_use]
    pub fn merged_onto(self, current: Self) -> Self {
        let keep_period = self.fecha.is_none();
        Self {
            fecha: self.fecha.or(current.fecha),
            descripcion: self.descripcion.or(current.descripcion),
            cliente: self.cliente.or(current.cliente),
            importe: self.importe.or(current.importe),
            iva_porcentaje: self.iva_porcentaje.or(current.iva_porcentaje),
            irpf_porcentaje: self.irpf_porcentaje.or(current.irpf_porcentaje),
            trimestre: self
                .trimestre
                .or(current.trimestre.filter(|_| keep_period)),
            year: self.year.or(current.year.filter(|_| keep_period)),
        }
    }

    /// Prepares a full replacement of a stored income.
    ///
    /// Required fields come from the body only. Omitted rates keep their
    /// stored values instead of falling back to the creation defaults, and
    /// the stored period survives only while `fecha` is unchanged.
    #[must_use]
    pub fn replacing(self, current: Self) -> Self {
        let keep_period = self.fecha.is_some() && self.fecha == current.fecha;
        Self {
            iva_porcentaje: self.iva_porcentaje.or(current.iva_porcentaje),
            irpf_porcentaje: self.irpf_porcentaje.or(current.irpf_porcentaje),
            trimestre: self
                .trimestre
                .or(current.trimestre.filter(|_| keep_period)),
            year: self.year.or(current.year.filter(|_| keep_period)),
            ..self
        }
    }
}

/// A validated income ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeDraft {
    /// Invoice date.
    pub fecha: NaiveDate,
    /// Description, trimmed.
    pub descripcion: String,
    /// Client name, trimmed.
    pub cliente: String,
    /// Base amount.
    pub importe: Amount,
    /// VAT rate.
    pub iva: VatRate,
    /// Withholding rate.
    pub irpf: WithholdingRate,
    /// Quarter the income is declared in.
    pub period: FiscalQuarter,
}

impl Validate for IncomeInput {
    type Draft = IncomeDraft;

    fn validate(&self) -> Result<IncomeDraft, Vec<FieldError>> {
        let mut checks = Checks::default();

        let fecha = checks.date("fecha", self.fecha);
        let descripcion = checks.text("descripcion", self.descripcion.as_deref(), MAX_DESCRIPTION);
        let cliente = checks.text("cliente", self.cliente.as_deref(), MAX_PARTY);
        let importe = checks.amount("importe", self.importe);
        let iva = checks.vat("iva_porcentaje", self.iva_porcentaje);
        let irpf = checks.withholding("irpf_porcentaje", self.irpf_porcentaje);
        let period = checks.period(self.fecha, self.trimestre, self.year);

        let draft = match (fecha, descripcion, cliente, importe, iva, irpf, period) {
            (
                Some(fecha),
                Some(descripcion),
                Some(cliente),
                Some(importe),
                Some(iva),
                Some(irpf),
                Some(period),
            ) => Some(IncomeDraft {
                fecha,
                descripcion,
                cliente,
                importe,
                iva,
                irpf,
                period,
            }),
            _ => None,
        };

        checks.finish(draft)
    }
}

impl TaxLine for IncomeDraft {
    fn base(&self) -> Decimal {
        self.importe.value()
    }

    fn vat_percent(&self) -> u32 {
        self.iva.percent()
    }

    fn withholding_percent(&self) -> u32 {
        self.irpf.percent()
    }
}
