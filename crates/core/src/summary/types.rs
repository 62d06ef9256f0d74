//! Summary types.

use chrono::NaiveDate;
use helptax_shared::types::serialize_money;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::fiscal::Quarter;

/// Totals for one owner, quarter and year.
///
/// Amounts are exact; serialization rounds to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarterlySummary {
    /// Quarter.
    pub trimestre: Quarter,
    /// Year.
    #[serde(rename = "año")]
    pub year: i32,
    /// First day of the quarter.
    pub fecha_inicio: NaiveDate,
    /// Last day of the quarter.
    pub fecha_fin: NaiveDate,
    /// Sum of income bases.
    #[serde(serialize_with = "serialize_money")]
    pub ingresos_totales: Decimal,
    /// VAT charged on income.
    #[serde(serialize_with = "serialize_money")]
    pub iva_repercutido: Decimal,
    /// Withholding applied by clients.
    #[serde(serialize_with = "serialize_money")]
    pub irpf_retenido: Decimal,
    /// Sum of expense bases.
    #[serde(serialize_with = "serialize_money")]
    pub gastos_totales: Decimal,
    /// VAT paid on expenses.
    #[serde(serialize_with = "serialize_money")]
    pub iva_soportado: Decimal,
    /// Income minus expenses.
    #[serde(serialize_with = "serialize_money")]
    pub beneficio_neto: Decimal,
    /// VAT charged minus VAT paid.
    #[serde(serialize_with = "serialize_money")]
    pub iva_a_pagar: Decimal,
    /// Net profit times the configured withholding-due rate.
    #[serde(serialize_with = "serialize_money")]
    pub irpf_a_ingresar: Decimal,
}
