//! Summary calculation.

use rust_decimal::Decimal;

use super::types::QuarterlySummary;
use crate::fiscal::FiscalQuarter;
use crate::records::TaxLine;
use crate::tax::TaxPolicy;

/// Service for computing quarterly summaries.
pub struct SummaryService;

impl SummaryService {
    /// Aggregates the records of one quarter.
    ///
    /// The caller is responsible for passing only the owner's records of
    /// `period`; nothing is filtered here. Per-record tax amounts are summed
    /// exactly and never rounded.
    #[must_use]
    pub fn calculate<I: TaxLine, E: TaxLine>(
        period: &FiscalQuarter,
        incomes: &[I],
        expenses: &[E],
        policy: TaxPolicy,
    ) -> QuarterlySummary {
        let ingresos_totales: Decimal = incomes.iter().map(TaxLine::base).sum();
        let iva_repercutido: Decimal = incomes.iter().map(TaxLine::vat_amount).sum();
        let irpf_retenido: Decimal = incomes.iter().map(TaxLine::withholding_amount).sum();

        let gastos_totales: Decimal = expenses.iter().map(TaxLine::base).sum();
        let iva_soportado: Decimal = expenses.iter().map(TaxLine::vat_amount).sum();

        let beneficio_neto = ingresos_totales - gastos_totales;

        QuarterlySummary {
            trimestre: period.quarter(),
            year: period.year(),
            fecha_inicio: period.start_date(),
            fecha_fin: period.end_date(),
            ingresos_totales,
            iva_repercutido,
            irpf_retenido,
            gastos_totales,
            iva_soportado,
            beneficio_neto,
            iva_a_pagar: iva_repercutido - iva_soportado,
            irpf_a_ingresar: policy.withholding_due(beneficio_neto),
        }
    }
}
