//! Property-based tests for the summary module.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::service::SummaryService;
use crate::fiscal::{FiscalQuarter, Quarter};
use crate::records::TaxLine;
use crate::tax::TaxPolicy;

#[derive(Debug, Clone)]
struct Line {
    base: Decimal,
    vat: u32,
    withholding: u32,
}

impl Line {
    fn income(base: Decimal, vat: u32, withholding: u32) -> Self {
        Self {
            base,
            vat,
            withholding,
        }
    }

    fn expense(base: Decimal, vat: u32) -> Self {
        Self::income(base, vat, 0)
    }
}

impl TaxLine for Line {
    fn base(&self) -> Decimal {
        self.base
    }

    fn vat_percent(&self) -> u32 {
        self.vat
    }

    fn withholding_percent(&self) -> u32 {
        self.withholding
    }
}

fn q3_2025() -> FiscalQuarter {
    FiscalQuarter::new(Quarter::Q3, 2025).unwrap()
}

fn line_strategy() -> impl Strategy<Value = Line> {
    (1i64..10_000_000, prop_oneof![Just(0u32), Just(21u32)], 0u32..=20)
        .prop_map(|(cents, vat, irpf)| Line::income(Decimal::new(cents, 2), vat, irpf))
}

proptest! {
    /// Net figures are the differences of the gross ones.
    #[test]
    fn test_summary_identities(
        incomes in prop::collection::vec(line_strategy(), 0..20),
        expenses in prop::collection::vec(line_strategy(), 0..20),
        rate in 0u32..=50,
    ) {
        let s = SummaryService::calculate(&q3_2025(), &incomes, &expenses, TaxPolicy::new(rate));

        prop_assert_eq!(s.beneficio_neto, s.ingresos_totales - s.gastos_totales);
        prop_assert_eq!(s.iva_a_pagar, s.iva_repercutido - s.iva_soportado);
        prop_assert_eq!(
            s.irpf_a_ingresar,
            s.beneficio_neto * Decimal::from(rate) / Decimal::ONE_HUNDRED
        );
    }

    /// Same input, same output.
    #[test]
    fn test_summary_is_idempotent(
        incomes in prop::collection::vec(line_strategy(), 0..10),
        expenses in prop::collection::vec(line_strategy(), 0..10),
    ) {
        let first = SummaryService::calculate(&q3_2025(), &incomes, &expenses, TaxPolicy::default());
        let second = SummaryService::calculate(&q3_2025(), &incomes, &expenses, TaxPolicy::default());
        prop_assert_eq!(first, second);
    }

    /// Record order does not change any total.
    #[test]
    fn test_summary_ignores_order(
        incomes in prop::collection::vec(line_strategy(), 1..15),
    ) {
        let mut reversed = incomes.clone();
        reversed.reverse();
        let none: Vec<Line> = Vec::new();

        let a = SummaryService::calculate(&q3_2025(), &incomes, &none, TaxPolicy::default());
        let b = SummaryService::calculate(&q3_2025(), &reversed, &none, TaxPolicy::default());
        prop_assert_eq!(a, b);
    }
}

mod unit_tests {
    use super::*;

    #[test]
    fn test_single_income() {
        let incomes = vec![Line::income(dec!(1000), 21, 7)];
        let expenses: Vec<Line> = Vec::new();

        let s = SummaryService::calculate(&q3_2025(), &incomes, &expenses, TaxPolicy::default());

        assert_eq!(s.ingresos_totales, dec!(1000.00));
        assert_eq!(s.iva_repercutido, dec!(210.00));
        assert_eq!(s.irpf_retenido, dec!(70.00));
        assert_eq!(s.fecha_inicio, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert_eq!(s.fecha_fin, NaiveDate::from_ymd_opt(2025, 9, 30).unwrap());
    }

    #[test]
    fn test_income_and_exempt_expense() {
        let incomes = vec![Line::income(dec!(1000), 21, 7)];
        let expenses = vec![Line::expense(dec!(200), 0)];

        let s = SummaryService::calculate(&q3_2025(), &incomes, &expenses, TaxPolicy::default());

        assert_eq!(s.gastos_totales, dec!(200.00));
        assert_eq!(s.iva_soportado, dec!(0.00));
        assert_eq!(s.beneficio_neto, dec!(800.00));
        assert_eq!(s.iva_a_pagar, dec!(210.00));
        assert_eq!(s.irpf_a_ingresar, dec!(160.00));
    }

    #[test]
    fn test_empty_quarter_is_all_zero() {
        let none: Vec<Line> = Vec::new();
        let s = SummaryService::calculate(&q3_2025(), &none, &none, TaxPolicy::default());

        assert_eq!(s.ingresos_totales, Decimal::ZERO);
        assert_eq!(s.irpf_a_ingresar, Decimal::ZERO);
    }

    #[test]
    fn test_sub_cent_vat_is_summed_before_rounding() {
        // 3 x 0.05 @ 21% = 3 x 0.0105 = 0.0315; rounding each first would give 0.03.
        let expenses = vec![Line::expense(dec!(0.05), 21); 3];
        let none: Vec<Line> = Vec::new();

        let s = SummaryService::calculate(&q3_2025(), &none, &expenses, TaxPolicy::default());
        assert_eq!(s.iva_soportado, dec!(0.0315));
    }

    #[test]
    fn test_loss_gives_negative_withholding_due() {
        let none: Vec<Line> = Vec::new();
        let expenses = vec![Line::expense(dec!(300), 21)];

        let s = SummaryService::calculate(&q3_2025(), &none, &expenses, TaxPolicy::default());
        assert_eq!(s.beneficio_neto, dec!(-300));
        assert_eq!(s.irpf_a_ingresar, dec!(-60));
        assert_eq!(s.iva_a_pagar, dec!(-63));
    }

    #[test]
    fn test_seed_quarter() {
        let incomes = vec![
            Line::income(dec!(500), 0, 0),
            Line::income(dec!(1750), 21, 7),
            Line::income(dec!(1000), 21, 0),
        ];
        let expenses = vec![
            Line::expense(dec!(38.98), 0),
            Line::expense(dec!(41.40), 21),
            Line::expense(dec!(179.90), 0),
            Line::expense(dec!(175.00), 0),
        ];

        let s = SummaryService::calculate(&q3_2025(), &incomes, &expenses, TaxPolicy::default());

        assert_eq!(s.ingresos_totales, dec!(3250));
        assert_eq!(s.iva_repercutido, dec!(577.50));
        assert_eq!(s.irpf_retenido, dec!(122.50));
        assert_eq!(s.gastos_totales, dec!(435.28));
        assert_eq!(s.iva_soportado, dec!(8.694));
        assert_eq!(s.iva_a_pagar, dec!(568.806));
    }

    #[test]
    fn test_serializes_money_as_cents() {
        let incomes = vec![Line::income(dec!(1000), 21, 7)];
        let expenses = vec![Line::expense(dec!(41.40), 21)];

        let s = SummaryService::calculate(&q3_2025(), &incomes, &expenses, TaxPolicy::default());
        let json = serde_json::to_value(&s).unwrap();

        assert_eq!(json["trimestre"], 3);
        assert_eq!(json["año"], 2025);
        assert_eq!(json["fecha_inicio"], "2025-07-01");
        assert_eq!(json["iva_soportado"], "8.69");
        assert_eq!(json["iva_a_pagar"], "201.31");
        assert_eq!(json["ingresos_totales"], "1000.00");
    }

    #[test]
    fn test_serialized_vat_ties_round_to_even() {
        // 0.50 @ 21% = 0.105 and 1.50 @ 21% = 0.315.
        let none: Vec<Line> = Vec::new();
        let low = vec![Line::expense(dec!(0.50), 21)];
        let high = vec![Line::expense(dec!(1.50), 21)];

        let s = SummaryService::calculate(&q3_2025(), &none, &low, TaxPolicy::default());
        assert_eq!(serde_json::to_value(&s).unwrap()["iva_soportado"], "0.10");

        let s = SummaryService::calculate(&q3_2025(), &none, &high, TaxPolicy::default());
        assert_eq!(serde_json::to_value(&s).unwrap()["iva_soportado"], "0.32");
    }
}
