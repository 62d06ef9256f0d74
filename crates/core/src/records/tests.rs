//! Tests for record validation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::fiscal::Quarter;
use crate::tax::{VatRate, WithholdingRate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn income(importe: Decimal) -> IncomeInput {
    IncomeInput {
        fecha: Some(date(2025, 8, 14)),
        descripcion: Some("Desarrollo web".to_string()),
        cliente: Some("Ware26".to_string()),
        importe: Some(importe),
        iva_porcentaje: Some(21),
        irpf_porcentaje: Some(7),
        trimestre: None,
        year: None,
    }
}

fn expense() -> ExpenseInput {
    ExpenseInput {
        fecha: Some(date(2025, 7, 3)),
        descripcion: Some("Fibra".to_string()),
        proveedor: Some("Movistar".to_string()),
        importe: Some(dec!(41.40)),
        iva_porcentaje: None,
        trimestre: Some(3),
        year: Some(2025),
    }
}

fn fields(errors: &[FieldError]) -> Vec<&str> {
    errors.iter().map(|e| e.field.as_str()).collect()
}

proptest! {
    /// total == base + base * vat / 100, with no rounding.
    #[test]
    fn prop_total_is_exact(cents in 1i64..10_000_000_000, general in any::<bool>()) {
        let mut input = income(Decimal::new(cents, 2));
        input.iva_porcentaje = Some(if general { 21 } else { 0 });

        let draft = input.validate().unwrap();
        let base = Decimal::new(cents, 2);
        let vat = if general { Decimal::from(21) } else { Decimal::ZERO };

        prop_assert_eq!(draft.total(), base + base * vat / Decimal::ONE_HUNDRED);
        prop_assert_eq!(draft.withholding_amount(), base * Decimal::from(7) / Decimal::ONE_HUNDRED);
    }

    #[test]
    fn prop_period_is_derived_from_fecha(days in 0i64..20_000) {
        let fecha = date(1990, 1, 1) + chrono::Duration::days(days);
        let mut input = income(dec!(100));
        input.fecha = Some(fecha);

        let draft = input.validate().unwrap();
        prop_assert!(draft.period.contains(fecha));
    }
}

mod unit_tests {
    use super::*;

    #[test]
    fn test_income_valid_with_derived_period() {
        let draft = income(dec!(1750)).validate().unwrap();

        assert_eq!(draft.period.quarter(), Quarter::Q3);
        assert_eq!(draft.period.year(), 2025);
        assert_eq!(draft.iva, VatRate::General);
        assert_eq!(draft.irpf, WithholdingRate::try_from(7).unwrap());
        assert_eq!(draft.vat_amount(), dec!(367.50));
        assert_eq!(draft.total(), dec!(2117.50));
    }

    #[test]
    fn test_income_defaults_rates() {
        let mut input = income(dec!(100));
        input.iva_porcentaje = None;
        input.irpf_porcentaje = None;

        let draft = input.validate().unwrap();
        assert_eq!(draft.iva.percent(), 21);
        assert_eq!(draft.irpf.percent(), 7);
    }

    #[test]
    fn test_income_trims_text() {
        let mut input = income(dec!(100));
        input.cliente = Some("  Urodata  ".to_string());
        assert_eq!(input.validate().unwrap().cliente, "Urodata");
    }

    #[test]
    fn test_empty_payload_reports_every_required_field() {
        let errors = IncomeInput::default().validate().unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["fecha", "descripcion", "cliente", "importe"]
        );
    }

    #[test]
    fn test_income_rejects_bad_values_together() {
        let mut input = income(dec!(0));
        input.iva_porcentaje = Some(10);
        input.irpf_porcentaje = Some(21);
        input.descripcion = Some("x".repeat(201));

        let errors = input.validate().unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["descripcion", "importe", "iva_porcentaje", "irpf_porcentaje"]
        );
        assert!(errors.iter().all(|e| e.index.is_none()));
    }

    #[test]
    fn test_blank_client_rejected() {
        let mut input = income(dec!(10));
        input.cliente = Some("   ".to_string());
        let errors = input.validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["cliente"]);
    }

    #[test]
    fn test_length_limits_count_characters() {
        let mut input = income(dec!(10));
        input.cliente = Some("ñ".repeat(100));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_explicit_period_must_match_fecha() {
        let mut input = income(dec!(10));
        input.trimestre = Some(2);
        input.year = Some(2024);

        let errors = input.validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["trimestre", "año"]);
    }

    #[test]
    fn test_matching_explicit_period_accepted() {
        let draft = expense().validate().unwrap();
        assert_eq!(draft.period.quarter(), Quarter::Q3);
        assert_eq!(draft.iva, VatRate::General);
        assert_eq!(draft.vat_amount(), dec!(8.694));
        assert_eq!(draft.withholding_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_quarter_out_of_range() {
        let mut input = expense();
        input.trimestre = Some(5);
        let errors = input.validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["trimestre"]);
        assert_eq!(errors[0].message, "Trimestre debe ser 1, 2, 3 o 4");
    }

    #[test]
    fn test_importe_precision() {
        let mut input = expense();
        input.importe = Some(dec!(10.005));
        let errors = input.validate().unwrap_err();
        assert_eq!(errors[0].message, "must have at most 2 decimal places");
    }

    #[test]
    fn test_patch_keeps_stored_values() {
        let stored = income(dec!(500));
        let patch = IncomeInput {
            importe: Some(dec!(600)),
            ..IncomeInput::default()
        };

        let merged = patch.merged_onto(stored.clone());
        assert_eq!(merged.importe, Some(dec!(600)));
        assert_eq!(merged.cliente, stored.cliente);
        assert!(merged.validate().is_ok());
    }

    #[test]
    fn test_patch_with_new_fecha_rederives_period() {
        let mut stored = income(dec!(500));
        stored.trimestre = Some(3);
        stored.year = Some(2025);
        let patch = IncomeInput {
            fecha: Some(date(2025, 11, 2)),
            ..IncomeInput::default()
        };

        let draft = patch.merged_onto(stored).validate().unwrap();
        assert_eq!(draft.period.quarter(), Quarter::Q4);
    }

    #[test]
    fn test_replace_keeps_stored_rates_when_omitted() {
        let mut stored = income(dec!(500));
        stored.iva_porcentaje = Some(0);
        stored.irpf_porcentaje = Some(0);
        let body = IncomeInput {
            iva_porcentaje: None,
            irpf_porcentaje: None,
            ..income(dec!(800))
        };

        let draft = body.replacing(stored).validate().unwrap();
        assert_eq!(draft.iva, VatRate::Exempt);
        assert_eq!(draft.irpf.percent(), 0);
        assert_eq!(draft.importe.value(), dec!(800));
    }

    #[test]
    fn test_replace_still_requires_body_fields() {
        let stored = income(dec!(500));
        let body = IncomeInput {
            importe: Some(dec!(600)),
            ..IncomeInput::default()
        };

        let errors = body.replacing(stored).validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["fecha", "descripcion", "cliente"]);
    }

    #[test]
    fn test_replace_with_new_fecha_rederives_period() {
        let mut stored = income(dec!(500));
        stored.trimestre = Some(3);
        stored.year = Some(2025);
        let body = IncomeInput {
            fecha: Some(date(2026, 1, 8)),
            ..income(dec!(500))
        };

        let draft = body.replacing(stored).validate().unwrap();
        assert_eq!(draft.period.quarter(), Quarter::Q1);
        assert_eq!(draft.period.year(), 2026);
    }

    #[test]
    fn test_expense_replace_keeps_exempt_vat() {
        let mut stored = expense();
        stored.iva_porcentaje = Some(0);
        let body = ExpenseInput {
            iva_porcentaje: None,
            trimestre: None,
            year: None,
            ..expense()
        };

        let draft = body.replacing(stored).validate().unwrap();
        assert_eq!(draft.iva, VatRate::Exempt);
        assert_eq!(draft.period.quarter(), Quarter::Q3);
    }

    #[test]
    fn test_batch_all_valid() {
        let items = vec![income(dec!(500)), income(dec!(1750)), income(dec!(1000))];
        let drafts = validate_batch("ingresos", &items).unwrap();
        assert_eq!(drafts.len(), 3);
    }

    #[test]
    fn test_batch_reports_failing_index() {
        let items = vec![income(dec!(500)), income(dec!(0)), income(dec!(1000))];

        let errors = validate_batch("ingresos", &items).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].index, Some(1));
        assert_eq!(errors[0].field, "importe");
    }

    #[test]
    fn test_batch_size_limit() {
        let items = vec![expense(); MAX_BATCH_SIZE + 1];
        let errors = validate_batch("gastos", &items).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "gastos");
        assert_eq!(errors[0].index, None);
    }

    #[test]
    fn test_empty_batch_is_valid() {
        let items: Vec<ExpenseInput> = Vec::new();
        assert!(validate_batch("gastos", &items).unwrap().is_empty());
    }

    #[test]
    fn test_input_deserializes_spanish_year_key() {
        let input: IncomeInput = serde_json::from_value(serde_json::json!({
            "fecha": "2025-09-30",
            "descripcion": "Consultoría",
            "cliente": "Ontrackia",
            "importe": "1000.00",
            "iva_porcentaje": 21,
            "irpf_porcentaje": 0,
            "trimestre": 3,
            "año": 2025
        }))
        .unwrap();

        assert_eq!(input.year, Some(2025));
        assert_eq!(input.importe, Some(dec!(1000.00)));
        assert!(input.validate().is_ok());
    }
}
