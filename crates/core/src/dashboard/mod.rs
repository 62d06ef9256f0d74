//! Yearly figures shown on the dashboard.

use helptax_shared::types::serialize_money;
use rust_decimal::Decimal;
use serde::Serialize;

/// Dashboard aggregate for one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Year the totals cover.
    #[serde(rename = "año")]
    pub year: i32,
    /// Sum of income bases in `year`.
    #[serde(rename = "ingresos_año", serialize_with = "serialize_money")]
    pub ingresos: Decimal,
    /// Sum of expense bases in `year`.
    #[serde(rename = "gastos_año", serialize_with = "serialize_money")]
    pub gastos: Decimal,
    /// Income minus expenses.
    #[serde(rename = "beneficio_año", serialize_with = "serialize_money")]
    pub beneficio: Decimal,
    /// Distinct client names across all of the owner's income, any year.
    pub clientes_unicos: u64,
}

impl DashboardStats {
    /// Builds the aggregate from the raw sums.
    #[must_use]
    pub fn new(year: i32, ingresos: Decimal, gastos: Decimal, clientes_unicos: u64) -> Self {
        Self {
            year,
            ingresos,
            gastos,
            beneficio: ingresos - gastos,
            clientes_unicos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_profit_is_difference() {
        let stats = DashboardStats::new(2025, dec!(3250), dec!(435.28), 3);
        assert_eq!(stats.beneficio, dec!(2814.72));
    }

    #[test]
    fn test_serialized_keys() {
        let stats = DashboardStats::new(2025, dec!(100), dec!(150.5), 1);
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "año": 2025,
                "ingresos_año": "100.00",
                "gastos_año": "150.50",
                "beneficio_año": "-50.50",
                "clientes_unicos": 1
            })
        );
    }
}
