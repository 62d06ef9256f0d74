//! Dashboard aggregates.

use helptax_core::dashboard::DashboardStats;
use helptax_shared::types::UserId;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};

use crate::entities::{gastos, ingresos};

/// Dashboard repository.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Yearly totals for the owner plus their all-time distinct clients.
    ///
    /// Records are attributed by their stored `año`.
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails.
    pub async fn stats(&self, owner: UserId, year: i32) -> Result<DashboardStats, DbErr> {
        let owner = owner.into_inner();

        let income_total = ingresos::Entity::find()
            .filter(ingresos::Column::UsuarioId.eq(owner))
            .filter(ingresos::Column::Year.eq(year))
            .select_only()
            .column_as(ingresos::Column::Importe.sum(), "total")
            .into_tuple::<Option<Decimal>>()
            .one(&self.db)
            .await?
            .flatten();

        let expense_total = gastos::Entity::find()
            .filter(gastos::Column::UsuarioId.eq(owner))
            .filter(gastos::Column::Year.eq(year))
            .select_only()
            .column_as(gastos::Column::Importe.sum(), "total")
            .into_tuple::<Option<Decimal>>()
            .one(&self.db)
            .await?
            .flatten();

        let clientes = ingresos::Entity::find()
            .filter(ingresos::Column::UsuarioId.eq(owner))
            .select_only()
            .column(ingresos::Column::Cliente)
            .distinct()
            .count(&self.db)
            .await?;

        Ok(DashboardStats::new(
            year,
            income_total.unwrap_or(Decimal::ZERO),
            expense_total.unwrap_or(Decimal::ZERO),
            clientes,
        ))
    }
}
