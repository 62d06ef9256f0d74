//! Expense (`Gasto`) repository.
//!
//! Scoped to the owning user like incomes. Invoice files live in object
//! storage; rows only keep the key, and callers clean up replaced keys.

use helptax_core::fiscal::{FiscalQuarter, PeriodFilter};
use helptax_core::records::ExpenseDraft;
use helptax_shared::types::{ExpenseId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use super::RecordError;
use crate::entities::gastos;

const NOT_FOUND: RecordError = RecordError::NotFound("Gasto");

/// An expense update, with the invoice key it displaced.
#[derive(Debug, Clone)]
pub struct UpdatedExpense {
    /// Row after the update.
    pub expense: gastos::Model,
    /// Previous invoice key when a new one replaced it.
    pub replaced_factura: Option<String>,
}

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

fn owned_by(owner: UserId) -> Select<gastos::Entity> {
    gastos::Entity::find().filter(gastos::Column::UsuarioId.eq(owner.into_inner()))
}

async fn insert<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    draft: &ExpenseDraft,
    factura: Option<String>,
) -> Result<gastos::Model, DbErr> {
    let now = chrono::Utc::now().into();
    gastos::ActiveModel {
        id: Set(Uuid::now_v7()),
        usuario_id: Set(owner.into_inner()),
        fecha: Set(draft.fecha),
        descripcion: Set(draft.descripcion.clone()),
        proveedor: Set(draft.proveedor.clone()),
        importe: Set(draft.importe.value()),
        iva_porcentaje: Set(draft.iva.into()),
        factura: Set(factura),
        trimestre: Set(draft.period.quarter().into()),
        year: Set(draft.period.year()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the owner's expenses, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        owner: UserId,
        filter: PeriodFilter,
    ) -> Result<Vec<gastos::Model>, DbErr> {
        let mut query = owned_by(owner);
        if let Some(quarter) = filter.quarter {
            query = query.filter(gastos::Column::Trimestre.eq(i32::from(quarter)));
        }
        if let Some(year) = filter.year {
            query = query.filter(gastos::Column::Year.eq(year));
        }

        query
            .order_by_desc(gastos::Column::Fecha)
            .order_by_desc(gastos::Column::Id)
            .all(&self.db)
            .await
    }

    /// Expenses booked in one fiscal quarter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn in_quarter(
        &self,
        owner: UserId,
        period: &FiscalQuarter,
    ) -> Result<Vec<gastos::Model>, DbErr> {
        self.list(
            owner,
            PeriodFilter {
                quarter: Some(period.quarter()),
                year: Some(period.year()),
            },
        )
        .await
    }

    /// Finds one of the owner's expenses.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NotFound` when the row is missing or not theirs.
    pub async fn find(&self, owner: UserId, id: ExpenseId) -> Result<gastos::Model, RecordError> {
        owned_by(owner)
            .filter(gastos::Column::Id.eq(id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(NOT_FOUND)
    }

    /// Stores a validated expense, optionally with an uploaded invoice key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        owner: UserId,
        draft: &ExpenseDraft,
        factura: Option<String>,
    ) -> Result<gastos::Model, DbErr> {
        insert(&self.db, owner, draft, factura).await
    }

    /// Stores a batch in a single transaction. Bulk rows carry no invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; nothing is kept in that case.
    pub async fn bulk_create(
        &self,
        owner: UserId,
        drafts: &[ExpenseDraft],
    ) -> Result<Vec<gastos::Model>, DbErr> {
        let txn = self.db.begin().await?;

        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            created.push(insert(&txn, owner, draft, None).await?);
        }

        txn.commit().await?;

        Ok(created)
    }

    /// Replaces the editable fields of an owned expense.
    ///
    /// `factura` replaces the stored key when present and keeps it otherwise.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NotFound` when the row is missing or not theirs.
    pub async fn update(
        &self,
        owner: UserId,
        id: ExpenseId,
        draft: &ExpenseDraft,
        factura: Option<String>,
    ) -> Result<UpdatedExpense, RecordError> {
        let current = self.find(owner, id).await?;
        let replaced_factura = if factura.is_some() {
            current.factura.clone()
        } else {
            None
        };

        let mut active: gastos::ActiveModel = current.into();
        active.fecha = Set(draft.fecha);
        active.descripcion = Set(draft.descripcion.clone());
        active.proveedor = Set(draft.proveedor.clone());
        active.importe = Set(draft.importe.value());
        active.iva_porcentaje = Set(draft.iva.into());
        active.trimestre = Set(draft.period.quarter().into());
        active.year = Set(draft.period.year());
        if let Some(key) = factura {
            active.factura = Set(Some(key));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(UpdatedExpense {
            expense: active.update(&self.db).await?,
            replaced_factura,
        })
    }

    /// Deletes an owned expense and returns the removed row.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NotFound` when the row is missing or not theirs.
    pub async fn delete(&self, owner: UserId, id: ExpenseId) -> Result<gastos::Model, RecordError> {
        let current = self.find(owner, id).await?;
        current.clone().delete(&self.db).await?;
        Ok(current)
    }
}
