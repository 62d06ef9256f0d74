//! Income (`Ingreso`) repository.
//!
//! Every query is scoped to the owning user. A row that exists but belongs
//! to someone else is indistinguishable from a missing one.

use helptax_core::fiscal::{FiscalQuarter, PeriodFilter};
use helptax_core::records::IncomeDraft;
use helptax_shared::types::{IncomeId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use super::RecordError;
use crate::entities::ingresos;

const NOT_FOUND: RecordError = RecordError::NotFound("Ingreso");

/// Income repository.
#[derive(Debug, Clone)]
pub struct IncomeRepository {
    db: DatabaseConnection,
}

fn owned_by(owner: UserId) -> Select<ingresos::Entity> {
    ingresos::Entity::find().filter(ingresos::Column::UsuarioId.eq(owner.into_inner()))
}

fn active_model(owner: UserId, draft: &IncomeDraft) -> ingresos::ActiveModel {
    let now = chrono::Utc::now().into();
    ingresos::ActiveModel {
        id: Set(Uuid::now_v7()),
        usuario_id: Set(owner.into_inner()),
        fecha: Set(draft.fecha),
        descripcion: Set(draft.descripcion.clone()),
        cliente: Set(draft.cliente.clone()),
        importe: Set(draft.importe.value()),
        iva_porcentaje: Set(draft.iva.into()),
        irpf_porcentaje: Set(draft.irpf.into()),
        trimestre: Set(draft.period.quarter().into()),
        year: Set(draft.period.year()),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

async fn insert<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    draft: &IncomeDraft,
) -> Result<ingresos::Model, DbErr> {
    active_model(owner, draft).insert(conn).await
}

impl IncomeRepository {
    /// Creates a new income repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the owner's incomes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        owner: UserId,
        filter: PeriodFilter,
    ) -> Result<Vec<ingresos::Model>, DbErr> {
        let mut query = owned_by(owner);
        if let Some(quarter) = filter.quarter {
            query = query.filter(ingresos::Column::Trimestre.eq(i32::from(quarter)));
        }
        if let Some(year) = filter.year {
            query = query.filter(ingresos::Column::Year.eq(year));
        }

        query
            .order_by_desc(ingresos::Column::Fecha)
            .order_by_desc(ingresos::Column::Id)
            .all(&self.db)
            .await
    }

    /// Incomes booked in one fiscal quarter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn in_quarter(
        &self,
        owner: UserId,
        period: &FiscalQuarter,
    ) -> Result<Vec<ingresos::Model>, DbErr> {
        self.list(
            owner,
            PeriodFilter {
                quarter: Some(period.quarter()),
                year: Some(period.year()),
            },
        )
        .await
    }

    /// Finds one of the owner's incomes.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NotFound` when the row is missing or not theirs.
    pub async fn find(&self, owner: UserId, id: IncomeId) -> Result<ingresos::Model, RecordError> {
        owned_by(owner)
            .filter(ingresos::Column::Id.eq(id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(NOT_FOUND)
    }

    /// Stores a validated income for the owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, owner: UserId, draft: &IncomeDraft) -> Result<ingresos::Model, DbErr> {
        insert(&self.db, owner, draft).await
    }

    /// Stores a batch in a single transaction.
    ///
    /// Rows come back in input order. Any failure rolls back the whole batch.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails.
    pub async fn bulk_create(
        &self,
        owner: UserId,
        drafts: &[IncomeDraft],
    ) -> Result<Vec<ingresos::Model>, DbErr> {
        let txn = self.db.begin().await?;

        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            created.push(insert(&txn, owner, draft).await?);
        }

        txn.commit().await?;

        Ok(created)
    }

    /// Replaces every editable field of an owned income.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NotFound` when the row is missing or not theirs.
    pub async fn update(
        &self,
        owner: UserId,
        id: IncomeId,
        draft: &IncomeDraft,
    ) -> Result<ingresos::Model, RecordError> {
        let current = self.find(owner, id).await?;

        let mut active: ingresos::ActiveModel = current.into();
        active.fecha = Set(draft.fecha);
        active.descripcion = Set(draft.descripcion.clone());
        active.cliente = Set(draft.cliente.clone());
        active.importe = Set(draft.importe.value());
        active.iva_porcentaje = Set(draft.iva.into());
        active.irpf_porcentaje = Set(draft.irpf.into());
        active.trimestre = Set(draft.period.quarter().into());
        active.year = Set(draft.period.year());
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes an owned income.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NotFound` when the row is missing or not theirs.
    pub async fn delete(&self, owner: UserId, id: IncomeId) -> Result<(), RecordError> {
        let current = self.find(owner, id).await?;
        current.delete(&self.db).await?;
        Ok(())
    }
}
