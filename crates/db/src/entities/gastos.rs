//! `SeaORM` Entity for gastos table.

use helptax_core::records::{ExpenseInput, TaxLine};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gastos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub fecha: Date,
    pub descripcion: String,
    pub proveedor: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub importe: Decimal,
    pub iva_porcentaje: i32,
    /// Storage key of the attached invoice.
    pub factura: Option<String>,
    pub trimestre: i32,
    #[sea_orm(column_name = "año")]
    pub year: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Stored values as a fully populated input, the base of a PATCH.
    #[must_use]
    pub fn to_input(&self) -> ExpenseInput {
        ExpenseInput {
            fecha: Some(self.fecha),
            descripcion: Some(self.descripcion.clone()),
            proveedor: Some(self.proveedor.clone()),
            importe: Some(self.importe),
            iva_porcentaje: Some(self.iva_porcentaje),
            trimestre: Some(self.trimestre),
            year: Some(self.year),
        }
    }
}

impl TaxLine for Model {
    fn base(&self) -> Decimal {
        self.importe
    }

    fn vat_percent(&self) -> u32 {
        u32::try_from(self.iva_porcentaje).unwrap_or(0)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UsuarioId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
