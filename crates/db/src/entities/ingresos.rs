//! `SeaORM` Entity for ingresos table.

use helptax_core::records::{IncomeInput, TaxLine};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingresos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub fecha: Date,
    pub descripcion: String,
    pub cliente: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub importe: Decimal,
    pub iva_porcentaje: i32,
    pub irpf_porcentaje: i32,
    pub trimestre: i32,
    #[sea_orm(column_name = "año")]
    pub year: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Stored values as a fully populated input, the base of a PATCH.
    #[must_use]
    pub fn to_input(&self) -> IncomeInput {
        IncomeInput {
            fecha: Some(self.fecha),
            descripcion: Some(self.descripcion.clone()),
            cliente: Some(self.cliente.clone()),
            importe: Some(self.importe),
            iva_porcentaje: Some(self.iva_porcentaje),
            irpf_porcentaje: Some(self.irpf_porcentaje),
            trimestre: Some(self.trimestre),
            year: Some(self.year),
        }
    }
}

// Percentages are CHECK-constrained to 0..=21.
impl TaxLine for Model {
    fn base(&self) -> Decimal {
        self.importe
    }

    fn vat_percent(&self) -> u32 {
        u32::try_from(self.iva_porcentaje).unwrap_or(0)
    }

    fn withholding_percent(&self) -> u32 {
        u32::try_from(self.irpf_porcentaje).unwrap_or(0)
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
