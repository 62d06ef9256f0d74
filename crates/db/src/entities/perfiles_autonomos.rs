//! `SeaORM` Entity for perfiles_autonomos table.

use helptax_core::auth::{ProfileDraft, VatRegime};
use helptax_core::tax::WithholdingRate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "perfiles_autonomos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub usuario_id: Uuid,
    pub nombre_fiscal: String,
    #[sea_orm(unique)]
    pub nif: String,
    pub direccion: String,
    pub codigo_postal: String,
    pub ciudad: String,
    pub provincia: String,
    pub tipo_irpf_default: i32,
    pub regimen_iva: String,
    pub fecha_alta: Date,
    pub activo: bool,
}

impl Model {
    /// Stored values as a draft, the starting point of a partial update.
    ///
    /// Values written by this crate always parse; anything else falls back
    /// to the defaults.
    #[must_use]
    pub fn to_draft(&self) -> ProfileDraft {
        ProfileDraft {
            nombre_fiscal: self.nombre_fiscal.clone(),
            nif: self.nif.clone(),
            direccion: self.direccion.clone(),
            codigo_postal: self.codigo_postal.clone(),
            ciudad: self.ciudad.clone(),
            provincia: self.provincia.clone(),
            tipo_irpf_default: WithholdingRate::try_from(self.tipo_irpf_default)
                .unwrap_or_default(),
            regimen_iva: self.regimen_iva.parse::<VatRegime>().unwrap_or_default(),
        }
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
