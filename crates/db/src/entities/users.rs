//! `SeaORM` Entity for users table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::perfiles_autonomos::Entity")]
    PerfilesAutonomos,
    #[sea_orm(has_many = "super::ingresos::Entity")]
    Ingresos,
    #[sea_orm(has_many = "super::gastos::Entity")]
    Gastos,
    #[sea_orm(has_many = "super::sessions::Entity")]
    Sessions,
}

impl Related<super::perfiles_autonomos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PerfilesAutonomos.def()
    }
}

impl Related<super::ingresos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingresos.def()
    }
}

impl Related<super::gastos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Gastos.def()
    }
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
