//! Autónomo profile repository.

use helptax_core::auth::ProfileDraft;
use helptax_shared::types::UserId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};

use super::RecordError;
use crate::entities::perfiles_autonomos;

/// Profile repository, one profile per user.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    db: DatabaseConnection,
}

impl ProfileRepository {
    /// Creates a new profile repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds the profile of a user. Accounts may exist without one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<perfiles_autonomos::Model>, DbErr> {
        perfiles_autonomos::Entity::find()
            .filter(perfiles_autonomos::Column::UsuarioId.eq(user_id.into_inner()))
            .one(&self.db)
            .await
    }

    /// Checks whether any profile holds this tax ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn nif_exists(&self, nif: &str) -> Result<bool, DbErr> {
        let count = perfiles_autonomos::Entity::find()
            .filter(perfiles_autonomos::Column::Nif.eq(nif.trim()))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Overwrites the editable fields of a user's profile.
    ///
    /// `fecha_alta` and `activo` never change here.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NotFound` when the user has no profile and
    /// `RecordError::Duplicate` when the new NIF is taken.
    pub async fn update(
        &self,
        user_id: UserId,
        draft: &ProfileDraft,
    ) -> Result<perfiles_autonomos::Model, RecordError> {
        let current = self
            .find_by_user(user_id)
            .await?
            .ok_or(RecordError::NotFound("Perfil"))?;

        let mut active: perfiles_autonomos::ActiveModel = current.into();
        active.nombre_fiscal = Set(draft.nombre_fiscal.clone());
        active.nif = Set(draft.nif.clone());
        active.direccion = Set(draft.direccion.clone());
        active.codigo_postal = Set(draft.codigo_postal.clone());
        active.ciudad = Set(draft.ciudad.clone());
        active.provincia = Set(draft.provincia.clone());
        active.tipo_irpf_default = Set(draft.tipo_irpf_default.into());
        active.regimen_iva = Set(draft.regimen_iva.as_str().to_string());

        active.update(&self.db).await.map_err(RecordError::from_write)
    }
}
