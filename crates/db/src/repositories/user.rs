//! User repository for database operations.

use helptax_core::auth::ProfileDraft;
use helptax_shared::types::UserId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use super::RecordError;
use crate::entities::{perfiles_autonomos, users};

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id.into_inner()).one(&self.db).await
    }

    /// Finds a user together with their profile, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_with_profile(
        &self,
        id: UserId,
    ) -> Result<Option<(users::Model, Option<perfiles_autonomos::Model>)>, DbErr> {
        users::Entity::find_by_id(id.into_inner())
            .find_also_related(perfiles_autonomos::Entity)
            .one(&self.db)
            .await
    }

    /// Creates a user and their profile in one transaction.
    ///
    /// Nothing is written when either insert fails.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Duplicate` naming `email` or `nif` when the
    /// value is taken, or the underlying database error.
    pub async fn create_with_profile(
        &self,
        email: &str,
        password_hash: &str,
        profile: &ProfileDraft,
    ) -> Result<(users::Model, perfiles_autonomos::Model), RecordError> {
        let txn = self.db.begin().await?;

        let now = chrono::Utc::now();
        let user = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            is_active: Set(true),
            last_login_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(RecordError::from_write)?;

        let perfil = perfiles_autonomos::ActiveModel {
            id: Set(Uuid::now_v7()),
            usuario_id: Set(user.id),
            nombre_fiscal: Set(profile.nombre_fiscal.clone()),
            nif: Set(profile.nif.clone()),
            direccion: Set(profile.direccion.clone()),
            codigo_postal: Set(profile.codigo_postal.clone()),
            ciudad: Set(profile.ciudad.clone()),
            provincia: Set(profile.provincia.clone()),
            tipo_irpf_default: Set(profile.tipo_irpf_default.into()),
            regimen_iva: Set(profile.regimen_iva.as_str().to_string()),
            fecha_alta: Set(now.date_naive()),
            activo: Set(true),
        }
        .insert(&txn)
        .await
        .map_err(RecordError::from_write)?;

        txn.commit().await?;

        Ok((user, perfil))
    }

    /// Updates the user's first and last name.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::NotFound` for an unknown user.
    pub async fn update_names(
        &self,
        id: UserId,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<users::Model, RecordError> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or(RecordError::NotFound("Usuario"))?;

        let mut active: users::ActiveModel = user.into();
        if let Some(first_name) = first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = last_name {
            active.last_name = Set(last_name.trim().to_string());
        }
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Records a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn touch_last_login(&self, id: UserId) -> Result<(), DbErr> {
        users::Entity::update_many()
            .col_expr(
                users::Column::LastLoginAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now()),
            )
            .filter(users::Column::Id.eq(id.into_inner()))
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}
