//! `SeaORM` entity definitions.

pub mod gastos;
pub mod ingresos;
pub mod perfiles_autonomos;
pub mod sessions;
pub mod users;

pub mod prelude {
    //! Entity re-exports.

    pub use super::gastos::Entity as Gastos;
    pub use super::ingresos::Entity as Ingresos;
    pub use super::perfiles_autonomos::Entity as PerfilesAutonomos;
    pub use super::sessions::Entity as Sessions;
    pub use super::users::Entity as Users;
}
