//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Record repositories take the owning user on every call.

pub mod dashboard;
pub mod error;
pub mod expense;
pub mod income;
pub mod profile;
pub mod session;
pub mod user;

pub use dashboard::DashboardRepository;
pub use error::RecordError;
pub use expense::{ExpenseRepository, UpdatedExpense};
pub use income::IncomeRepository;
pub use profile::ProfileRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
