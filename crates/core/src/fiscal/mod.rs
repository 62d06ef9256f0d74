//! Fiscal quarter management.

pub mod quarter;

pub use quarter::{FiscalQuarter, PeriodError, PeriodFilter, Quarter};
