//! Quarterly tax summary.
//!
//! Computed on request from the owner's records of one quarter; never stored.

mod service;
mod types;

#[cfg(test)]
mod tests;

pub use service::SummaryService;
pub use types::QuarterlySummary;
