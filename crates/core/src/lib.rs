//! Core business logic for HelpTax.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `tax` - VAT and withholding rates, percentage arithmetic
//! - `fiscal` - Quarter parsing and boundary dates
//! - `records` - Write-time validation of income and expense payloads
//! - `summary` - Quarterly tax summary calculation
//! - `dashboard` - Yearly totals shown on the dashboard
//! - `auth` - Password hashing and registration checks
//! - `storage` - Invoice file storage

pub mod auth;
pub mod dashboard;
pub mod fiscal;
pub mod records;
pub mod storage;
pub mod summary;
pub mod tax;
