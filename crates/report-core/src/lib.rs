//! Shared building blocks for the canteen report.
//!
//! Error types, the transaction and meal-period model, command-line
//! settings and the time and number formatting helpers used by the data and
//! rendering layers.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{ReportError, Result, SkipReason};
