//! Data layer for the canteen report.
//!
//! Finds and reads the meal-card export, filters noise locations, buckets
//! transactions into meal periods and computes every statistic the charts
//! need.

pub mod aggregator;
pub mod distribution;
pub mod extremes;
pub mod meals;
pub mod preprocess;
pub mod reader;
pub mod resolver;

pub use report_core as core;

pub use aggregator::SpendingAggregator;
pub use distribution::CanteenDistribution;
pub use extremes::Extremes;
pub use preprocess::Preprocessor;
pub use reader::load_ledger;
pub use resolver::find_data_file;
