//! Meal-period classification.
//!
//! Every aggregator that needs period labels runs [`classify`] itself; the
//! classifier is pure, so repeated runs over the same rows agree.

use chrono::{NaiveDate, NaiveDateTime};
use report_core::error::SkipReason;
use report_core::models::{MealPeriod, Transaction};
use tracing::debug;

/// A visit is identified by its calendar date and meal period.
pub type VisitKey = (NaiveDate, MealPeriod);

/// A transaction with a parsed timestamp that fell inside a meal period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MealRecord<'a> {
    pub txn: &'a Transaction,
    pub timestamp: NaiveDateTime,
    pub period: MealPeriod,
}

impl<'a> MealRecord<'a> {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn visit(&self) -> VisitKey {
        (self.date(), self.period)
    }

    pub fn location(&self) -> Option<&'a str> {
        self.txn.location.as_deref()
    }

    pub fn amount(&self) -> f64 {
        self.txn.amount
    }
}

/// Transactions paired with their parsed timestamps.
///
/// Fails with [`SkipReason::NoParseableTimestamps`] when nothing parsed.
pub fn timed(transactions: &[Transaction]) -> Result<Vec<(&Transaction, NaiveDateTime)>, SkipReason> {
    let rows: Vec<_> = transactions
        .iter()
        .filter_map(|t| t.timestamp.map(|ts| (t, ts)))
        .collect();
    if rows.is_empty() {
        return Err(SkipReason::NoParseableTimestamps);
    }
    Ok(rows)
}

/// Label each transaction with its meal period.
///
/// Rows without a parseable timestamp are dropped first, then rows outside
/// `[06:30, 22:30)`. Each stage reports its own skip reason when it leaves
/// nothing behind.
pub fn classify(transactions: &[Transaction]) -> Result<Vec<MealRecord<'_>>, SkipReason> {
    let rows = timed(transactions)?;
    let parsed = rows.len();

    let records: Vec<MealRecord<'_>> = rows
        .into_iter()
        .filter_map(|(txn, timestamp)| {
            MealPeriod::from_time(&timestamp).map(|period| MealRecord {
                txn,
                timestamp,
                period,
            })
        })
        .collect();

    debug!(
        "Classified {} of {} timed rows into meal periods",
        records.len(),
        parsed
    );

    if records.is_empty() {
        return Err(SkipReason::OutsideMealWindow);
    }
    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
