//! Year-in-review records: first meal, earliest breakfast, latest late
//! snack and most expensive meal.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime};
use report_core::error::SkipReason;
use report_core::models::{Ledger, MealPeriod, Transaction};
use report_core::time_utils::minute_of_day;

use crate::meals::{classify, VisitKey};

/// Cell text for a category without any visit.
pub const NO_RECORD: &str = "无记录";
/// Location shown when a visit has no named location.
pub const UNKNOWN_LOCATION: &str = "未知";

/// Table header.
pub const COLUMNS: [&str; 4] = ["项目", "食堂", "金额(元)", "时间"];

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One `(date, period)` visit.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitSummary {
    pub period: MealPeriod,
    /// Time of the visit's first transaction.
    pub first_time: NaiveDateTime,
    /// First non-empty location in time order.
    pub first_location: String,
    /// Sum of every transaction in the visit.
    pub total_amount: f64,
}

impl VisitSummary {
    /// Clock time of the first transaction in minutes since midnight.
    pub fn clock_minutes(&self) -> f64 {
        minute_of_day(&self.first_time)
    }
}

/// The four highlighted visits of a year.
#[derive(Debug, Clone, PartialEq)]
pub struct Extremes {
    pub year: i32,
    pub first_meal: Option<VisitSummary>,
    pub earliest_breakfast: Option<VisitSummary>,
    pub latest_late_snack: Option<VisitSummary>,
    pub most_expensive: Option<VisitSummary>,
}

impl Extremes {
    /// Pick the extremes among the spending rows of `year`.
    pub fn compute(spending: &Ledger, year: i32) -> Result<Self, SkipReason> {
        let in_year: Vec<Transaction> = spending
            .transactions
            .iter()
            .filter(|t| t.timestamp.is_some_and(|ts| ts.year() == year))
            .cloned()
            .collect();
        if in_year.is_empty() {
            return Err(SkipReason::NoRecordsForYear(year));
        }

        let visits = summarize_visits(&in_year)?;

        let first_meal = visits.iter().min_by_key(|v| v.first_time).cloned();

        let earliest_breakfast = visits
            .iter()
            .filter(|v| v.period == MealPeriod::Breakfast)
            .min_by(|a, b| {
                a.clock_minutes()
                    .total_cmp(&b.clock_minutes())
                    .then_with(|| a.first_time.cmp(&b.first_time))
            })
            .cloned();

        let latest_late_snack = visits
            .iter()
            .filter(|v| v.period == MealPeriod::LateSnack)
            .max_by(|a, b| {
                a.clock_minutes()
                    .total_cmp(&b.clock_minutes())
                    .then_with(|| a.first_time.cmp(&b.first_time))
            })
            .cloned();

        // First visit wins on equal totals.
        let most_expensive = visits
            .iter()
            .fold(None::<&VisitSummary>, |best, v| match best {
                Some(b) if b.total_amount >= v.total_amount => Some(b),
                _ => Some(v),
            })
            .cloned();

        Ok(Self {
            year,
            first_meal,
            earliest_breakfast,
            latest_late_snack,
            most_expensive,
        })
    }

    /// Table body: label followed by location, amount and time.
    pub fn rows(&self) -> Vec<[String; 4]> {
        [
            ("刷的第一顿食堂", &self.first_meal),
            ("吃的最早的一顿早饭", &self.earliest_breakfast),
            ("吃的最晚的一顿夜宵", &self.latest_late_snack),
            ("吃的最贵的一顿饭", &self.most_expensive),
        ]
        .into_iter()
        .map(|(label, visit)| {
            let [location, amount, time] = format_cells(visit.as_ref());
            [label.to_string(), location, amount, time]
        })
        .collect()
    }
}

/// One summary per `(date, period)` visit, in date then period order.
fn summarize_visits(rows: &[Transaction]) -> Result<Vec<VisitSummary>, SkipReason> {
    let mut records = classify(rows)?;
    records.sort_by_key(|r| r.timestamp);

    let mut visits: BTreeMap<VisitKey, VisitSummary> = BTreeMap::new();
    let mut named: BTreeMap<VisitKey, bool> = BTreeMap::new();
    for record in &records {
        let key = record.visit();
        let location = record.location().filter(|l| !l.is_empty());

        let summary = visits.entry(key).or_insert_with(|| VisitSummary {
            period: record.period,
            first_time: record.timestamp,
            first_location: UNKNOWN_LOCATION.to_string(),
            total_amount: 0.0,
        });
        summary.total_amount += record.amount();

        let has_name = named.entry(key).or_insert(false);
        if let (false, Some(location)) = (*has_name, location) {
            summary.first_location = location.to_string();
            *has_name = true;
        }
    }

    Ok(visits.into_values().collect())
}

fn format_cells(visit: Option<&VisitSummary>) -> [String; 3] {
    match visit {
        Some(v) => [
            v.first_location.clone(),
            format!("{:.2}", v.total_amount),
            v.first_time.format(TIME_FORMAT).to_string(),
        ],
        None => [NO_RECORD.to_string(), NO_RECORD.to_string(), NO_RECORD.to_string()],
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
