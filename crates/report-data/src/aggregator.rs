//! Spending aggregation by location, calendar month, meal period and year.
//!
//! Every routine is a pure function of the filtered ledger. Missing
//! prerequisites come back as a [`SkipReason`] so the caller can omit the
//! chart and keep going.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use report_core::error::SkipReason;
use report_core::models::{Ledger, MealPeriod};
use report_core::time_utils::minute_of_day;

use crate::meals::{classify, timed, VisitKey};

// ── Result types ──────────────────────────────────────────────────────────────

/// Total spent at one location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationAmount {
    pub location: String,
    pub amount: f64,
}

/// Mean of the daily totals within one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAverage {
    pub year: i32,
    pub month: u32,
    pub average: f64,
}

impl MonthlyAverage {
    /// Axis label, e.g. `"2025-03"`.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Spending and visit count for one meal period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MealStats {
    pub period: MealPeriod,
    pub total: f64,
    /// Distinct `(date, period)` visits.
    pub visits: u32,
    /// `total / visits`, `0.0` when there were no visits.
    pub average: f64,
}

/// Spending within one year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlySpending {
    pub year: i32,
    /// Sum of the spending rows in `year`.
    pub total: f64,
    /// Spending per month, January first, zero-filled.
    pub monthly: [f64; 12],
}

/// Share of days with at least one visit in a period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodAttendance {
    pub period: MealPeriod,
    pub visit_days: u32,
    /// Percentage in `[0, 100]`.
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceReport {
    /// Calendar days spanned by the timed spending rows, inclusive.
    pub total_days: u32,
    pub periods: Vec<PeriodAttendance>,
}

/// Clock times in minutes since midnight (seconds as fractions).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    /// Earliest first transaction of any visit.
    pub first: f64,
    /// Latest last transaction of any visit.
    pub last: f64,
    /// Mean of the visits' first transactions.
    pub average_first: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MealTimeRange {
    pub period: MealPeriod,
    /// `None` when the period saw no visit.
    pub span: Option<TimeSpan>,
}

// ── SpendingAggregator ────────────────────────────────────────────────────────

/// Stateless helper computing the report statistics.
pub struct SpendingAggregator;

impl SpendingAggregator {
    /// Total per location, largest first. Ties are ordered by name.
    ///
    /// Rows without a location are left out of the grouping.
    pub fn location_totals(spending: &Ledger) -> Result<Vec<LocationAmount>, SkipReason> {
        if !spending.has_location {
            return Err(SkipReason::MissingLocation);
        }
        if spending.is_empty() {
            return Err(SkipReason::NoSpending);
        }

        let mut map: BTreeMap<&str, f64> = BTreeMap::new();
        for txn in &spending.transactions {
            if let Some(location) = txn.location.as_deref() {
                *map.entry(location).or_insert(0.0) += txn.amount;
            }
        }
        if map.is_empty() {
            return Err(SkipReason::NoCanteenData);
        }

        let totals = map
            .into_iter()
            .map(|(location, amount)| LocationAmount {
                location: location.to_string(),
                amount,
            })
            .collect();
        Ok(sort_desc(totals))
    }

    /// Daily totals averaged per calendar month, oldest month first.
    pub fn monthly_daily_average(spending: &Ledger) -> Result<Vec<MonthlyAverage>, SkipReason> {
        let rows = timed(&spending.transactions)?;

        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (txn, ts) in rows {
            *daily.entry(ts.date()).or_insert(0.0) += txn.amount;
        }

        let mut months: BTreeMap<(i32, u32), (f64, u32)> = BTreeMap::new();
        for (date, sum) in daily {
            let slot = months.entry((date.year(), date.month())).or_insert((0.0, 0));
            slot.0 += sum;
            slot.1 += 1;
        }

        Ok(months
            .into_iter()
            .map(|((year, month), (sum, days))| MonthlyAverage {
                year,
                month,
                average: sum / f64::from(days),
            })
            .collect())
    }

    /// Total, visit count and average for all four periods in display order.
    pub fn meal_stats(spending: &Ledger) -> Result<Vec<MealStats>, SkipReason> {
        let records = classify(&spending.transactions)?;

        let mut totals = [0.0_f64; 4];
        let mut visits: HashSet<VisitKey> = HashSet::new();
        for record in &records {
            totals[record.period.index()] += record.amount();
            visits.insert(record.visit());
        }

        let mut counts = [0_u32; 4];
        for (_, period) in &visits {
            counts[period.index()] += 1;
        }

        Ok(MealPeriod::ALL
            .iter()
            .map(|&period| {
                let total = totals[period.index()];
                let visits = counts[period.index()];
                MealStats {
                    period,
                    total,
                    visits,
                    average: if visits == 0 {
                        0.0
                    } else {
                        total / f64::from(visits)
                    },
                }
            })
            .collect())
    }

    /// Spending per period.
    pub fn meal_totals(spending: &Ledger) -> Result<Vec<(MealPeriod, f64)>, SkipReason> {
        Ok(Self::meal_stats(spending)?
            .into_iter()
            .map(|s| (s.period, s.total))
            .collect())
    }

    /// Distinct visits per period.
    pub fn meal_visit_counts(spending: &Ledger) -> Result<Vec<(MealPeriod, u32)>, SkipReason> {
        Ok(Self::meal_stats(spending)?
            .into_iter()
            .map(|s| (s.period, s.visits))
            .collect())
    }

    /// Average spend per visit in each period.
    pub fn meal_averages(spending: &Ledger) -> Result<Vec<(MealPeriod, f64)>, SkipReason> {
        Ok(Self::meal_stats(spending)?
            .into_iter()
            .map(|s| (s.period, s.average))
            .collect())
    }

    /// Average spend per visit at each location, largest first.
    ///
    /// A visit here is a distinct `(date, period, location)` triple.
    pub fn location_meal_average(spending: &Ledger) -> Result<Vec<LocationAmount>, SkipReason> {
        let records = classify(&spending.transactions)?;
        if !spending.has_location {
            return Err(SkipReason::MissingLocation);
        }

        let mut totals: HashMap<&str, f64> = HashMap::new();
        let mut visits: HashSet<(VisitKey, &str)> = HashSet::new();
        for record in &records {
            if let Some(location) = record.location() {
                *totals.entry(location).or_insert(0.0) += record.amount();
                visits.insert((record.visit(), location));
            }
        }
        if totals.is_empty() {
            return Err(SkipReason::NoCanteenData);
        }

        let mut counts: HashMap<&str, u32> = HashMap::new();
        for (_, location) in &visits {
            *counts.entry(*location).or_insert(0) += 1;
        }

        let averages = totals
            .into_iter()
            .map(|(location, total)| {
                let visits = counts.get(location).copied().unwrap_or(0);
                LocationAmount {
                    location: location.to_string(),
                    amount: if visits == 0 {
                        0.0
                    } else {
                        total / f64::from(visits)
                    },
                }
            })
            .collect();
        Ok(sort_desc(averages))
    }

    /// Spending total and monthly breakdown for `year`.
    ///
    /// `ledger` holds every row of the export, not just spending, so a year
    /// with only top-ups still renders (with zero spending).
    pub fn yearly_spending(ledger: &Ledger, year: i32) -> Result<YearlySpending, SkipReason> {
        let in_year: Vec<_> = ledger
            .transactions
            .iter()
            .filter_map(|t| t.timestamp.map(|ts| (t, ts)))
            .filter(|(_, ts)| ts.year() == year)
            .collect();
        if in_year.is_empty() {
            return Err(SkipReason::NoRecordsForYear(year));
        }

        let mut monthly = [0.0_f64; 12];
        for (txn, ts) in in_year {
            if txn.kind.is_spending() {
                monthly[ts.month0() as usize] += txn.amount;
            }
        }

        Ok(YearlySpending {
            year,
            total: monthly.iter().sum(),
            monthly,
        })
    }

    /// Percentage of days on which each period saw a visit.
    ///
    /// The day count spans every timed spending row, including rows outside
    /// the meal window.
    pub fn attendance(spending: &Ledger) -> Result<AttendanceReport, SkipReason> {
        let rows = timed(&spending.transactions)?;
        let records = classify(&spending.transactions)?;

        let dates = rows.iter().map(|(_, ts)| ts.date());
        let (first, last) = match (dates.clone().min(), dates.max()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SkipReason::NoParseableTimestamps),
        };
        let total_days = u32::try_from((last - first).num_days() + 1).unwrap_or(1).max(1);

        let mut counts = [0_u32; 4];
        let visits: BTreeSet<VisitKey> = records.iter().map(|r| r.visit()).collect();
        for (_, period) in &visits {
            counts[period.index()] += 1;
        }

        Ok(AttendanceReport {
            total_days,
            periods: MealPeriod::ALL
                .iter()
                .map(|&period| {
                    let visit_days = counts[period.index()];
                    PeriodAttendance {
                        period,
                        visit_days,
                        rate: f64::from(visit_days) / f64::from(total_days) * 100.0,
                    }
                })
                .collect(),
        })
    }

    /// Earliest first, latest last and mean first transaction time per period.
    pub fn meal_time_ranges(spending: &Ledger) -> Result<Vec<MealTimeRange>, SkipReason> {
        let records = classify(&spending.transactions)?;

        let mut per_visit: BTreeMap<VisitKey, (f64, f64)> = BTreeMap::new();
        for record in &records {
            let minute = minute_of_day(&record.timestamp);
            per_visit
                .entry(record.visit())
                .and_modify(|(first, last)| {
                    *first = first.min(minute);
                    *last = last.max(minute);
                })
                .or_insert((minute, minute));
        }

        let mut spans: [Option<(f64, f64, f64, u32)>; 4] = [None; 4];
        for ((_, period), (first, last)) in per_visit {
            let slot = &mut spans[period.index()];
            *slot = Some(match *slot {
                None => (first, last, first, 1),
                Some((min_first, max_last, sum_first, n)) => (
                    min_first.min(first),
                    max_last.max(last),
                    sum_first + first,
                    n + 1,
                ),
            });
        }

        Ok(MealPeriod::ALL
            .iter()
            .map(|&period| MealTimeRange {
                period,
                span: spans[period.index()].map(|(first, last, sum_first, n)| TimeSpan {
                    first,
                    last,
                    average_first: sum_first / f64::from(n),
                }),
            })
            .collect())
    }
}

// ── Private ───────────────────────────────────────────────────────────────────

fn sort_desc(mut rows: Vec<LocationAmount>) -> Vec<LocationAmount> {
    rows.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.location.cmp(&b.location))
    });
    rows
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::tests::spend;
    use report_core::models::{EventKind, Transaction};

    fn ledger(rows: Vec<Transaction>) -> Ledger {
        Ledger::new(rows, true)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ── End-to-end scenario ───────────────────────────────────────────────────

    #[test]
    fn test_two_swipes_one_breakfast_visit() {
        let spending = ledger(vec![
            spend("2025-03-01 07:00:00", "Canteen A", 10.0),
            spend("2025-03-01 07:10:00", "Canteen A", 5.0),
        ]);

        let stats = SpendingAggregator::meal_stats(&spending).unwrap();
        let breakfast = stats[MealPeriod::Breakfast.index()];
        assert!(approx(breakfast.total, 15.0));
        assert_eq!(breakfast.visits, 1);
        assert!(approx(breakfast.average, 15.0));

        let totals = SpendingAggregator::location_totals(&spending).unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].location, "Canteen A");
        assert!(approx(totals[0].amount, 15.0));
    }

    // ── location_totals ───────────────────────────────────────────────────────

    #[test]
    fn test_location_totals_sorted_with_name_tiebreak() {
        let spending = ledger(vec![
            spend("2025-03-01 07:00:00", "B", 5.0),
            spend("2025-03-01 12:00:00", "C", 20.0),
            spend("2025-03-01 18:00:00", "A", 5.0),
        ]);
        let names: Vec<String> = SpendingAggregator::location_totals(&spending)
            .unwrap()
            .into_iter()
            .map(|r| r.location)
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_location_totals_conserve_spending() {
        let spending = ledger(vec![
            spend("2025-03-01 07:00:00", "A", 3.5),
            spend("2025-03-02 12:00:00", "B", 12.25),
            spend("2025-03-03 23:40:00", "A", -1.5),
            spend("2025-03-04 18:00:00", "C", 8.0),
        ]);
        let sum: f64 = SpendingAggregator::location_totals(&spending)
            .unwrap()
            .iter()
            .map(|r| r.amount)
            .sum();
        let expected: f64 = spending.transactions.iter().map(|t| t.amount).sum();
        assert!(approx(sum, expected));
    }

    #[test]
    fn test_location_totals_skips() {
        let no_column = Ledger::new(vec![spend("2025-03-01 07:00:00", "A", 1.0)], false);
        assert_eq!(
            SpendingAggregator::location_totals(&no_column),
            Err(SkipReason::MissingLocation)
        );
        assert_eq!(
            SpendingAggregator::location_totals(&ledger(vec![])),
            Err(SkipReason::NoSpending)
        );

        let mut unnamed = spend("2025-03-01 07:00:00", "A", 1.0);
        unnamed.location = None;
        assert_eq!(
            SpendingAggregator::location_totals(&ledger(vec![unnamed])),
            Err(SkipReason::NoCanteenData)
        );
    }

    // ── monthly_daily_average ─────────────────────────────────────────────────

    #[test]
    fn test_monthly_daily_average() {
        let spending = ledger(vec![
            spend("2025-02-27 07:00:00", "A", 4.0),
            spend("2025-03-01 07:00:00", "A", 10.0),
            spend("2025-03-01 12:00:00", "A", 10.0),
            spend("2025-03-02 12:00:00", "A", 10.0),
        ]);
        let months = SpendingAggregator::monthly_daily_average(&spending).unwrap();
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].label(), "2025-02");
        assert!(approx(months[0].average, 4.0));
        assert_eq!(months[1].label(), "2025-03");
        assert!(approx(months[1].average, 15.0));
    }

    #[test]
    fn test_monthly_daily_average_needs_timestamps() {
        let mut row = spend("2025-03-01 07:00:00", "A", 1.0);
        row.timestamp = None;
        assert_eq!(
            SpendingAggregator::monthly_daily_average(&ledger(vec![row])),
            Err(SkipReason::NoParseableTimestamps)
        );
    }

    // ── meal_stats ────────────────────────────────────────────────────────────

    #[test]
    fn test_meal_stats_zero_fill_and_visits() {
        let spending = ledger(vec![
            spend("2025-03-01 11:00:00", "A", 12.0),
            spend("2025-03-01 11:05:00", "B", 3.0),
            spend("2025-03-02 11:30:00", "A", 15.0),
        ]);
        let stats = SpendingAggregator::meal_stats(&spending).unwrap();
        assert_eq!(stats.len(), 4);

        let lunch = stats[MealPeriod::Lunch.index()];
        assert_eq!(lunch.visits, 2);
        assert!(approx(lunch.total, 30.0));
        assert!(approx(lunch.average, 15.0));

        let dinner = stats[MealPeriod::Dinner.index()];
        assert_eq!(dinner.visits, 0);
        assert!(approx(dinner.average, 0.0));

        let counts = SpendingAggregator::meal_visit_counts(&spending).unwrap();
        assert_eq!(counts[1], (MealPeriod::Lunch, 2));
        let averages = SpendingAggregator::meal_averages(&spending).unwrap();
        assert_eq!(averages[0], (MealPeriod::Breakfast, 0.0));
    }

    #[test]
    fn test_meal_stats_average_is_total_over_visits() {
        let spending = ledger(vec![
            spend("2025-03-01 07:00:00", "A", 2.0),
            spend("2025-03-02 07:00:00", "A", 3.0),
            spend("2025-03-03 07:00:00", "A", 4.0),
            spend("2025-03-03 20:00:00", "A", 9.0),
        ]);
        for s in SpendingAggregator::meal_stats(&spending).unwrap() {
            let expected = if s.visits == 0 {
                0.0
            } else {
                s.total / f64::from(s.visits)
            };
            assert!(approx(s.average, expected));
        }
    }

    // ── location_meal_average ─────────────────────────────────────────────────

    #[test]
    fn test_location_meal_average() {
        let spending = ledger(vec![
            spend("2025-03-01 07:00:00", "A", 4.0),
            spend("2025-03-01 07:05:00", "A", 2.0),
            spend("2025-03-01 12:00:00", "B", 20.0),
            spend("2025-03-02 12:00:00", "A", 12.0),
        ]);
        let averages = SpendingAggregator::location_meal_average(&spending).unwrap();
        assert_eq!(averages[0].location, "B");
        assert!(approx(averages[0].amount, 20.0));
        assert_eq!(averages[1].location, "A");
        assert!(approx(averages[1].amount, 9.0));
    }

    // ── yearly_spending ───────────────────────────────────────────────────────

    #[test]
    fn test_yearly_spending_counts_only_spending_kinds() {
        let mut topup = spend("2025-05-10 09:00:00", "A", 200.0);
        topup.kind = EventKind::Other("银行卡充值".to_string());
        let all = ledger(vec![
            spend("2025-01-03 12:00:00", "A", 10.0),
            spend("2025-01-04 12:00:00", "A", 5.0),
            spend("2025-12-31 18:00:00", "A", 7.0),
            spend("2024-12-31 18:00:00", "A", 99.0),
            topup,
        ]);
        let yearly = SpendingAggregator::yearly_spending(&all, 2025).unwrap();
        assert!(approx(yearly.total, 22.0));
        assert!(approx(yearly.monthly[0], 15.0));
        assert!(approx(yearly.monthly[4], 0.0));
        assert!(approx(yearly.monthly[11], 7.0));
    }

    #[test]
    fn test_yearly_spending_missing_year() {
        let all = ledger(vec![spend("2024-06-01 12:00:00", "A", 1.0)]);
        assert_eq!(
            SpendingAggregator::yearly_spending(&all, 2025),
            Err(SkipReason::NoRecordsForYear(2025))
        );
    }

    // ── attendance ────────────────────────────────────────────────────────────

    #[test]
    fn test_attendance_single_day_is_full() {
        let spending = ledger(vec![spend("2025-03-01 12:00:00", "A", 10.0)]);
        let report = SpendingAggregator::attendance(&spending).unwrap();
        assert_eq!(report.total_days, 1);
        assert!(approx(report.periods[MealPeriod::Lunch.index()].rate, 100.0));
        assert!(approx(report.periods[MealPeriod::Breakfast.index()].rate, 0.0));
    }

    #[test]
    fn test_attendance_span_includes_unclassified_rows() {
        let spending = ledger(vec![
            spend("2025-03-01 12:00:00", "A", 10.0),
            spend("2025-03-01 12:30:00", "A", 10.0),
            spend("2025-03-04 23:30:00", "A", 3.0),
        ]);
        let report = SpendingAggregator::attendance(&spending).unwrap();
        assert_eq!(report.total_days, 4);
        let lunch = report.periods[MealPeriod::Lunch.index()];
        assert_eq!(lunch.visit_days, 1);
        assert!(approx(lunch.rate, 25.0));
        assert!(report.periods.iter().all(|p| p.rate <= 100.0));
    }

    // ── meal_time_ranges ──────────────────────────────────────────────────────

    #[test]
    fn test_meal_time_ranges() {
        let spending = ledger(vec![
            spend("2025-03-01 07:00:00", "A", 1.0),
            spend("2025-03-01 08:30:00", "A", 1.0),
            spend("2025-03-02 09:00:30", "A", 1.0),
        ]);
        let ranges = SpendingAggregator::meal_time_ranges(&spending).unwrap();
        let breakfast = ranges[MealPeriod::Breakfast.index()].span.unwrap();
        assert!(approx(breakfast.first, 420.0));
        assert!(approx(breakfast.last, 540.5));
        assert!(approx(breakfast.average_first, (420.0 + 540.5) / 2.0));
        assert!(ranges[MealPeriod::Dinner.index()].span.is_none());
    }
}
