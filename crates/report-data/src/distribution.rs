//! Which canteens each meal period was eaten at.

use std::collections::{BTreeMap, HashSet};

use report_core::error::SkipReason;
use report_core::models::{Ledger, MealPeriod};
use tracing::debug;

use crate::meals::{classify, VisitKey};

/// Label of the merged low-count segment.
pub const OTHER_LABEL: &str = "其他";

/// Default minimum visits for a canteen to keep its own segment.
pub const DEFAULT_MIN_VISITS: u32 = 3;

/// One stacked segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub canteen: String,
    pub count: u32,
}

impl Segment {
    pub fn is_other(&self) -> bool {
        self.canteen == OTHER_LABEL
    }
}

/// Segments of one period, largest first with [`OTHER_LABEL`] last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodDistribution {
    pub period: MealPeriod,
    pub segments: Vec<Segment>,
}

impl PeriodDistribution {
    pub fn total(&self) -> u32 {
        self.segments.iter().map(|s| s.count).sum()
    }
}

/// Visit counts per `(period, canteen)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanteenDistribution {
    /// Legend order: overall count descending, then [`OTHER_LABEL`] when any
    /// period merged a segment.
    pub canteens: Vec<String>,
    /// All four periods in display order; a period without visits has no
    /// segments.
    pub periods: Vec<PeriodDistribution>,
}

impl CanteenDistribution {
    /// Count distinct `(date, period, location)` visits.
    ///
    /// In a period with at least `min_visits` visits in total, canteens below
    /// `min_visits` are merged into [`OTHER_LABEL`]. Smaller periods keep
    /// every canteen.
    pub fn build(spending: &Ledger, min_visits: u32) -> Result<Self, SkipReason> {
        let records = classify(&spending.transactions)?;
        if !spending.has_location {
            return Err(SkipReason::MissingLocation);
        }

        let visits: HashSet<(VisitKey, &str)> = records
            .iter()
            .filter_map(|r| r.location().map(|loc| (r.visit(), loc)))
            .collect();

        let mut per_period: [BTreeMap<&str, u32>; 4] = Default::default();
        let mut overall: BTreeMap<&str, u32> = BTreeMap::new();
        for ((_, period), location) in &visits {
            *per_period[period.index()].entry(*location).or_insert(0) += 1;
            *overall.entry(*location).or_insert(0) += 1;
        }
        if overall.is_empty() {
            return Err(SkipReason::NoCanteenData);
        }

        let mut canteens: Vec<(&str, u32)> = overall.into_iter().collect();
        canteens.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let mut canteens: Vec<String> = canteens.into_iter().map(|(c, _)| c.to_string()).collect();

        let mut need_other = false;
        let periods: Vec<PeriodDistribution> = MealPeriod::ALL
            .iter()
            .map(|&period| {
                let segments = stack_segments(&per_period[period.index()], min_visits);
                need_other |= segments.iter().any(Segment::is_other);
                PeriodDistribution { period, segments }
            })
            .collect();

        if need_other {
            canteens.push(OTHER_LABEL.to_string());
        }
        debug!(
            "Canteen distribution: {} canteens, other segment {}",
            canteens.len(),
            need_other
        );

        Ok(Self { canteens, periods })
    }

    /// `true` when some period merged canteens into [`OTHER_LABEL`].
    pub fn has_other(&self) -> bool {
        self.canteens.iter().any(|c| c == OTHER_LABEL)
    }
}

/// Order one period's counts, merging small canteens when the period is big
/// enough.
fn stack_segments(counts: &BTreeMap<&str, u32>, min_visits: u32) -> Vec<Segment> {
    let total: u32 = counts.values().sum();
    let mut segments: Vec<Segment> = Vec::with_capacity(counts.len());
    let mut other = 0;

    for (&canteen, &count) in counts {
        if total >= min_visits && count < min_visits {
            other += count;
        } else {
            segments.push(Segment {
                canteen: canteen.to_string(),
                count,
            });
        }
    }

    segments.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.canteen.cmp(&b.canteen)));
    if other > 0 {
        segments.push(Segment {
            canteen: OTHER_LABEL.to_string(),
            count: other,
        });
    }
    segments
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::tests::spend;

    fn lunches(location: &str, days: u32) -> Vec<report_core::models::Transaction> {
        (1..=days)
            .map(|d| spend(&format!("2025-03-{d:02} 12:00:00"), location, 10.0))
            .collect()
    }

    #[test]
    fn test_small_canteens_merge_into_other_last() {
        let mut rows = lunches("A", 5);
        rows.extend(lunches("B", 1));
        rows.extend(lunches("C", 2));
        let dist = CanteenDistribution::build(&Ledger::new(rows, true), 3).unwrap();

        let lunch = &dist.periods[MealPeriod::Lunch.index()];
        let labels: Vec<&str> = lunch.segments.iter().map(|s| s.canteen.as_str()).collect();
        assert_eq!(labels, vec!["A", OTHER_LABEL]);
        assert_eq!(lunch.segments[1].count, 3);
        assert_eq!(lunch.total(), 8);

        assert_eq!(dist.canteens, vec!["A", "C", "B", OTHER_LABEL]);
        assert!(dist.has_other());
    }

    #[test]
    fn test_small_period_keeps_every_canteen() {
        let rows = vec![
            spend("2025-03-01 07:00:00", "A", 3.0),
            spend("2025-03-02 07:00:00", "B", 3.0),
        ];
        let dist = CanteenDistribution::build(&Ledger::new(rows, true), 3).unwrap();

        let breakfast = &dist.periods[MealPeriod::Breakfast.index()];
        assert_eq!(breakfast.segments.len(), 2);
        assert!(!dist.has_other());
        assert_eq!(dist.canteens, vec!["A", "B"]);
    }

    #[test]
    fn test_repeat_swipes_count_once_per_visit() {
        let rows = vec![
            spend("2025-03-01 12:00:00", "A", 3.0),
            spend("2025-03-01 12:05:00", "A", 3.0),
            spend("2025-03-01 12:10:00", "B", 3.0),
        ];
        let dist = CanteenDistribution::build(&Ledger::new(rows, true), 3).unwrap();
        let lunch = &dist.periods[MealPeriod::Lunch.index()];
        assert_eq!(lunch.total(), 2);
        assert!(dist.periods[MealPeriod::Dinner.index()].segments.is_empty());
    }

    #[test]
    fn test_threshold_is_configurable() {
        let mut rows = lunches("A", 5);
        rows.extend(lunches("B", 2));
        let dist = CanteenDistribution::build(&Ledger::new(rows, true), 2).unwrap();
        assert!(!dist.has_other());
    }

    #[test]
    fn test_missing_location_column() {
        let rows = lunches("A", 1);
        assert_eq!(
            CanteenDistribution::build(&Ledger::new(rows, false), 3),
            Err(SkipReason::MissingLocation)
        );
    }
}
