use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

/// Event label of an ordinary card swipe.
pub const CARDHOLDER_SPEND: &str = "持卡人消费";
/// Event label of a payment made with the offline QR code.
pub const OFFLINE_CODE_SPEND: &str = "离线码在线消费";

/// Kind of a card transaction as recorded in the `交易事件` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A swipe of the physical card.
    CardholderSpend,
    /// A payment through the offline code.
    OfflineCodeSpend,
    /// Top-ups, refunds and anything else that is not spending.
    Other(String),
}

impl EventKind {
    /// Map the raw event label onto a kind. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            CARDHOLDER_SPEND => EventKind::CardholderSpend,
            OFFLINE_CODE_SPEND => EventKind::OfflineCodeSpend,
            other => EventKind::Other(other.to_string()),
        }
    }

    /// `true` for the two event kinds that represent money spent at a venue.
    pub fn is_spending(&self) -> bool {
        matches!(self, EventKind::CardholderSpend | EventKind::OfflineCodeSpend)
    }
}

/// A single row of the meal-card export.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Local wall-clock time of the transaction; `None` when the cell could
    /// not be parsed.
    pub timestamp: Option<NaiveDateTime>,
    /// Event kind from the `交易事件` column.
    pub kind: EventKind,
    /// Venue name; `None` when the cell is empty or the column is absent.
    pub location: Option<String>,
    /// Signed amount in yuan.
    pub amount: f64,
}

impl Transaction {
    /// Calendar date of the transaction, if its timestamp parsed.
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp.map(|ts| ts.date())
    }
}

/// The loaded table: every surviving row plus whether the source carried a
/// location column at all.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub transactions: Vec<Transaction>,
    pub has_location: bool,
}

impl Ledger {
    pub fn new(transactions: Vec<Transaction>, has_location: bool) -> Self {
        Self {
            transactions,
            has_location,
        }
    }

    /// Rows whose event kind counts as spending.
    pub fn spending(&self) -> Ledger {
        Ledger {
            transactions: self
                .transactions
                .iter()
                .filter(|t| t.kind.is_spending())
                .cloned()
                .collect(),
            has_location: self.has_location,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Year of the latest parseable timestamp.
    pub fn latest_year(&self) -> Option<i32> {
        use chrono::Datelike as _;
        self.transactions
            .iter()
            .filter_map(|t| t.timestamp)
            .max()
            .map(|ts| ts.year())
    }
}

// ── MealPeriod ────────────────────────────────────────────────────────────────

/// One of the four time-of-day windows a meal can fall into.
///
/// Variant order is the display order and the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MealPeriod {
    /// `[06:30, 10:00)`
    Breakfast,
    /// `[10:00, 15:00)`
    Lunch,
    /// `[15:00, 19:30)`
    Dinner,
    /// `[19:30, 22:30)`
    LateSnack,
}

impl MealPeriod {
    pub const ALL: [MealPeriod; 4] = [
        MealPeriod::Breakfast,
        MealPeriod::Lunch,
        MealPeriod::Dinner,
        MealPeriod::LateSnack,
    ];

    /// First minute of the day that belongs to any period (06:30).
    pub const WINDOW_START: u32 = 6 * 60 + 30;
    /// First minute after the last period (22:30).
    pub const WINDOW_END: u32 = 22 * 60 + 30;

    /// Half-open `[start, end)` bounds in minutes since midnight.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            MealPeriod::Breakfast => (Self::WINDOW_START, 10 * 60),
            MealPeriod::Lunch => (10 * 60, 15 * 60),
            MealPeriod::Dinner => (15 * 60, 19 * 60 + 30),
            MealPeriod::LateSnack => (19 * 60 + 30, Self::WINDOW_END),
        }
    }

    /// Chart label.
    pub fn label(self) -> &'static str {
        match self {
            MealPeriod::Breakfast => "早饭",
            MealPeriod::Lunch => "午饭",
            MealPeriod::Dinner => "晚饭",
            MealPeriod::LateSnack => "夜宵",
        }
    }

    /// Position in [`MealPeriod::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Bucket a minute-of-day; `None` outside `[06:30, 22:30)`.
    pub fn from_minute(minute: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| {
            let (start, end) = p.bounds();
            minute >= start && minute < end
        })
    }

    /// Bucket a timestamp by its clock time, ignoring seconds.
    pub fn from_time(ts: &NaiveDateTime) -> Option<Self> {
        Self::from_minute(ts.hour() * 60 + ts.minute())
    }
}

impl fmt::Display for MealPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
