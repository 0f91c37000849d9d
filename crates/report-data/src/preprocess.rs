//! Location denylist filtering.

use report_core::models::Ledger;
use tracing::debug;

/// Location substrings that mark non-canteen rows: building floors (楼),
/// the Tmall storefront (天猫) and the student-card fixed cost (学生卡成本).
pub const LOCATION_DENYLIST: &[&str] = &["楼", "天猫", "学生卡成本"];

/// Drops rows whose location contains any denylisted token.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    tokens: Vec<String>,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(LOCATION_DENYLIST.iter().copied())
    }
}

impl Preprocessor {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
        }
    }

    /// `true` when `location` contains one of the tokens.
    pub fn is_denied(&self, location: &str) -> bool {
        self.tokens.iter().any(|t| location.contains(t.as_str()))
    }

    /// Filter `ledger`. Rows without a location are kept, and a ledger from a
    /// source without a location column passes through unchanged.
    pub fn apply(&self, mut ledger: Ledger) -> Ledger {
        if !ledger.has_location {
            return ledger;
        }

        let before = ledger.len();
        ledger.transactions.retain(|t| match &t.location {
            Some(location) => !self.is_denied(location),
            None => true,
        });
        debug!("Denylist removed {} of {} rows", before - ledger.len(), before);
        ledger
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
