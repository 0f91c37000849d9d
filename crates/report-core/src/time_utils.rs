use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

/// Timestamp layouts seen in meal-card exports, most common first.
const FMTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse a local wall-clock timestamp.
///
/// Returns `None` for empty strings or unrecognised formats. No timezone is
/// attached: meal periods are defined on the clock time printed in the
/// export.
pub fn parse_local_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    debug!("could not parse timestamp \"{}\"", s);
    None
}

/// Convert an Excel serial day number (1900 date system) to a timestamp.
///
/// Serial 60 is the phantom 1900-02-29; values above it are shifted so that
/// serial 61 is 1900-03-01.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let adjusted = if serial < 61.0 { serial + 1.0 } else { serial };
    let millis = (adjusted * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

// ── Clock arithmetic ──────────────────────────────────────────────────────────

/// Minutes since midnight including seconds as a fraction.
pub fn minute_of_day(ts: &NaiveDateTime) -> f64 {
    f64::from(ts.hour() * 60 + ts.minute()) + f64::from(ts.second()) / 60.0
}

/// Format a minute-of-day value as `HH:MM`, rounding to the nearest minute
/// and clamping negatives to midnight.
pub fn minutes_to_label(value: f64) -> String {
    let rounded = value.round().max(0.0) as u64;
    format!("{:02}:{:02}", rounded / 60, rounded % 60)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
