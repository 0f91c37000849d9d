//! Number formatting for console output.

/// Fixed-precision number with comma thousands separators.
///
/// ```
/// use report_core::formatting::format_number;
///
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.5, 2), "-9,876.50");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let fixed = format!("{:.*}", decimals as usize, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    // A value that rounds to zero prints without a sign.
    if value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Amount in yuan: two decimals and the `元` unit.
pub fn format_yuan(amount: f64) -> String {
    format!("{} 元", format_number(amount, 2))
}

/// `part` as a percentage of `whole`, rounded to `decimal_places`; `0.0` for
/// an empty whole.
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let factor = 10_f64.powi(decimal_places as i32);
    (part / whole * 100.0 * factor).round() / factor
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(format_number(5.0, 0), "5");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1_000.0, 0), "1,000");
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
        assert_eq!(format_number(12_345_678.25, 2), "12,345,678.25");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-2.5, 2), "-2.50");
        assert_eq!(format_number(-1_500.0, 0), "-1,500");
    }

    #[test]
    fn test_format_number_negative_zero_has_no_sign() {
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    // ── format_yuan ──────────────────────────────────────────────────────────

    #[test]
    fn test_format_yuan() {
        assert_eq!(format_yuan(15.0), "15.00 元");
        assert_eq!(format_yuan(1_000_000.0), "1,000,000.00 元");
    }

    // ── percentage ───────────────────────────────────────────────────────────

    #[test]
    fn test_percentage_rounds() {
        assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
        assert!((percentage(1.0, 3.0, 2) - 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_percentage_empty_whole_is_zero() {
        assert_eq!(percentage(10.0, 0.0, 2), 0.0);
    }
}
