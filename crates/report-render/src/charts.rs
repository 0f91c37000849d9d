//! plotters drawing routines, one module per chart kind.

pub mod bar;
pub mod dumbbell;
pub mod pie;
pub mod stacked;
pub mod table;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::fonts::FontConfig;

pub(crate) type DrawResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub(crate) const TITLE_SIZE: f64 = 24.0;
pub(crate) const AXIS_DESC_SIZE: f64 = 17.0;
pub(crate) const LABEL_SIZE: f64 = 14.0;
pub(crate) const VALUE_SIZE: f64 = 13.0;

/// Draw `lines` centred at the top of `area`, first line on top, and return
/// the area below them.
pub(crate) fn draw_title<DB>(
    area: &DrawingArea<DB, Shift>,
    lines: &[&str],
    font: &FontConfig,
) -> DrawResult<DrawingArea<DB, Shift>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut remaining = area.clone();
    for line in lines {
        remaining = remaining.titled(line, font.font(TITLE_SIZE).color(&BLACK))?;
    }
    Ok(remaining)
}

/// Vertical axis range covering every value and zero, with `headroom` of the
/// span added on the side(s) that hold data so value labels fit.
pub fn value_range(values: &[f64], headroom: f64, min_top: Option<f64>) -> (f64, f64) {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let min = values.iter().copied().fold(0.0_f64, f64::min);
    let span = if max - min > 0.0 { max - min } else { 1.0 };

    let mut top = if max > 0.0 || min == 0.0 {
        max + span * headroom
    } else {
        0.0
    };
    let bottom = if min < 0.0 { min - span * headroom } else { 0.0 };

    if let Some(floor) = min_top {
        top = top.max(floor);
    }
    (bottom, top)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
