use std::f64::consts::TAU;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{draw_title, DrawResult, LABEL_SIZE, VALUE_SIZE};
use crate::fonts::FontConfig;
use crate::palette::slice_color;
use crate::views::{Bar, PieChart};

const LABEL_RADIUS: f64 = 0.7;
const LEGEND_WIDTH: i32 = 260;

/// A slice ready for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    /// Percent of the drawn total.
    pub share: f64,
    pub show_label: bool,
}

/// Merge slices below `min_share` percent into one `other_label` slice at the
/// end. Non-positive values cannot be drawn as wedges and are dropped.
pub fn merge_small_slices(items: &[Bar], min_share: f64, other_label: &str) -> Vec<PieSlice> {
    let positive: Vec<&Bar> = items.iter().filter(|b| b.value > 0.0).collect();
    let total: f64 = positive.iter().map(|b| b.value).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut merged: Vec<(String, f64)> = Vec::with_capacity(positive.len());
    let mut other = 0.0;
    for bar in positive {
        if bar.value / total * 100.0 >= min_share {
            merged.push((bar.label.clone(), bar.value));
        } else {
            other += bar.value;
        }
    }
    if other > 0.0 {
        merged.push((other_label.to_string(), other));
    }

    merged
        .into_iter()
        .map(|(label, value)| {
            let share = value / total * 100.0;
            PieSlice {
                show_label: label == other_label || share >= min_share,
                label,
                value,
                share,
            }
        })
        .collect()
}

/// Start and end angle of each slice in radians, measured clockwise from
/// 12 o'clock.
pub fn slice_angles(slices: &[PieSlice]) -> Vec<(f64, f64)> {
    let total: f64 = slices.iter().map(|s| s.value).sum();
    let mut start = 0.0;
    slices
        .iter()
        .map(|s| {
            let end = start + s.value / total * TAU;
            let span = (start, end);
            start = end;
            span
        })
        .collect()
}

/// Pixel position at `angle` (clockwise from 12 o'clock) and `radius`.
pub fn polar_point(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.sin()).round() as i32,
        center.1 - (radius * angle.cos()).round() as i32,
    )
}

pub fn draw<DB>(area: &DrawingArea<DB, Shift>, chart: &PieChart, font: &FontConfig) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let body = draw_title(area, &[&chart.title], font)?;
    let slices = merge_small_slices(&chart.slices, chart.min_share, &chart.other_label);
    let angles = slice_angles(&slices);

    let (width, height) = body.dim_in_pixel();
    let pie_width = width as i32 - LEGEND_WIDTH;
    let (pie_area, legend_area) = body.split_horizontally(pie_width);

    let center = (pie_width / 2, height as i32 / 2);
    let radius = f64::from(pie_width.min(height as i32)) * 0.42;

    for (i, (start, end)) in angles.iter().enumerate() {
        let steps = (((end - start) / TAU) * 360.0).ceil().max(2.0) as usize;
        let mut points = Vec::with_capacity(steps + 2);
        points.push(center);
        for k in 0..=steps {
            let angle = start + (end - start) * k as f64 / steps as f64;
            points.push(polar_point(center, radius, angle));
        }
        pie_area.draw(&Polygon::new(points.clone(), slice_color(i).filled()))?;
        pie_area.draw(&PathElement::new(points, WHITE.stroke_width(1)))?;
    }

    let label_style = font
        .font(VALUE_SIZE + 1.0)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    for (slice, (start, end)) in slices.iter().zip(&angles) {
        if !slice.show_label {
            continue;
        }
        let at = polar_point(center, radius * LABEL_RADIUS, (start + end) / 2.0);
        pie_area.draw(&Text::new(format!("{:.1}%", slice.share), at, label_style.clone()))?;
    }

    draw_legend(&legend_area, &chart.legend_title, &slices, font)?;
    Ok(())
}

fn draw_legend<DB>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    slices: &[PieSlice],
    font: &FontConfig,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (_, height) = area.dim_in_pixel();
    let row = (LABEL_SIZE * 1.8) as i32;
    let top = (height as i32 - row * (slices.len() as i32 + 1)) / 2;

    let style = font
        .font(LABEL_SIZE)
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    area.draw(&Text::new(title.to_string(), (10, top + row / 2), style.clone()))?;

    for (i, slice) in slices.iter().enumerate() {
        let y = top + row * (i as i32 + 1) + row / 2;
        area.draw(&Rectangle::new(
            [(10, y - 7), (28, y + 7)],
            slice_color(i).filled(),
        ))?;
        area.draw(&Text::new(slice.label.clone(), (36, y), style.clone()))?;
    }
    Ok(())
}
