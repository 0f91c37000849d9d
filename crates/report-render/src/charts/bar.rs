use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use super::{draw_title, value_range, DrawResult, AXIS_DESC_SIZE, LABEL_SIZE, VALUE_SIZE};
use crate::fonts::FontConfig;
use crate::palette::GRID_GRAY;
use crate::views::BarChart;

/// Share of the value span kept free above the tallest bar.
const HEADROOM: f64 = 0.12;

/// Anchor for a value label: above a non-negative bar, below a negative one.
pub fn label_anchor(value: f64) -> Pos {
    if value >= 0.0 {
        Pos::new(HPos::Center, VPos::Bottom)
    } else {
        Pos::new(HPos::Center, VPos::Top)
    }
}

pub fn draw<DB>(area: &DrawingArea<DB, Shift>, chart: &BarChart, font: &FontConfig) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut titles: Vec<&str> = Vec::with_capacity(2);
    if let Some(headline) = chart.headline.as_deref() {
        titles.push(headline);
    }
    titles.push(&chart.title);
    let plot_area = draw_title(area, &titles, font)?;

    let values: Vec<f64> = chart.bars.iter().map(|b| b.value).collect();
    let (bottom, top) = value_range(&values, HEADROOM, chart.min_top);
    let n = chart.bars.len() as u32;

    let longest = chart
        .bars
        .iter()
        .map(|b| b.label.chars().count())
        .max()
        .unwrap_or(0) as u32;
    let x_label_area = if chart.vertical_labels {
        40 + longest * LABEL_SIZE as u32
    } else {
        50
    };

    let mut ctx = ChartBuilder::on(&plot_area)
        .margin(15)
        .x_label_area_size(x_label_area)
        .y_label_area_size(80)
        .build_cartesian_2d((0..n).into_segmented(), bottom..top)?;

    let label_style = if chart.vertical_labels {
        font.font(LABEL_SIZE).transform(FontTransform::Rotate90)
    } else {
        font.font(LABEL_SIZE)
    };

    ctx.configure_mesh()
        .disable_x_mesh()
        .light_line_style(TRANSPARENT)
        .bold_line_style(GRID_GRAY.mix(0.7))
        .x_labels(chart.bars.len().max(1))
        .x_label_style(label_style)
        .y_label_style(font.font(LABEL_SIZE))
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => chart
                .bars
                .get(*i as usize)
                .map(|b| b.label.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .axis_desc_style(font.font(AXIS_DESC_SIZE))
        .draw()?;

    ctx.draw_series(
        Histogram::vertical(&ctx)
            .style(chart.color.filled())
            .margin(12)
            .data(chart.bars.iter().enumerate().map(|(i, b)| (i as u32, b.value))),
    )?;
    ctx.draw_series(
        Histogram::vertical(&ctx)
            .style(BLACK.stroke_width(1))
            .margin(12)
            .data(chart.bars.iter().enumerate().map(|(i, b)| (i as u32, b.value))),
    )?;

    ctx.draw_series(chart.bars.iter().enumerate().map(|(i, b)| {
        Text::new(
            chart.format.format(b.value),
            (SegmentValue::CenterOf(i as u32), b.value),
            font.font(VALUE_SIZE).color(&BLACK).pos(label_anchor(b.value)),
        )
    }))?;

    Ok(())
}
