use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use report_core::time_utils::minutes_to_label;

use super::{draw_title, DrawResult, AXIS_DESC_SIZE, LABEL_SIZE, VALUE_SIZE};
use crate::fonts::FontConfig;
use crate::palette::{GRAY, GRID_GRAY, ROYAL_BLUE, SEA_GREEN, TOMATO};
use crate::views::DumbbellChart;

/// Fixed clock-time axis in hours: 06:00 to 22:30.
pub const AXIS_HOURS: (f64, f64) = (6.0, 22.5);

const MARKER_SIZE: i32 = 6;
const DIAMOND_SIZE: i32 = 8;

/// Axis tick text for an hour value.
pub fn hour_label(hours: f64) -> String {
    minutes_to_label(hours * 60.0)
}

fn diamond(size: i32) -> Vec<(i32, i32)> {
    vec![(0, -size), (size, 0), (0, size), (-size, 0)]
}

pub fn draw<DB>(area: &DrawingArea<DB, Shift>, chart: &DumbbellChart, font: &FontConfig) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let plot_area = draw_title(area, &[&chart.title], font)?;
    let n = chart.rows.len() as u32;

    let mut ctx = ChartBuilder::on(&plot_area)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0..n).into_segmented(), AXIS_HOURS.0..AXIS_HOURS.1)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .light_line_style(TRANSPARENT)
        .bold_line_style(GRID_GRAY.mix(0.7))
        .x_labels(chart.rows.len().max(1))
        .y_labels(17)
        .label_style(font.font(LABEL_SIZE))
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => chart
                .rows
                .get(*i as usize)
                .map(|(label, _)| label.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&|h| hour_label(*h))
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .axis_desc_style(font.font(AXIS_DESC_SIZE))
        .draw()?;

    let rows: Vec<(u32, _)> = chart
        .rows
        .iter()
        .enumerate()
        .filter_map(|(i, (_, markers))| markers.map(|m| (i as u32, m)))
        .collect();

    ctx.draw_series(rows.iter().map(|(i, m)| {
        PathElement::new(
            vec![
                (SegmentValue::CenterOf(*i), m.first / 60.0),
                (SegmentValue::CenterOf(*i), m.last / 60.0),
            ],
            GRAY.stroke_width(2),
        )
    }))?;

    let label = |pos: Pos| font.font(VALUE_SIZE).color(&BLACK).pos(pos);

    ctx.draw_series(rows.iter().map(|(i, m)| {
        EmptyElement::at((SegmentValue::CenterOf(*i), m.first / 60.0))
            + Circle::new((0, 0), MARKER_SIZE, SEA_GREEN.filled())
            + Text::new(
                minutes_to_label(m.first),
                (0, MARKER_SIZE + 4),
                label(Pos::new(HPos::Center, VPos::Top)),
            )
    }))?
    .label("第一笔消费")
    .legend(|(x, y)| Circle::new((x, y), MARKER_SIZE, SEA_GREEN.filled()));

    ctx.draw_series(rows.iter().map(|(i, m)| {
        EmptyElement::at((SegmentValue::CenterOf(*i), m.last / 60.0))
            + Circle::new((0, 0), MARKER_SIZE, TOMATO.filled())
            + Text::new(
                minutes_to_label(m.last),
                (0, -(MARKER_SIZE + 4)),
                label(Pos::new(HPos::Center, VPos::Bottom)),
            )
    }))?
    .label("最后一笔消费")
    .legend(|(x, y)| Circle::new((x, y), MARKER_SIZE, TOMATO.filled()));

    ctx.draw_series(rows.iter().map(|(i, m)| {
        EmptyElement::at((SegmentValue::CenterOf(*i), m.average / 60.0))
            + Polygon::new(diamond(DIAMOND_SIZE), ROYAL_BLUE.filled())
            + Text::new(
                format!("均 {}", minutes_to_label(m.average)),
                (DIAMOND_SIZE + 6, 0),
                label(Pos::new(HPos::Left, VPos::Center)),
            )
    }))?
    .label("平均开始时间")
    .legend(|(x, y)| {
        Polygon::new(
            diamond(DIAMOND_SIZE)
                .into_iter()
                .map(|(dx, dy)| (x + dx, y + dy))
                .collect::<Vec<_>>(),
            ROYAL_BLUE.filled(),
        )
    });

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(font.font(LABEL_SIZE))
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_label() {
        assert_eq!(hour_label(6.0), "06:00");
        assert_eq!(hour_label(22.5), "22:30");
        assert_eq!(hour_label(12.25), "12:15");
    }

    #[test]
    fn test_axis_spans_meal_window() {
        assert!(AXIS_HOURS.0 <= 6.5);
        assert!(AXIS_HOURS.1 >= 22.5);
    }

    #[test]
    fn test_diamond_is_symmetric() {
        let points = diamond(4);
        assert_eq!(points.len(), 4);
        assert_eq!(points.iter().map(|p| p.0).sum::<i32>(), 0);
        assert_eq!(points.iter().map(|p| p.1).sum::<i32>(), 0);
    }
}
