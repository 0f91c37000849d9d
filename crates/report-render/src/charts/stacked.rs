use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{draw_title, value_range, DrawResult, AXIS_DESC_SIZE, LABEL_SIZE, VALUE_SIZE};
use crate::fonts::FontConfig;
use crate::palette::{categorical, text_color_on, GRID_GRAY, LIGHT_GRAY};
use crate::views::StackedBarChart;

const LEGEND_WIDTH: i32 = 240;
const BAR_MARGIN: u32 = 30;

/// Fill colour per series: the cycle in legend order, light grey for the
/// muted series.
pub fn series_colors(series: &[String], muted: Option<&str>) -> Vec<(String, RGBColor)> {
    let mut next = 0;
    series
        .iter()
        .map(|name| {
            if Some(name.as_str()) == muted {
                (name.clone(), LIGHT_GRAY)
            } else {
                let color = categorical(next);
                next += 1;
                (name.clone(), color)
            }
        })
        .collect()
}

pub fn draw<DB>(
    area: &DrawingArea<DB, Shift>,
    chart: &StackedBarChart,
    font: &FontConfig,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let body = draw_title(area, &[&chart.title], font)?;
    let (width, _) = body.dim_in_pixel();
    let (plot_area, legend_area) = body.split_horizontally(width as i32 - LEGEND_WIDTH);

    let colors = series_colors(&chart.series, chart.muted_series.as_deref());
    let color_of = |label: &str| {
        colors
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, c)| *c)
            .unwrap_or(LIGHT_GRAY)
    };

    let heights: Vec<f64> = chart
        .stacks
        .iter()
        .map(|s| f64::from(s.iter().map(|seg| seg.count).sum::<u32>()))
        .collect();
    let (_, top) = value_range(&heights, 0.08, None);
    let n = chart.categories.len() as u32;

    let mut ctx = ChartBuilder::on(&plot_area)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0..n).into_segmented(), 0.0..top)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .light_line_style(TRANSPARENT)
        .bold_line_style(GRID_GRAY.mix(0.7))
        .x_labels(chart.categories.len().max(1))
        .label_style(font.font(LABEL_SIZE))
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => chart
                .categories
                .get(*i as usize)
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&|v| format!("{v:.0}"))
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .axis_desc_style(font.font(AXIS_DESC_SIZE))
        .draw()?;

    for (i, stack) in chart.stacks.iter().enumerate() {
        let i = i as u32;
        let mut bottom = 0.0;
        for segment in stack {
            let fill = color_of(&segment.label);
            let upper = bottom + f64::from(segment.count);
            let corners = [
                (SegmentValue::Exact(i), bottom),
                (SegmentValue::Exact(i + 1), upper),
            ];

            let mut bar = Rectangle::new(corners.clone(), fill.filled());
            bar.set_margin(0, 0, BAR_MARGIN, BAR_MARGIN);
            let mut edge = Rectangle::new(corners, WHITE.stroke_width(1));
            edge.set_margin(0, 0, BAR_MARGIN, BAR_MARGIN);
            ctx.draw_series([bar, edge])?;

            ctx.draw_series(std::iter::once(Text::new(
                segment.count.to_string(),
                (SegmentValue::CenterOf(i), (bottom + upper) / 2.0),
                font.font(VALUE_SIZE)
                    .color(&text_color_on(fill))
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            )))?;
            bottom = upper;
        }
    }

    draw_legend(&legend_area, &chart.legend_title, &colors, font)?;
    Ok(())
}

fn draw_legend<DB>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    colors: &[(String, RGBColor)],
    font: &FontConfig,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (_, height) = area.dim_in_pixel();
    let row = (LABEL_SIZE * 1.8) as i32;
    let top = (height as i32 - row * (colors.len() as i32 + 1)) / 2;
    let style = font
        .font(LABEL_SIZE)
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));

    area.draw(&Text::new(title.to_string(), (12, top + row / 2), style.clone()))?;
    for (i, (name, color)) in colors.iter().enumerate() {
        let y = top + row * (i as i32 + 1) + row / 2;
        area.draw(&Rectangle::new([(12, y - 7), (30, y + 7)], color.filled()))?;
        area.draw(&Text::new(name.clone(), (38, y), style.clone()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::TAB20;

    #[test]
    fn test_series_colors_mute_other() {
        let series = vec!["A".to_string(), "B".to_string(), "其他".to_string()];
        let colors = series_colors(&series, Some("其他"));
        assert_eq!(colors[0].1, TAB20[0]);
        assert_eq!(colors[1].1, TAB20[1]);
        assert_eq!(colors[2].1, LIGHT_GRAY);
    }

    #[test]
    fn test_series_colors_without_muted() {
        let series: Vec<String> = (0..22).map(|i| format!("c{i}")).collect();
        let colors = series_colors(&series, None);
        assert_eq!(colors[20].1, TAB20[0]);
        assert_eq!(colors[21].1, TAB20[1]);
    }
}
