use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use unicode_width::UnicodeWidthStr;

use super::{draw_title, DrawResult, LABEL_SIZE};
use crate::fonts::FontConfig;
use crate::palette::HEADER_FILL;
use crate::views::TableImage;

const CELL_PADDING: u32 = 24;
const ROW_HEIGHT: i32 = 44;

/// Column widths in pixels: each column gets room for its longest cell,
/// then the widths are scaled to fill `total`.
pub fn column_widths(columns: &[String], rows: &[Vec<String>], total: u32) -> Vec<u32> {
    let natural: Vec<u32> = (0..columns.len())
        .map(|c| {
            let longest = std::iter::once(&columns[c])
                .chain(rows.iter().filter_map(|r| r.get(c)))
                .map(|s| display_width(s))
                .max()
                .unwrap_or(0);
            longest * (LABEL_SIZE as u32) / 2 + CELL_PADDING
        })
        .collect();

    let sum: u32 = natural.iter().sum();
    if sum == 0 {
        return natural;
    }
    natural
        .iter()
        .map(|w| (u64::from(*w) * u64::from(total) / u64::from(sum)) as u32)
        .collect()
}

/// Width in half-em terminal columns: wide (CJK) characters count double.
fn display_width(s: &str) -> u32 {
    s.width() as u32
}

pub fn draw<DB>(area: &DrawingArea<DB, Shift>, table: &TableImage, font: &FontConfig) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let body = draw_title(area, &[&table.title], font)?;
    let (width, height) = body.dim_in_pixel();

    let left = 20;
    let widths = column_widths(&table.columns, &table.rows, width.saturating_sub(40));
    let line_count = table.rows.len() as i32 + 1;
    let top = ((height as i32 - ROW_HEIGHT * line_count) / 2).max(0);

    let text_style = font
        .font(LABEL_SIZE + 1.0)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));

    let lines = std::iter::once(&table.columns).chain(table.rows.iter());
    for (r, cells) in lines.enumerate() {
        let y0 = top + ROW_HEIGHT * r as i32;
        let mut x0 = left;
        for (c, w) in widths.iter().enumerate() {
            let x1 = x0 + *w as i32;
            let corners = [(x0, y0), (x1, y0 + ROW_HEIGHT)];
            if r == 0 {
                body.draw(&Rectangle::new(corners, HEADER_FILL.filled()))?;
            }
            body.draw(&Rectangle::new(corners, BLACK.stroke_width(1)))?;
            if let Some(text) = cells.get(c) {
                body.draw(&Text::new(
                    text.clone(),
                    ((x0 + x1) / 2, y0 + ROW_HEIGHT / 2),
                    text_style.clone(),
                ))?;
            }
            x0 = x1;
        }
    }
    Ok(())
}
