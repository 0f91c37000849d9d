//! Writes chart views to PNG files.

use std::path::{Path, PathBuf};

use plotters::prelude::*;
use report_core::error::{ReportError, Result};
use tracing::debug;

use crate::charts::{self, DrawResult};
use crate::fonts::FontConfig;
use crate::views::{safe_file_name, ChartView};

/// Draws [`ChartView`]s into an output directory with one font family.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    output_dir: PathBuf,
    font: FontConfig,
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, font: FontConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            font,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn font(&self) -> &FontConfig {
        &self.font
    }

    /// Path the chart named `file_stem` is written to.
    pub fn target_path(&self, file_stem: &str) -> PathBuf {
        self.output_dir.join(safe_file_name(file_stem))
    }

    /// Draw `view` to `<output_dir>/<file_stem>.png` and return the path.
    pub fn render(&self, view: &ChartView, file_stem: &str) -> Result<PathBuf> {
        let path = self.target_path(file_stem);
        self.draw_png(view, &path).map_err(|e| ReportError::Render {
            title: view.title().to_string(),
            message: e.to_string(),
        })?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    fn draw_png(&self, view: &ChartView, path: &Path) -> DrawResult {
        let root = BitMapBackend::new(path, view.size()).into_drawing_area();
        root.fill(&WHITE)?;

        match view {
            ChartView::Bar(chart) => charts::bar::draw(&root, chart, &self.font)?,
            ChartView::Pie(chart) => charts::pie::draw(&root, chart, &self.font)?,
            ChartView::Stacked(chart) => charts::stacked::draw(&root, chart, &self.font)?,
            ChartView::Dumbbell(chart) => charts::dumbbell::draw(&root, chart, &self.font)?,
            ChartView::Table(table) => charts::table::draw(&root, table, &self.font)?,
        }

        root.present()?;
        Ok(())
    }
}
