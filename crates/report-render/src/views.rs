//! Render-ready chart descriptions.
//!
//! Views carry display strings and numbers only; the runtime layer builds
//! them from the aggregates.

use plotters::style::RGBColor;

/// How bar values are printed above (or below) the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// `12.34`
    Decimal,
    /// `12`
    Count,
    /// `12.3%`
    Percent,
}

impl ValueFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            ValueFormat::Decimal => format!("{value:.2}"),
            ValueFormat::Count => format!("{value:.0}"),
            ValueFormat::Percent => format!("{value:.1}%"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

impl Bar {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Vertical bar chart with value labels.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    /// Extra line drawn above the title.
    pub headline: Option<String>,
    pub x_desc: String,
    pub y_desc: String,
    pub bars: Vec<Bar>,
    pub color: RGBColor,
    pub format: ValueFormat,
    /// Draw the category labels vertically (long location names).
    pub vertical_labels: bool,
    /// The y axis reaches at least this value.
    pub min_top: Option<f64>,
    pub size: (u32, u32),
}

impl BarChart {
    pub fn new(title: impl Into<String>, bars: Vec<Bar>, color: RGBColor) -> Self {
        Self {
            title: title.into(),
            headline: None,
            x_desc: String::new(),
            y_desc: String::new(),
            bars,
            color,
            format: ValueFormat::Decimal,
            vertical_labels: false,
            min_top: None,
            size: (800, 600),
        }
    }

    pub fn axes(mut self, x_desc: impl Into<String>, y_desc: impl Into<String>) -> Self {
        self.x_desc = x_desc.into();
        self.y_desc = y_desc.into();
        self
    }
}

/// Pie chart of location totals.
#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub legend_title: String,
    pub slices: Vec<Bar>,
    /// Slices below this share (percent) are merged, and their labels hidden.
    pub min_share: f64,
    /// Label of the merged slice; always labelled.
    pub other_label: String,
    pub size: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSegment {
    pub label: String,
    pub count: u32,
}

/// Stacked count bars, one stack per category.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBarChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub legend_title: String,
    pub categories: Vec<String>,
    /// Bottom-to-top segments per category.
    pub stacks: Vec<Vec<StackSegment>>,
    /// Legend entries in order; colours follow this order.
    pub series: Vec<String>,
    /// Series drawn in light grey instead of a cycle colour.
    pub muted_series: Option<String>,
    pub size: (u32, u32),
}

/// First, last and average-first times of one category, in minutes since
/// midnight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeMarkers {
    pub first: f64,
    pub last: f64,
    pub average: f64,
}

/// Vertical dumbbells over a clock-time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DumbbellChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub rows: Vec<(String, Option<TimeMarkers>)>,
    pub size: (u32, u32),
}

/// A text table drawn as an image.
#[derive(Debug, Clone, PartialEq)]
pub struct TableImage {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub size: (u32, u32),
}

/// Any chart the renderer can draw.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartView {
    Bar(BarChart),
    Pie(PieChart),
    Stacked(StackedBarChart),
    Dumbbell(DumbbellChart),
    Table(TableImage),
}

impl ChartView {
    pub fn title(&self) -> &str {
        match self {
            ChartView::Bar(c) => &c.title,
            ChartView::Pie(c) => &c.title,
            ChartView::Stacked(c) => &c.title,
            ChartView::Dumbbell(c) => &c.title,
            ChartView::Table(c) => &c.title,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        match self {
            ChartView::Bar(c) => c.size,
            ChartView::Pie(c) => c.size,
            ChartView::Stacked(c) => c.size,
            ChartView::Dumbbell(c) => c.size,
            ChartView::Table(c) => c.size,
        }
    }
}

/// PNG file name for a chart title; `/` would split the path.
pub fn safe_file_name(stem: &str) -> String {
    format!("{}.png", stem.replace('/', "_"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
