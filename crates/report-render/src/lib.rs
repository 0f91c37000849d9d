//! Chart rendering for the canteen report.
//!
//! Turns render-ready [`views::ChartView`] values into PNG files with
//! [`plotters`]: bar, pie, stacked bar and dumbbell charts plus a text
//! table. Font selection lives in [`fonts`], colours in [`palette`].

pub mod charts;
pub mod fonts;
pub mod palette;
pub mod renderer;
pub mod views;

pub use report_core as core;

pub use fonts::FontConfig;
pub use renderer::ChartRenderer;
pub use views::ChartView;
