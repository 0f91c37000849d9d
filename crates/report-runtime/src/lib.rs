//! Report orchestration for the canteen report.
//!
//! Maps the data layer's aggregates onto chart views and runs them through
//! the renderer in a fixed order, collecting one outcome per chart.

pub mod pipeline;
pub mod stages;

pub use report_core as core;
pub use report_data as data;

pub use pipeline::{PipelineReport, ReportPipeline, StageOutcome};
pub use stages::ReportContext;
