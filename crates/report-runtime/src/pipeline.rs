//! Sequential report pipeline.
//!
//! Runs every [`Stage`] against one [`ReportContext`], renders what the
//! stage produced and records a [`StageOutcome`] per stage. Skips are logged
//! and the run continues; a render failure aborts the run.

use std::path::PathBuf;

use report_core::error::{Result, SkipReason};
use report_render::renderer::ChartRenderer;
use tracing::info;

use crate::stages::{standard_stages, PlannedChart, ReportContext, Stage};

// ── Public types ──────────────────────────────────────────────────────────────

/// What happened to one stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    Rendered(PathBuf),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub stage: &'static str,
    pub outcome: StageOutcome,
}

/// Outcomes of a whole run in stage order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub records: Vec<StageRecord>,
}

impl PipelineReport {
    /// Paths written, in stage order.
    pub fn rendered(&self) -> Vec<&PathBuf> {
        self.records
            .iter()
            .filter_map(|r| match &r.outcome {
                StageOutcome::Rendered(path) => Some(path),
                StageOutcome::Skipped(_) => None,
            })
            .collect()
    }

    /// Skipped stages with their reasons.
    pub fn skipped(&self) -> Vec<(&'static str, &SkipReason)> {
        self.records
            .iter()
            .filter_map(|r| match &r.outcome {
                StageOutcome::Skipped(reason) => Some((r.stage, reason)),
                StageOutcome::Rendered(_) => None,
            })
            .collect()
    }

    /// Log how many charts were written and why the others were skipped.
    pub fn log_summary(&self) {
        let skipped = self.skipped();
        info!(
            "Report finished: {} chart(s) rendered, {} skipped",
            self.rendered().len(),
            skipped.len()
        );
        for (stage, reason) in skipped {
            info!("  skipped {}: {}", stage, reason);
        }
    }
}

// ── ReportPipeline ────────────────────────────────────────────────────────────

/// Runs the chart stages through one renderer.
pub struct ReportPipeline {
    renderer: ChartRenderer,
    stages: Vec<Stage>,
}

impl ReportPipeline {
    /// Pipeline with the twelve standard charts.
    pub fn new(renderer: ChartRenderer) -> Self {
        Self::with_stages(renderer, standard_stages())
    }

    pub fn with_stages(renderer: ChartRenderer, stages: Vec<Stage>) -> Self {
        Self { renderer, stages }
    }

    /// Run every stage in order.
    pub fn run(&self, ctx: &ReportContext<'_>) -> Result<PipelineReport> {
        self.run_with(ctx, |planned| {
            self.renderer.render(&planned.view, &planned.file_stem)
        })
    }

    /// Run every stage, handing planned charts to `render`.
    pub fn run_with(
        &self,
        ctx: &ReportContext<'_>,
        mut render: impl FnMut(&PlannedChart) -> Result<PathBuf>,
    ) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();

        for stage in &self.stages {
            let outcome = match (stage.build)(ctx) {
                Ok(planned) => {
                    let path = render(&planned)?;
                    info!("Saved {}", path.display());
                    StageOutcome::Rendered(path)
                }
                Err(reason) => {
                    info!("Skipping {}: {}", stage.name, reason);
                    StageOutcome::Skipped(reason)
                }
            };
            report.records.push(StageRecord {
                stage: stage.name,
                outcome,
            });
        }

        Ok(report)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
