mod bootstrap;

use anyhow::{Context, Result};
use report_core::formatting::{format_yuan, percentage};
use report_core::models::Ledger;
use report_core::settings::Settings;
use report_data::{find_data_file, load_ledger, Preprocessor, SpendingAggregator};
use report_render::{ChartRenderer, FontConfig};
use report_runtime::{ReportContext, ReportPipeline};

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;
    tracing::info!("canteen-report v{} starting", env!("CARGO_PKG_VERSION"));

    let cwd = std::env::current_dir().context("cannot determine the working directory")?;
    let data_file = find_data_file(settings.input.as_deref(), &cwd)?;
    tracing::info!("Reading {}", data_file.display());

    let ledger = Preprocessor::default().apply(load_ledger(&data_file)?);
    let spending = ledger.spending();
    tracing::info!(
        "{} rows after filtering, {} spending rows",
        ledger.len(),
        spending.len()
    );

    let year = settings.reporting_year(ledger.latest_year());
    tracing::info!("Reporting year: {}", year);

    let font = FontConfig::resolve(settings.font.as_deref(), &cwd);
    let output_dir = bootstrap::ensure_output_dir(&settings.output_dir)?;

    let ctx = ReportContext {
        ledger: &ledger,
        spending: &spending,
        year,
        other_share: settings.other_share,
        min_canteen_visits: settings.min_canteen_visits,
    };
    let report = ReportPipeline::new(ChartRenderer::new(output_dir, font)).run(&ctx)?;
    report.log_summary();

    print_location_totals(&spending);
    Ok(())
}

/// Print the per-location totals to stdout.
fn print_location_totals(spending: &Ledger) {
    println!("统计结果：");
    match SpendingAggregator::location_totals(spending) {
        Ok(totals) => {
            let sum: f64 = totals.iter().map(|t| t.amount).sum();
            for t in &totals {
                println!(
                    "{}\t{}\t{:.1}%",
                    t.location,
                    format_yuan(t.amount),
                    percentage(t.amount, sum, 1)
                );
            }
        }
        Err(reason) => println!("（{}）", reason),
    }
}
