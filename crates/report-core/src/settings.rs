use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Campus meal-card spending report
#[derive(Parser, Debug, Clone)]
#[command(
    name = "canteen-report",
    about = "Render spending charts from a campus meal-card export",
    version
)]
pub struct Settings {
    /// Data file or directory to search (newest .csv, else newest .xlsx/.xls)
    #[arg(env = "DATA_FILE")]
    pub input: Option<PathBuf>,

    /// Directory the chart images are written to
    #[arg(long, default_value = "Outputs")]
    pub output_dir: PathBuf,

    /// Reporting year for the yearly chart and the extremes table
    /// (defaults to the year of the latest transaction)
    #[arg(long)]
    pub year: Option<i32>,

    /// Font file or installed font family used for chart text
    #[arg(long, env = "CHINESE_FONT_PATH")]
    pub font: Option<String>,

    /// Pie slices below this share (in percent) are merged into "其他"
    #[arg(long, default_value = "3.0")]
    pub other_share: f64,

    /// Canteens visited fewer times than this within a meal are merged into "其他"
    #[arg(long, default_value = "3")]
    pub min_canteen_visits: u32,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::load_from(std::env::args_os())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// The reporting year: `--year` when given, else `fallback`, else the
    /// current local year.
    pub fn reporting_year(&self, fallback: Option<i32>) -> i32 {
        use chrono::Datelike as _;
        self.year
            .or(fallback)
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
