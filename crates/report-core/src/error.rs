use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a report run.
#[derive(Error, Debug)]
pub enum ReportError {
    /// No `.csv`, `.xlsx` or `.xls` file was found in the search directory.
    #[error("No .csv or .xlsx/.xls data file found in {0}")]
    NoDataFile(PathBuf),

    /// The input file has an extension the loader cannot dispatch on.
    #[error("Unsupported file extension for {0}: only .csv or .xlsx/.xls files are supported")]
    UnsupportedExtension(PathBuf),

    /// The file needs a parser that was not compiled into this build.
    #[error("{path} is an Excel file but Excel support is not compiled in. {remedy}")]
    MissingDependency { path: PathBuf, remedy: String },

    /// A required column is absent from the header row.
    #[error("Required column \"{column}\" not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// An amount cell did not hold a number.
    #[error("Invalid amount \"{value}\" on data row {row}")]
    InvalidAmount { row: usize, value: String },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the input.
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// The Excel reader rejected the input.
    #[error("Failed to parse Excel workbook: {0}")]
    ExcelParse(String),

    /// A chart could not be drawn or written.
    #[error("Failed to render chart {title}: {message}")]
    Render { title: String, message: String },
}

/// Convenience alias used throughout the report crates.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Why a single chart was left out of the report.
///
/// These never abort the run; the stage that produced one is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("no spending records")]
    NoSpending,

    #[error("no parseable transaction timestamps")]
    NoParseableTimestamps,

    #[error("no transactions between 06:30 and 22:30")]
    OutsideMealWindow,

    #[error("no records in {0}")]
    NoRecordsForYear(i32),

    #[error("the location column is missing")]
    MissingLocation,

    #[error("no canteen data")]
    NoCanteenData,
}
