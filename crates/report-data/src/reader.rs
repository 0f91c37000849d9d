//! Meal-card export loading.
//!
//! Exports carry two metadata rows before the header row. Both the CSV and
//! the Excel paths produce the same header plus string rows, which are then
//! deserialized into typed [`Transaction`]s and validated once, here.

use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::StringRecord;
use report_core::error::{ReportError, Result};
use report_core::models::{EventKind, Ledger, Transaction};
use report_core::time_utils::{excel_serial_to_datetime, parse_local_timestamp};
use serde::Deserialize;
use tracing::debug;

/// Column holding the transaction time.
pub const TIMESTAMP_COLUMN: &str = "交易时间";
/// Column holding the signed amount in yuan.
pub const AMOUNT_COLUMN: &str = "交易金额（元）";
/// Column holding the event kind.
pub const EVENT_COLUMN: &str = "交易事件";
/// Optional column holding the venue name.
pub const LOCATION_COLUMN: &str = "交易地点";

/// Metadata rows preceding the header row.
const SKIP_ROWS: usize = 2;

#[cfg(not(feature = "excel"))]
const EXCEL_REMEDY: &str =
    "Rebuild with `cargo build --features excel` (on by default) or export the sheet as CSV.";

// ── Public API ────────────────────────────────────────────────────────────────

/// Load `path` into a [`Ledger`], dispatching on the file extension.
pub fn load_ledger(path: &Path) -> Result<Ledger> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let (table, source) = match extension.as_deref() {
        Some("csv") => (read_csv_table(path)?, Source::Csv),
        Some("xlsx") | Some("xls") => (read_excel_table(path)?, Source::Excel),
        _ => return Err(ReportError::UnsupportedExtension(path.to_path_buf())),
    };

    let ledger = build_ledger(path, table, source)?;
    debug!(
        "Loaded {} rows from {} (location column: {})",
        ledger.len(),
        path.display(),
        ledger.has_location
    );
    Ok(ledger)
}

// ── Internal types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Csv,
    Excel,
}

/// Header row plus data rows, all as strings.
#[derive(Debug, Default)]
struct RawTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

/// One data row as it appears in the export.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "交易时间", default)]
    timestamp: Option<String>,
    #[serde(rename = "交易金额（元）", default)]
    amount: Option<String>,
    #[serde(rename = "交易事件", default)]
    event: Option<String>,
    #[serde(rename = "交易地点", default)]
    location: Option<String>,
}

impl RawRecord {
    fn into_transaction(self, row: usize, source: Source) -> Result<Transaction> {
        let raw_amount = self.amount.unwrap_or_default();
        let amount = parse_amount(&raw_amount).ok_or_else(|| ReportError::InvalidAmount {
            row,
            value: raw_amount.clone(),
        })?;

        let raw_ts = self.timestamp.unwrap_or_default();
        let timestamp = parse_local_timestamp(&raw_ts).or_else(|| match source {
            Source::Excel => raw_ts.trim().parse::<f64>().ok().and_then(excel_serial_to_datetime),
            Source::Csv => None,
        });

        let location = self
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        Ok(Transaction {
            timestamp,
            kind: EventKind::parse(self.event.as_deref().unwrap_or_default()),
            location,
            amount,
        })
    }
}

// ── Readers ───────────────────────────────────────────────────────────────────

fn read_csv_table(path: &Path) -> Result<RawTable> {
    let read_error = |source| ReportError::FileRead {
        path: path.to_path_buf(),
        source,
    };
    let mut input = BufReader::new(std::fs::File::open(path).map_err(read_error)?);

    // Physical lines: the csv reader would drop a blank metadata line.
    let mut line = Vec::new();
    for _ in 0..SKIP_ROWS {
        line.clear();
        if input.read_until(b'\n', &mut line).map_err(read_error)? == 0 {
            return Ok(RawTable::default());
        }
    }

    let mut records = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input)
        .into_records();

    let headers = match records.next() {
        Some(record) => record?,
        None => return Ok(RawTable::default()),
    };
    let rows = records.collect::<std::result::Result<Vec<_>, csv::Error>>()?;

    Ok(RawTable { headers, rows })
}

#[cfg(feature = "excel")]
fn read_excel_table(path: &Path) -> Result<RawTable> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| ReportError::ExcelParse(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReportError::ExcelParse("workbook has no worksheets".to_string()))?
        .map_err(|e| ReportError::ExcelParse(e.to_string()))?;

    // The range starts at the first used row, which may already be past
    // some of the metadata rows.
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range
        .rows()
        .skip(SKIP_ROWS.saturating_sub(first_row))
        .map(|cells| cells.iter().map(excel_cell_to_string).collect::<StringRecord>());

    let headers = match rows.next() {
        Some(record) => record,
        None => return Ok(RawTable::default()),
    };

    Ok(RawTable {
        headers,
        rows: rows.collect(),
    })
}

#[cfg(not(feature = "excel"))]
fn read_excel_table(path: &Path) -> Result<RawTable> {
    Err(ReportError::MissingDependency {
        path: path.to_path_buf(),
        remedy: EXCEL_REMEDY.to_string(),
    })
}

#[cfg(feature = "excel")]
fn excel_cell_to_string(cell: &calamine::Data) -> String {
    use calamine::Data;

    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

fn build_ledger(path: &Path, table: RawTable, source: Source) -> Result<Ledger> {
    let mut headers = table.headers;
    headers.trim();

    for column in [TIMESTAMP_COLUMN, AMOUNT_COLUMN, EVENT_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(ReportError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }
    let has_location = headers.iter().any(|h| h == LOCATION_COLUMN);

    let mut transactions = Vec::with_capacity(table.rows.len());
    for (idx, record) in table.rows.iter().enumerate() {
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        // Pad or cut ragged rows to the header width.
        let aligned: StringRecord = (0..headers.len())
            .map(|i| record.get(i).unwrap_or(""))
            .collect();
        let raw: RawRecord = aligned.deserialize(Some(&headers))?;
        transactions.push(raw.into_transaction(idx + 1, source)?);
    }

    Ok(Ledger::new(transactions, has_location))
}

/// Parse an amount cell, tolerating thousands separators and a yuan sign.
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '¥' | '￥' | ' '))
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    const HEADER: &str = "交易时间,交易地点,交易事件,交易金额（元）,余额（元）";

    fn write_export(dir: &Path, name: &str, header: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "校园卡交易明细").unwrap();
        writeln!(file, "导出时间,2025-04-01").unwrap();
        writeln!(file, "{}", header).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        path
    }

    // ── load_ledger (CSV) ─────────────────────────────────────────────────────

    #[test]
    fn test_load_csv_skips_metadata_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_export(
            dir.path(),
            "card.csv",
            HEADER,
            &[
                "2025-03-01 07:00:00,一食堂,持卡人消费,10.00,90.00",
                "2025-03-01 07:10:00,一食堂,持卡人消费,5.00,85.00",
            ],
        );

        let ledger = load_ledger(&path).unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.has_location);
        let first = &ledger.transactions[0];
        assert_eq!(first.kind, EventKind::CardholderSpend);
        assert_eq!(first.location.as_deref(), Some("一食堂"));
        assert!((first.amount - 10.0).abs() < 1e-9);
        assert!(first.timestamp.is_some());
    }

    #[test]
    fn test_load_csv_blank_metadata_line_still_counts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("card.csv");
        std::fs::write(
            &path,
            format!("校园卡交易明细\n\n{}\n2025-03-01 12:00:00,一食堂,持卡人消费,8.5,0\n", HEADER),
        )
        .unwrap();

        let ledger = load_ledger(&path).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.transactions[0].location.as_deref(), Some("一食堂"));
    }

    #[test]
    fn test_load_csv_without_location_column() {
        let dir = TempDir::new().unwrap();
        let path = write_export(
            dir.path(),
            "card.csv",
            "交易时间,交易事件,交易金额（元）",
            &["2025-03-01 12:00:00,持卡人消费,8.5"],
        );

        let ledger = load_ledger(&path).unwrap();
        assert!(!ledger.has_location);
        assert_eq!(ledger.transactions[0].location, None);
    }

    #[test]
    fn test_load_csv_missing_required_column_fails_fast() {
        let dir = TempDir::new().unwrap();
        let path = write_export(
            dir.path(),
            "card.csv",
            "交易时间,交易地点,交易金额（元）",
            &["2025-03-01 12:00:00,一食堂,8.5"],
        );

        let err = load_ledger(&path).unwrap_err();
        assert!(
            matches!(err, ReportError::MissingColumn { ref column, .. } if column == EVENT_COLUMN)
        );
    }

    #[test]
    fn test_load_csv_unparseable_timestamp_is_kept_as_none() {
        let dir = TempDir::new().unwrap();
        let path = write_export(
            dir.path(),
            "card.csv",
            HEADER,
            &["昨天中午,一食堂,持卡人消费,8.5,0"],
        );

        let ledger = load_ledger(&path).unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.transactions[0].timestamp.is_none());
    }

    #[test]
    fn test_load_csv_invalid_amount_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_export(
            dir.path(),
            "card.csv",
            HEADER,
            &[
                "2025-03-01 07:00:00,一食堂,持卡人消费,10.00,90.00",
                "2025-03-01 08:00:00,一食堂,持卡人消费,ten,80.00",
            ],
        );

        let err = load_ledger(&path).unwrap_err();
        assert!(matches!(err, ReportError::InvalidAmount { row: 2, .. }));
    }

    #[test]
    fn test_load_csv_skips_blank_and_ragged_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_export(
            dir.path(),
            "card.csv",
            HEADER,
            &[
                ",,,,",
                "2025-03-01 07:00:00,一食堂,持卡人消费,-3.5",
                "2025-03-01 08:00:00,二食堂,持卡人消费,4,1,extra",
            ],
        );

        let ledger = load_ledger(&path).unwrap();
        assert_eq!(ledger.len(), 2);
        assert!((ledger.transactions[0].amount + 3.5).abs() < 1e-9);
        assert_eq!(ledger.transactions[1].location.as_deref(), Some("二食堂"));
    }

    #[test]
    fn test_load_csv_header_only() {
        let dir = TempDir::new().unwrap();
        let path = write_export(dir.path(), "card.csv", HEADER, &[]);
        let ledger = load_ledger(&path).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_export(dir.path(), "card.txt", HEADER, &[]);
        let err = load_ledger(&path).unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedExtension(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_ledger(Path::new("/tmp/does-not-exist-canteen/card.csv")).unwrap_err();
        assert!(matches!(err, ReportError::FileRead { .. }));
    }

    #[cfg(not(feature = "excel"))]
    #[test]
    fn test_load_excel_without_feature_reports_remedy() {
        let err = load_ledger(Path::new("card.xlsx")).unwrap_err();
        assert!(err.to_string().contains("--features excel"));
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_load_corrupt_excel_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_export(dir.path(), "card.xlsx", HEADER, &[]);
        let err = load_ledger(&path).unwrap_err();
        assert!(matches!(err, ReportError::ExcelParse(_)));
    }

    // ── load_ledger (XLSX) ────────────────────────────────────────────────────

    #[cfg(feature = "excel")]
    fn inline(cell: &str, text: &str) -> String {
        format!(r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#, cell, text)
    }

    /// Minimal workbook: row 1 empty, one metadata row, the header on row 3,
    /// a date-formatted timestamp on row 4 and a bare serial on row 5.
    #[cfg(feature = "excel")]
    fn write_xlsx(dir: &Path) -> PathBuf {
        use std::io::Cursor;
        use zip::write::SimpleFileOptions;
        use zip::CompressionMethod;

        let rows = [
            format!(r#"<row r="2">{}</row>"#, inline("A2", "导出时间 2025-04-01")),
            format!(
                r#"<row r="3">{}{}{}{}</row>"#,
                inline("A3", TIMESTAMP_COLUMN),
                inline("B3", LOCATION_COLUMN),
                inline("C3", EVENT_COLUMN),
                inline("D3", AMOUNT_COLUMN)
            ),
            format!(
                r#"<row r="4"><c r="A4" s="1"><v>45717.3125</v></c>{}{}<c r="D4"><v>10.5</v></c></row>"#,
                inline("B4", "一食堂"),
                inline("C4", "持卡人消费")
            ),
            format!(
                r#"<row r="5"><c r="A5"><v>45717.5</v></c>{}{}<c r="D5"><v>8</v></c></row>"#,
                inline("B5", "二食堂"),
                inline("C5", "离线码在线消费")
            ),
        ];
        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#.to_string(),
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
            ),
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#.to_string(),
            ),
            (
                "xl/styles.xml",
                r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="22" applyNumberFormat="1"/></cellXfs></styleSheet>"#.to_string(),
            ),
            (
                "xl/worksheets/sheet1.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                    rows.concat()
                ),
            ),
        ];

        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            for (name, body) in &parts {
                zip.start_file(*name, options).unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }

        let path = dir.join("card.xlsx");
        std::fs::write(&path, buf).unwrap();
        path
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_load_xlsx_reads_date_cells_and_serials() {
        use chrono::NaiveDate;

        let dir = TempDir::new().unwrap();
        let ledger = load_ledger(&write_xlsx(dir.path())).unwrap();

        assert_eq!(ledger.len(), 2);
        assert!(ledger.has_location);

        let first = &ledger.transactions[0];
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();
        assert_eq!(first.timestamp, Some(expected));
        assert_eq!(first.kind, EventKind::CardholderSpend);
        assert_eq!(first.location.as_deref(), Some("一食堂"));
        assert!((first.amount - 10.5).abs() < 1e-9);

        let second = &ledger.transactions[1];
        let noon = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(second.timestamp, Some(noon));
        assert_eq!(second.kind, EventKind::OfflineCodeSpend);
        assert!((second.amount - 8.0).abs() < 1e-9);
    }

    // ── parse_amount ──────────────────────────────────────────────────────────

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("12.50"), Some(12.5));
        assert_eq!(parse_amount(" -3 "), Some(-3.0));
        assert_eq!(parse_amount("1,234.00"), Some(1234.0));
        assert_eq!(parse_amount("￥8.00"), Some(8.0));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("NaN"), None);
    }
}
