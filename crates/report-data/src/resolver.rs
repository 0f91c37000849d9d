//! Input file discovery.
//!
//! Picks the data file to report on: an explicit file wins, otherwise the
//! newest CSV in the search directory, otherwise the newest Excel workbook.

use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use report_core::error::{ReportError, Result};
use tracing::{debug, info};

// ── Public API ────────────────────────────────────────────────────────────────

/// Resolve the data file to load.
///
/// * `input` – explicit file or directory; a leading `~` is expanded.
///   A directory replaces `search_dir`. A path that does not exist falls
///   back to searching `search_dir`.
/// * `search_dir` – directory scanned when no usable file was given.
///
/// Fails with [`ReportError::NoDataFile`] when the directory holds no
/// `.csv`, `.xlsx` or `.xls` file.
pub fn find_data_file(input: Option<&Path>, search_dir: &Path) -> Result<PathBuf> {
    let mut search_dir = search_dir.to_path_buf();

    if let Some(raw) = input {
        let path = expand_home(raw);
        if path.is_dir() {
            search_dir = path;
        } else if path.exists() {
            return Ok(path);
        } else {
            debug!(
                "{} does not exist; searching {}",
                path.display(),
                search_dir.display()
            );
        }
    }

    let csv = find_candidates(&search_dir, &["csv"]);
    let excel = find_candidates(&search_dir, &["xlsx", "xls"]);

    if let Some(newest) = csv.first() {
        if csv.len() > 1 || !excel.is_empty() {
            info!(
                "Multiple data files found; using the newest CSV {}",
                newest.display()
            );
        }
        return Ok(newest.clone());
    }

    match excel.first() {
        Some(newest) => {
            if excel.len() > 1 {
                info!(
                    "Multiple Excel data files found; using the newest {}",
                    newest.display()
                );
            }
            Ok(newest.clone())
        }
        None => Err(ReportError::NoDataFile(search_dir)),
    }
}

/// Files directly inside `dir` whose extension is one of `extensions`
/// (case-insensitive), newest modification time first.
pub fn find_candidates(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<(Option<SystemTime>, PathBuf)> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
                    .unwrap_or(false)
        })
        .map(|entry| {
            let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
            (modified, entry.into_path())
        })
        .collect();

    files.sort_by(|a, b| Reverse(a.0).cmp(&Reverse(b.0)).then_with(|| a.1.cmp(&b.1)));
    files.into_iter().map(|(_, path)| path).collect()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Replace a leading `~` with the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
