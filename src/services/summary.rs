//! Status aggregation over the tracker table.

use std::path::Path;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::application::count_by_status;
use crate::models::table::Table;
use crate::storage;

/// Share of tracked applications in one status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: String,
    pub count: usize,
    /// Percentage of `total`, rounded to one decimal.
    pub percentage: f64,
}

/// Per-status counts over the table's data rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub by_status: Vec<StatusShare>,
}

/// Summary of a tracker file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerSummary {
    #[serde(flatten)]
    pub summary: Summary,
    pub file_path: String,
}

/// Count data rows per status, skipping rows with an empty status cell.
///
/// A table with nothing to count is reported as `NoData` rather than as a
/// zero-filled summary.
pub fn summarize(table: &Table) -> Result<Summary, AppError> {
    let column = table.status_column();
    let counts = count_by_status(
        (0..table.len())
            .map(|row| table.cell(row, column))
            .filter(|status| !status.is_empty()),
    );

    let total: usize = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        return Err(AppError::NoData(
            "No applications found in tracker file".to_string(),
        ));
    }

    let by_status = counts
        .into_iter()
        .map(|c| StatusShare {
            percentage: percentage(c.count, total),
            status: c.status,
            count: c.count,
        })
        .collect();

    Ok(Summary { total, by_status })
}

/// Summarize the tracker at `path`; a missing file is `NotFound`.
pub fn summarize_file(path: &Path, sheet: &str) -> Result<TrackerSummary, AppError> {
    let table = storage::load(path, sheet)?.ok_or_else(|| {
        AppError::NotFound(format!("Tracker file not found: {}", path.display()))
    })?;
    let summary = summarize(&table)?;

    tracing::info!(path = %path.display(), total = summary.total, "Tracker summarized");
    Ok(TrackerSummary {
        summary,
        file_path: path.display().to_string(),
    })
}

fn percentage(count: usize, total: usize) -> f64 {
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}
