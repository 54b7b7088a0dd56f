//! Tracker table persistence.
//!
//! CSV tables are read and written with the `csv` crate. Saving writes a
//! uniquely named sibling file and renames it over the target, so a failed
//! save leaves the previous table intact. Spreadsheets produced by earlier
//! tooling (`.xlsx`) can be loaded for reporting but not written.

use std::fs;
use std::path::Path;

use calamine::{open_workbook, Reader, Xlsx};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::table::Table;

/// On-disk table format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("xlsx") | Some("xlsm") => Self::Xlsx,
            _ => Self::Csv,
        }
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Csv)
    }
}

/// Load the table at `path`, or `None` if no file exists there.
///
/// `sheet` names the worksheet read from spreadsheet files.
pub fn load(path: &Path, sheet: &str) -> Result<Option<Table>, AppError> {
    if !path.exists() {
        return Ok(None);
    }
    let table = match TableFormat::from_path(path) {
        TableFormat::Csv => load_csv(path)?,
        TableFormat::Xlsx => load_xlsx(path, sheet)?,
    };
    Ok(Some(table))
}

/// Fail early if `path` names a format the tracker cannot write.
pub fn ensure_writable(path: &Path) -> Result<(), AppError> {
    if TableFormat::from_path(path).is_writable() {
        Ok(())
    } else {
        Err(AppError::Persistence(format!(
            "Spreadsheet trackers are read-only: {}. Use a .csv path to record scans.",
            path.display()
        )))
    }
}

/// Replace the file at `path` with `table`, atomically from the caller's view.
pub fn save(table: &Table, path: &Path) -> Result<(), AppError> {
    ensure_writable(path)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Persistence(format!("Failed to prepare tracker directory: {e}"))
        })?;
    }

    let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
    if let Err(e) = write_csv(table, &temp_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        AppError::Persistence(format!("Failed to finalize tracker file: {e}"))
    })?;

    tracing::debug!(path = %path.display(), rows = table.len(), "Tracker table saved");
    Ok(())
}

fn load_csv(path: &Path) -> Result<Table, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = reader.records();
    let headers = match records.next() {
        Some(header) => header?.iter().map(|h| h.to_string()).collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(Table { headers, rows })
}

fn write_csv(table: &Table, path: &Path) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    let file = writer
        .into_inner()
        .map_err(|e| AppError::Persistence(format!("Failed to flush tracker file: {e}")))?;
    file.sync_all()?;
    Ok(())
}

fn load_xlsx(path: &Path, sheet: &str) -> Result<Table, AppError> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| AppError::Persistence(format!("Invalid XLSX file: {e}")))?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(AppError::NotFound(format!(
            "No {sheet} sheet found in {}",
            path.display()
        )));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| AppError::Persistence(format!("Failed to read sheet '{sheet}': {e}")))?;

    let mut row_iter = range.rows();
    let headers = row_iter
        .next()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    let rows = row_iter
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    Ok(Table { headers, rows })
}
