//! Deduplicated ingestion of application records into the tracker table.
//!
//! Rows are keyed by message identifier. A record whose identifier is already
//! in the table is skipped: existing rows are never rewritten or removed, so
//! the first recorded status for an email is the one that stays.

use std::collections::HashSet;
use std::path::Path;

use chrono::Local;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::application::ApplicationRecord;
use crate::models::table::Table;
use crate::storage;

const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of merging a batch into a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MergeOutcome {
    pub inserted: usize,
    pub duplicates: usize,
}

/// Load the table at `path`, or start an empty one with the tracker header.
pub fn load_or_init(path: &Path, sheet: &str) -> Result<Table, AppError> {
    let mut table = match storage::load(path, sheet)? {
        Some(table) => table,
        None => {
            tracing::info!(path = %path.display(), "Tracker file not found, starting a new table");
            Table::with_default_headers()
        }
    };
    table.ensure_headers();
    Ok(table)
}

/// Message identifiers already recorded in `table`.
pub fn existing_message_ids(table: &Table) -> HashSet<String> {
    let column = table.message_id_column();
    (0..table.len())
        .map(|row| table.cell(row, column))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Append every record whose message id is not yet present.
pub fn merge(table: &mut Table, records: &[ApplicationRecord]) -> MergeOutcome {
    let now = Local::now().format(LAST_UPDATED_FORMAT).to_string();
    merge_at(table, records, &now)
}

/// [`merge`] with an explicit `last_updated` stamp.
pub fn merge_at(
    table: &mut Table,
    records: &[ApplicationRecord],
    last_updated: &str,
) -> MergeOutcome {
    let mut seen = existing_message_ids(table);
    let mut outcome = MergeOutcome::default();

    for record in records {
        if record.message_id.is_empty() {
            tracing::warn!(subject = %record.subject, "Skipping record without a message id");
            continue;
        }
        if !seen.insert(record.message_id.clone()) {
            outcome.duplicates += 1;
            continue;
        }
        let row = table.align_row(&record.to_row(last_updated));
        table.rows.push(row);
        outcome.inserted += 1;
    }

    outcome
}

/// Load (or create) the table at `path`, merge `records`, and save it back.
///
/// Nothing is written unless the whole merge succeeds.
pub fn record_batch(
    path: &Path,
    sheet: &str,
    records: &[ApplicationRecord],
) -> Result<MergeOutcome, AppError> {
    storage::ensure_writable(path)?;
    let mut table = load_or_init(path, sheet)?;
    let outcome = merge(&mut table, records);
    storage::save(&table, path)?;

    tracing::info!(
        path = %path.display(),
        inserted = outcome.inserted,
        duplicates = outcome.duplicates,
        "Tracker updated"
    );
    Ok(outcome)
}
