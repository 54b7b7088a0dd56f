//! Scan pipeline orchestrating fetch, field extraction, classification, and merge.
//!
//! Emails are fetched one at a time; a message that fails to fetch is logged
//! and skipped without aborting the scan. Provider-level failures (bad token,
//! unreachable API) are logged and treated as an empty result. The final
//! merge into the tracker is all-or-nothing.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{count_by_status, ApplicationRecord, StatusCount};
use crate::models::email::RawEmail;
use crate::parsers::FieldExtractor;
use crate::services::classifier::StatusClassifier;
use crate::services::mail::{build_search_query, MailSource};
use crate::services::tracker;
use crate::storage;

pub const NO_EMAILS_MESSAGE: &str = "No job application emails found in the specified date range.";

/// Parameters for a scan.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    pub start_date: String,
    pub end_date: String,
    /// Tracker to update instead of the configured default.
    pub table_path: Option<String>,
}

/// Summary of a scan run.
#[derive(Debug, Serialize)]
pub struct ScanResult {
    pub scan_id: Uuid,
    pub source: String,
    pub processed: usize,
    pub inserted_count: usize,
    pub duplicates: usize,
    /// Statuses of every processed email, in first-seen order.
    pub category_breakdown: Vec<StatusCount>,
    pub table_path: String,
    #[serde(rename = "errors")]
    pub error_count: usize,
    pub error_details: Vec<ScanError>,
}

/// Error while fetching a single message.
#[derive(Debug, Serialize)]
pub struct ScanError {
    pub message_id: String,
    pub stage: String,
    pub message: String,
}

/// Collaborators a scan runs against.
pub struct Pipeline<'a> {
    pub mail: &'a dyn MailSource,
    pub extractor: &'a FieldExtractor,
    pub classifier: &'a RwLock<StatusClassifier>,
    pub max_results: u32,
    pub sheet: &'a str,
}

/// Parse and order-check a `YYYY-MM-DD` date range.
pub fn parse_date_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), AppError> {
    let parse = |field: &str, value: &str| {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
            AppError::Validation(format!("Invalid {field} '{value}'. Expected YYYY-MM-DD"))
        })
    };
    let start_date = parse("start_date", start)?;
    let end_date = parse("end_date", end)?;
    if start_date > end_date {
        return Err(AppError::Validation(format!(
            "start_date {start_date} is after end_date {end_date}"
        )));
    }
    Ok((start_date, end_date))
}

/// Run a full scan into the tracker at `table_path`.
pub async fn scan(
    pipeline: &Pipeline<'_>,
    request: &ScanRequest,
    table_path: &Path,
) -> Result<ScanResult, AppError> {
    // 1. Validate input and target before touching the provider
    let (start, end) = parse_date_range(&request.start_date, &request.end_date)?;
    storage::ensure_writable(table_path)?;

    // 2. Fetch raw emails
    let query = build_search_query(start, end);
    tracing::info!(source = pipeline.mail.name(), %query, "Searching mail");
    let (emails, errors) = fetch_emails(pipeline.mail, &query, pipeline.max_results).await;

    // 3. Extract fields and classify
    let mut records: Vec<ApplicationRecord> =
        emails.iter().map(|e| pipeline.extractor.to_record(e)).collect();
    pipeline.classifier.read().await.classify_batch(&mut records);

    if records.is_empty() {
        return Err(AppError::NoData(NO_EMAILS_MESSAGE.to_string()));
    }
    for record in &records {
        tracing::info!(
            company = %record.company,
            status = %record.status,
            message_id = %record.message_id,
            "Processed email"
        );
    }
    let category_breakdown = count_by_status(records.iter().map(|r| r.status.as_str()));

    // 4. Merge into the tracker
    let path: PathBuf = table_path.to_path_buf();
    let sheet = pipeline.sheet.to_string();
    let processed = records.len();
    let outcome = tokio::task::spawn_blocking(move || {
        tracker::record_batch(&path, &sheet, &records)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Tracker update task failed: {e}")))??;

    Ok(ScanResult {
        scan_id: Uuid::new_v4(),
        source: pipeline.mail.name().to_string(),
        processed,
        inserted_count: outcome.inserted,
        duplicates: outcome.duplicates,
        category_breakdown,
        table_path: table_path.display().to_string(),
        error_count: errors.len(),
        error_details: errors,
    })
}

/// Fetch every message matching `query`, skipping the ones that fail.
async fn fetch_emails(
    mail: &dyn MailSource,
    query: &str,
    max_results: u32,
) -> (Vec<RawEmail>, Vec<ScanError>) {
    let ids = match mail.list_message_ids(query, max_results).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(error = %e, source = mail.name(), "Mail search failed");
            return (Vec::new(), Vec::new());
        }
    };
    tracing::info!(count = ids.len(), "Found potential job application emails");

    let mut emails = Vec::with_capacity(ids.len());
    let mut errors = Vec::new();
    for id in ids {
        match mail.fetch_message(&id).await {
            Ok(email) => emails.push(email),
            Err(e) => {
                tracing::error!(message_id = %id, error = %e, "Error processing message");
                errors.push(ScanError {
                    message_id: id,
                    stage: "fetch".to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
    (emails, errors)
}
