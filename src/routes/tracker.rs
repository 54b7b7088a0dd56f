//! Tracker routes: mail scan, status summary, and classifier patterns.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::{ApiResponse, AppError};
use crate::services::classifier::CategoryInfo;
use crate::services::ingestion::{self, Pipeline, ScanRequest, ScanResult};
use crate::services::summary::{self, TrackerSummary};
use crate::AppState;

/// Query parameters for the summary endpoint.
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub table_path: Option<String>,
}

/// Body for adding a classification pattern.
#[derive(Debug, Deserialize)]
pub struct AddPatternRequest {
    pub category: String,
    pub pattern: String,
}

/// POST /api/v1/scan: search mail in a date range and record new applications.
pub async fn scan(
    State(state): State<AppState>,
    Json(body): Json<ScanRequest>,
) -> Result<Json<ApiResponse<ScanResult>>, AppError> {
    let _guard = state.tracker_lock.lock().await;
    let table_path = state.table_path(body.table_path.as_deref());

    let pipeline = Pipeline {
        mail: state.mail.as_ref(),
        extractor: &state.extractor,
        classifier: &state.classifier,
        max_results: state.config.max_search_results,
        sheet: &state.config.tracker_sheet,
    };
    let result = ingestion::scan(&pipeline, &body, &table_path).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/summary: counts per status in the tracker.
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<ApiResponse<TrackerSummary>>, AppError> {
    let _guard = state.tracker_lock.lock().await;
    let table_path = state.table_path(query.table_path.as_deref());
    let sheet = state.config.tracker_sheet.clone();

    let result = tokio::task::spawn_blocking(move || summary::summarize_file(&table_path, &sheet))
        .await
        .map_err(|e| AppError::Internal(format!("Summary task failed: {e}")))??;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/categories: classification categories in precedence order.
pub async fn categories(State(state): State<AppState>) -> Json<ApiResponse<Vec<CategoryInfo>>> {
    let categories = state.classifier.read().await.categories();
    ApiResponse::success(categories)
}

/// POST /api/v1/categories/patterns: append a pattern to a category.
pub async fn add_pattern(
    State(state): State<AppState>,
    Json(body): Json<AddPatternRequest>,
) -> Result<Json<ApiResponse<Vec<CategoryInfo>>>, AppError> {
    let mut classifier = state.classifier.write().await;
    classifier.add_pattern(&body.category, &body.pattern)?;
    Ok(ApiResponse::success(classifier.categories()))
}
