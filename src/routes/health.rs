//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::storage::TableFormat;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub tracker_path: String,
    pub tracker_exists: bool,
    pub tracker_writable: bool,
    pub mail_source: String,
}

/// Liveness probe: always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe: reports the default tracker and the mail source in use.
pub async fn ready(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    let path = &state.config.tracker_path;
    let tracker_exists = tokio::fs::try_exists(path).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, path = %path.display(), "Tracker check failed");
        false
    });

    ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
        tracker_path: path.display().to_string(),
        tracker_exists,
        tracker_writable: TableFormat::from_path(path).is_writable(),
        mail_source: state.mail.name().to_string(),
    })
}
