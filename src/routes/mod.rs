//! Route definitions for the jobtrack API.

pub mod health;
pub mod tracker;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let tracker_routes = Router::new()
        .route("/scan", post(tracker::scan))
        .route("/summary", get(tracker::summary))
        .route("/categories", get(tracker::categories))
        .route("/categories/patterns", post(tracker::add_pattern));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", tracker_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
