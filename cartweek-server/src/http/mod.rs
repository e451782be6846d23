//! HTTP server module

mod api;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::AppState;

pub use api::{ErrorResponse, HealthResponse, WeekListResponse};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/weeks", get(api::list_weeks))
        .route("/api/weeks/:week/report", get(api::week_report))
        .route("/api/report", get(api::default_report))
        .with_state(state)
}
