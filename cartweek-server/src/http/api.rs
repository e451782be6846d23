//! REST API handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cartweek_core::{DashboardError, WeekId};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
    /// Data directory being served
    pub data_dir: String,
}

/// Error body shared by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

fn error_response(status: StatusCode, code: &str, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            code: code.into(),
        }),
    )
        .into_response()
}

fn dashboard_error(error: DashboardError) -> Response {
    let (status, code) = match &error {
        DashboardError::UnknownWeek(_) => (StatusCode::NOT_FOUND, "UNKNOWN_WEEK"),
        DashboardError::NoPreviousWeek(_) => (StatusCode::CONFLICT, "NO_PREVIOUS_WEEK"),
        DashboardError::NoWeeks(_) => (StatusCode::NOT_FOUND, "NO_WEEKS"),
        DashboardError::Store(_) | DashboardError::Source(_) => {
            tracing::error!("Failed to load dashboard data: {}", error);
            (StatusCode::INTERNAL_SERVER_ERROR, "LOAD_FAILED")
        }
    };
    error_response(status, code, error)
}

/// Runs file-reading dashboard work off the async runtime
async fn blocking<T, F>(state: Arc<AppState>, work: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, DashboardError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || work(&state))
        .await
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", e))?
        .map_err(dashboard_error)
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        data_dir: state.data_dir.display().to_string(),
    })
}

/// Response for listing weeks
#[derive(Debug, Serialize, Deserialize)]
pub struct WeekListResponse {
    /// Every snapshot on disk, newest first
    pub weeks: Vec<WeekId>,
    /// Weeks that have both a newer and an older neighbour
    pub selectable: Vec<WeekId>,
}

/// GET /api/weeks
pub async fn list_weeks(State(state): State<Arc<AppState>>) -> Response {
    let catalog = match blocking(state, |state| state.loader.catalog()).await {
        Ok(catalog) => catalog,
        Err(response) => return response,
    };

    Json(WeekListResponse {
        weeks: catalog.all().to_vec(),
        selectable: catalog.selectable().to_vec(),
    })
    .into_response()
}

/// GET /api/weeks/:week/report
pub async fn week_report(
    State(state): State<Arc<AppState>>,
    Path(week): Path<String>,
) -> Response {
    let week: WeekId = match week.parse() {
        Ok(week) => week,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, "INVALID_WEEK", e),
    };

    match blocking(state, move |state| state.loader.report(&week)).await {
        Ok(report) => Json(&*report).into_response(),
        Err(response) => response,
    }
}

/// GET /api/report: the newest selectable week
pub async fn default_report(State(state): State<Arc<AppState>>) -> Response {
    let result = blocking(state, |state| {
        let week = state.loader.default_week()?;
        state.loader.report(&week)
    })
    .await;

    match result {
        Ok(report) => Json(&*report).into_response(),
        Err(response) => response,
    }
}
