//! Shared application state for the cartweek server

use std::path::PathBuf;
use std::sync::Arc;

use cartweek_core::{DashboardConfig, DashboardLoader, DataDir};
use chrono::{DateTime, Utc};

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Cached dashboard tables and reports
    pub loader: Arc<DashboardLoader>,
    /// Data directory the loader reads from
    pub data_dir: PathBuf,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Serve the prepared data under `data_dir`
    pub fn new(data_dir: DataDir, dashboard: DashboardConfig) -> Self {
        let loader =
            DashboardLoader::new(data_dir.processed(), data_dir.raw()).with_config(dashboard);
        Self {
            loader: Arc::new(loader),
            data_dir: data_dir.root().to_path_buf(),
            started_at: Utc::now(),
        }
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
