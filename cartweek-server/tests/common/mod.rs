//! Shared test utilities for cartweek-server integration tests

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cartweek_core::{
    DashboardConfig, DataDir, DirectoryFetcher, Downloader, EnrichConfig, PreparePipeline,
    SOURCE_FILES,
};
use cartweek_server::{AppState, CartweekServer, ServerConfig};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Raw tables shared with the cartweek-core integration tests
pub fn mirror() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../cartweek-core/tests/fixtures/mirror")
}

/// Prepares a data directory from the fixture mirror
pub async fn prepared_state() -> (TempDir, Arc<AppState>) {
    let root = TempDir::new().unwrap();
    let downloader = Downloader::new(Box::new(DirectoryFetcher::new(mirror())), &SOURCE_FILES);
    PreparePipeline::new(DataDir::new(root.path()), EnrichConfig::default())
        .with_downloader(downloader)
        .run()
        .await
        .unwrap();

    let state = AppState::new(DataDir::new(root.path()), DashboardConfig::default());
    (root, Arc::new(state))
}

/// Spawns server in background task, returns bound address
#[allow(dead_code)]
pub async fn spawn_server(state: Arc<AppState>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = CartweekServer::with_state(ServerConfig::default(), state);

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    addr
}
