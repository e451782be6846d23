//! cartweek-server - HTTP API over the prepared weekly data
//!
//! Serves the week catalog and week-over-week reports as JSON. All data is
//! read from the directory written by `cartweek prepare`; the server never
//! modifies it.

mod error;
pub mod http;
mod state;

use std::sync::Arc;

use tokio::net::TcpListener;

pub use error::ServerError;
pub use http::create_router;
pub use state::AppState;

/// Default port of the HTTP API
pub const DEFAULT_PORT: u16 = 7480;

/// The cartweek HTTP server
pub struct CartweekServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl CartweekServer {
    /// Create a server over existing state
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;
        self.run_with_listener(listener).await
    }

    /// Run the server on an already bound listener
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        if let Ok(local) = listener.local_addr() {
            tracing::info!(
                data_dir = %self.state.data_dir.display(),
                "cartweek server listening on {}",
                local
            );
        }

        let router = create_router(self.state);
        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the socket address string (e.g., "127.0.0.1:7480")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartweek_core::{DashboardConfig, DataDir};

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(
            DataDir::new("/tmp/cartweek"),
            DashboardConfig::default(),
        ))
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 7480);
    }

    #[test]
    fn test_server_config_addr() {
        let config = ServerConfig::new("0.0.0.0", 8080);
        assert_eq!(config.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_server_shares_state() {
        let state = state();
        let server = CartweekServer::with_state(ServerConfig::default(), Arc::clone(&state));
        assert!(Arc::ptr_eq(&server.state(), &state));
        assert_eq!(server.config().port, DEFAULT_PORT);
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let server = CartweekServer::with_state(ServerConfig::new("127.0.0.1", port), state());
        let err = server.run().await.unwrap_err();

        assert!(matches!(err, ServerError::Bind { .. }));
    }
}
