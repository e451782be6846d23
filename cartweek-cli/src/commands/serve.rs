//! `cartweek serve`: run the HTTP API over the prepared data

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use cartweek_server::{AppState, CartweekServer, ServerConfig};
use clap::Args;
use tracing::info;

use crate::config::ConfigLoader;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Data directory written by `cartweek prepare`
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let server_config = ServerConfig::new(
        args.host.unwrap_or(config.server.host.clone()),
        args.port.unwrap_or(config.server.port),
    );
    let data_dir = config.data_dir(args.data_dir);

    info!(
        "Starting cartweek server on {}:{}",
        server_config.host, server_config.port
    );
    let state = Arc::new(AppState::new(data_dir, config.dashboard));
    CartweekServer::with_state(server_config, state).run().await?;
    Ok(())
}
