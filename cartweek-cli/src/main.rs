use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "cartweek",
    about = "Weekly snapshots and reports for the Instacart orders dataset"
)]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Download the source tables and rebuild the weekly snapshots
    Prepare(commands::prepare::PrepareArgs),
    /// Print the report for one week
    Report(commands::report::ReportArgs),
    /// Run the HTTP API
    Serve(commands::serve::ServeArgs),
    /// List prepared weeks
    Weeks(commands::weeks::WeeksArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Config(args) => commands::config::run(args),
        Commands::Prepare(args) => commands::prepare::run(args).await,
        Commands::Report(args) => commands::report::run(args),
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Weeks(args) => commands::weeks::run(args),
    }
}
