//! `cartweek weeks`: list the prepared weekly snapshots

use std::path::PathBuf;

use anyhow::Result;
use cartweek_core::{DashboardLoader, WeekCatalog, WeekId};
use clap::Args;

use crate::config::ConfigLoader;

/// Arguments for the weeks command
#[derive(Debug, Args)]
pub struct WeeksArgs {
    /// Data directory written by `cartweek prepare`
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Include the newest and oldest weeks, which have no report
    #[arg(long)]
    pub all: bool,

    /// Print as a JSON array
    #[arg(long)]
    pub json: bool,
}

/// Run the weeks command
pub fn run(args: WeeksArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let data_dir = config.data_dir(args.data_dir);
    let loader = DashboardLoader::new(data_dir.processed(), data_dir.raw());
    let catalog = loader.catalog()?;

    let weeks = listed(&catalog, args.all);
    if args.json {
        println!("{}", serde_json::to_string_pretty(weeks)?);
        return Ok(());
    }

    if weeks.is_empty() {
        eprintln!(
            "No weeks to show in {}. Run `cartweek prepare` first.",
            loader.processed_dir().display()
        );
    }
    for week in weeks {
        println!("{week}");
    }
    Ok(())
}

fn listed(catalog: &WeekCatalog, all: bool) -> &[WeekId] {
    if all {
        catalog.all()
    } else {
        catalog.selectable()
    }
}
