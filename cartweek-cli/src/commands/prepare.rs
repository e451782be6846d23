//! `cartweek prepare`: rebuild the processed weekly data from the source tables

use std::path::PathBuf;

use anyhow::Result;
use cartweek_core::{
    DirectoryFetcher, Downloader, HttpFetcher, PreparePipeline, PrepareSummary, SOURCE_FILES,
    SourceFetcher,
};
use chrono::NaiveDate;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use tracing::info;

use crate::config::ConfigLoader;

/// Arguments for the prepare command
#[derive(Debug, Args)]
pub struct PrepareArgs {
    /// Data directory; `raw/` and `processed/` are created inside
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Date every user's most recent order is placed on (YYYY-MM-DD)
    #[arg(long)]
    pub anchor_date: Option<NaiveDate>,

    /// Reuse the raw files already in the data directory
    #[arg(long)]
    pub skip_download: bool,

    /// Copy the raw files from a local directory instead of downloading them
    #[arg(long, conflicts_with = "skip_download")]
    pub mirror: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the prepare command
pub async fn run(args: PrepareArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let data_dir = config.data_dir(args.data_dir);

    let mut enrich = config.pipeline.clone();
    if let Some(anchor_date) = args.anchor_date {
        enrich.anchor_date = anchor_date;
    }
    info!(
        data_dir = %data_dir.root().display(),
        anchor_date = %enrich.anchor_date,
        eval_set = %enrich.eval_set,
        "Preparing weekly data"
    );

    let mut pipeline = PreparePipeline::new(data_dir, enrich);
    if !args.skip_download {
        let fetcher: Box<dyn SourceFetcher> = match args.mirror {
            Some(dir) => Box::new(DirectoryFetcher::new(dir)),
            None => Box::new(HttpFetcher::new(config.source.clone())?),
        };
        pipeline = pipeline.with_downloader(Downloader::new(fetcher, &SOURCE_FILES));
    }

    let summary = pipeline.run().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary_table(&summary));
    }
    Ok(())
}

fn optional_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn summary_table(summary: &PrepareSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Prepared").fg(Color::Cyan),
        Cell::new("").fg(Color::Cyan),
    ]);

    let downloaded = match summary.downloaded_bytes {
        Some(bytes) => format!("{:.1} MB", bytes as f64 / 1_000_000.0),
        None => "skipped".to_string(),
    };
    let newest = summary
        .weeks
        .first()
        .map(|w| w.to_string())
        .unwrap_or_else(|| "-".to_string());

    let rows = [
        ("Downloaded", downloaded),
        ("Orders", summary.orders.to_string()),
        ("Users", summary.users.to_string()),
        ("First order", optional_date(summary.first_date)),
        ("Last order", optional_date(summary.last_date)),
        ("Weeks", summary.weeks.len().to_string()),
        ("Newest week", newest),
        ("New users", summary.rollups.new_users.to_string()),
        ("Engagement rows", summary.rollups.engagement.to_string()),
        ("Retention rows", summary.rollups.retention.to_string()),
        ("Volume days", summary.rollups.volumes.to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    table
}
