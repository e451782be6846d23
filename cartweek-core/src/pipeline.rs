//! The `prepare` batch job: download, enrich, partition, persist
//!
//! Every run starts from an empty output directory, so a failed run leaves
//! nothing that a later run could mistake for its own output.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::enrich::{EnrichConfig, enrich_orders};
use crate::error::CartweekError;
use crate::partition::{WeekId, date_range, partition};
use crate::rollup::Rollups;
use crate::source::{Downloader, RawDataset};
use crate::store::{ProcessedStore, RollupCounts, reset_dir};

/// Layout of a data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Downloaded source tables
    pub fn raw(&self) -> PathBuf {
        self.root.join("raw")
    }

    /// Weekly snapshots and roll-ups
    pub fn processed(&self) -> PathBuf {
        self.root.join("processed")
    }
}

/// What a `prepare` run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrepareSummary {
    pub downloaded_bytes: Option<u64>,
    pub orders: usize,
    pub users: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Newest first
    pub weeks: Vec<WeekId>,
    pub rollups: RollupCounts,
}

pub struct PreparePipeline {
    data_dir: DataDir,
    enrich: EnrichConfig,
    downloader: Option<Downloader>,
}

impl PreparePipeline {
    /// A pipeline that reuses raw files already present in the data directory
    pub fn new(data_dir: DataDir, enrich: EnrichConfig) -> Self {
        Self {
            data_dir,
            enrich,
            downloader: None,
        }
    }

    /// Fetch fresh raw files before processing
    pub fn with_downloader(mut self, downloader: Downloader) -> Self {
        self.downloader = Some(downloader);
        self
    }

    pub fn data_dir(&self) -> &DataDir {
        &self.data_dir
    }

    pub async fn run(&self) -> Result<PrepareSummary, CartweekError> {
        let raw_dir = self.data_dir.raw();
        let store = ProcessedStore::new(self.data_dir.processed());
        store.reset()?;

        let downloaded_bytes = match &self.downloader {
            Some(downloader) => {
                reset_dir(&raw_dir)?;
                let bytes = downloader.fetch_all(&raw_dir).await?;
                info!(bytes, dir = %raw_dir.display(), "Downloaded raw data");
                Some(bytes)
            }
            None => {
                info!(dir = %raw_dir.display(), "Skipping download, using existing raw data");
                None
            }
        };

        let raw = RawDataset::load(&raw_dir)?;
        info!(
            orders = raw.orders.len(),
            baskets = raw.baskets.len(),
            "Loaded raw tables"
        );

        let orders = enrich_orders(raw.orders, raw.baskets, &self.enrich)?;
        let users = orders
            .iter()
            .map(|o| o.user_id)
            .collect::<HashSet<_>>()
            .len();
        let range = date_range(&orders);

        let snapshots = partition(&orders);
        let mut weeks = Vec::with_capacity(snapshots.len());
        for snapshot in &snapshots {
            weeks.push(store.write_snapshot(snapshot)?);
        }
        info!(weeks = weeks.len(), "Saved weekly snapshots");

        let rollups = store.write_rollups(&Rollups::compute(&orders))?;

        Ok(PrepareSummary {
            downloaded_bytes,
            orders: orders.len(),
            users,
            first_date: range.map(|(min, _)| min),
            last_date: range.map(|(_, max)| max),
            weeks,
            rollups,
        })
    }
}
