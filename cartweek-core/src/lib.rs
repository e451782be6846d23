//! cartweek-core: weekly snapshots of the Instacart order dataset
//!
//! This crate provides the data side of cartweek:
//!
//! - **Raw data** - [`Downloader`] fetches the five source tables, [`RawDataset`] reads them
//! - **Enrichment** - [`enrich_orders`] attaches baskets and rebuilds absolute order dates
//! - **Partitioning** - [`partition`] splits orders into seven-day [`WeeklySnapshot`]s
//! - **Roll-ups** - [`Rollups`] derives new users, engagement, retention and volumes
//! - **Storage** - [`ProcessedStore`] persists everything as gzip-compressed CSV
//! - **Dashboard** - [`DashboardLoader`] builds cached week-over-week [`WeekReport`]s
//!
//! # Quick Start
//!
//! ```no_run
//! use cartweek_core::{
//!     DataDir, DirectoryFetcher, Downloader, EnrichConfig, PreparePipeline, SOURCE_FILES,
//! };
//!
//! async fn example() -> Result<(), cartweek_core::CartweekError> {
//!     let fetcher = Box::new(DirectoryFetcher::new("/mnt/mirror"));
//!     let downloader = Downloader::new(fetcher, &SOURCE_FILES);
//!     let summary = PreparePipeline::new(DataDir::new("./data"), EnrichConfig::default())
//!         .with_downloader(downloader)
//!         .run()
//!         .await?;
//!     println!("{} weeks written", summary.weeks.len());
//!     Ok(())
//! }
//! ```
//!
//! # Data flow
//!
//! ```text
//! raw/*.csv ──► enrich ──► partition ──► processed/orders_<end>_<first_day>.csv.gz
//!                  │                      processed/{new_users,engagement,retention,volumes}.csv.gz
//!                  └──► roll-ups ─────────────────────────┘
//!                                                         │
//!                                     DashboardLoader ◄───┘
//! ```

pub mod archive;
pub mod cache;
pub mod dashboard;
pub mod enrich;
pub mod error;
pub mod model;
pub mod partition;
pub mod pipeline;
pub mod rollup;
pub mod source;
pub mod store;

// Re-export key types for convenience
pub use cache::ReadThroughCache;
pub use dashboard::{
    DashboardConfig, DashboardLoader, MetricCard, TimeOfDay, WeekCatalog, WeekReport,
};
pub use enrich::{BasketIndex, EnrichConfig, default_anchor_date, enrich_orders, reconstruct_dates};
pub use error::{BasketError, CartweekError, DashboardError, EnrichError, StoreError};
pub use model::{Basket, EnrichedOrder, EvalSet, RawOrder};
pub use partition::{WeekId, WeekWindow, WeeklySnapshot, partition, week_windows};
pub use pipeline::{DataDir, PreparePipeline, PrepareSummary};
pub use rollup::Rollups;
pub use source::{
    DirectoryFetcher, Downloader, HttpFetcher, RawDataset, SOURCE_FILES, SourceConfig,
    SourceError, SourceFetcher,
};
pub use store::{ProcessedStore, RollupCounts, RollupKind};

