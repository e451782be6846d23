//! Cached access to the prepared tables and the reports built from them

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use tracing::{debug, info};

use super::catalog::WeekCatalog;
use super::report::{DashboardConfig, ReportInputs, WeekReport};
use crate::cache::ReadThroughCache;
use crate::error::DashboardError;
use crate::model::{Dimensions, EnrichedOrder};
use crate::partition::WeekId;
use crate::rollup::{NewUser, Volume};
use crate::source::load_dimensions;
use crate::store::{ProcessedStore, RollupKind};

/// Snapshot ids and write time of the processed directory the caches were filled from
#[derive(Debug, Clone, PartialEq, Eq)]
struct Generation {
    weeks: Vec<WeekId>,
    written_at: Option<SystemTime>,
}

/// Loads snapshots, roll-ups and dimension tables once and serves reports
/// for any selectable week.
///
/// Safe to share between threads; every table is parsed at most once per
/// file path. All caches are dropped when a catalog scan sees that the
/// processed directory was rewritten, or on [`DashboardLoader::invalidate`].
pub struct DashboardLoader {
    store: ProcessedStore,
    raw_dir: PathBuf,
    config: DashboardConfig,
    snapshots: ReadThroughCache<PathBuf, Vec<EnrichedOrder>>,
    dimensions: ReadThroughCache<PathBuf, Dimensions>,
    new_users: ReadThroughCache<PathBuf, Vec<NewUser>>,
    volumes: ReadThroughCache<PathBuf, Vec<Volume>>,
    reports: ReadThroughCache<(WeekId, DashboardConfig), WeekReport>,
    generation: RwLock<Option<Generation>>,
}

impl DashboardLoader {
    pub fn new(processed_dir: impl Into<PathBuf>, raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: ProcessedStore::new(processed_dir),
            raw_dir: raw_dir.into(),
            config: DashboardConfig::default(),
            snapshots: ReadThroughCache::new(),
            dimensions: ReadThroughCache::new(),
            new_users: ReadThroughCache::new(),
            volumes: ReadThroughCache::new(),
            reports: ReadThroughCache::new(),
            generation: RwLock::new(None),
        }
    }

    pub fn with_config(mut self, config: DashboardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn processed_dir(&self) -> &Path {
        self.store.dir()
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    /// Weeks currently on disk. Not cached, so a finished `prepare` run shows up
    /// without a restart.
    pub fn catalog(&self) -> Result<WeekCatalog, DashboardError> {
        let catalog = WeekCatalog::scan(&self.store)?;
        self.observe(Generation {
            weeks: catalog.all().to_vec(),
            written_at: self.store.written_at(),
        });
        Ok(catalog)
    }

    fn observe(&self, current: Generation) {
        let mut seen = self
            .generation
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if seen.as_ref().is_some_and(|seen| *seen != current) {
            info!(
                dir = %self.store.dir().display(),
                "Processed data changed, dropping cached tables"
            );
            self.invalidate();
        }
        *seen = Some(current);
    }

    /// Newest week that has an older neighbour
    pub fn default_week(&self) -> Result<WeekId, DashboardError> {
        self.catalog()?
            .newest_selectable()
            .ok_or_else(|| DashboardError::NoWeeks(self.store.dir().to_path_buf()))
    }

    pub fn snapshot(&self, week: &WeekId) -> Result<Arc<Vec<EnrichedOrder>>, DashboardError> {
        let path = self.store.snapshot_path(week);
        self.snapshots.get_or_try_load(&path, || {
            debug!(%week, "Loading weekly snapshot");
            Ok(self.store.read_snapshot(week)?)
        })
    }

    pub fn dimensions(&self) -> Result<Arc<Dimensions>, DashboardError> {
        self.dimensions.get_or_try_load(&self.raw_dir, || {
            debug!(dir = %self.raw_dir.display(), "Loading dimension tables");
            Ok(load_dimensions(&self.raw_dir)?)
        })
    }

    pub fn new_users(&self) -> Result<Arc<Vec<NewUser>>, DashboardError> {
        let path = self.store.rollup_path(RollupKind::NewUsers);
        self.new_users
            .get_or_try_load(&path, || Ok(self.store.read_new_users()?))
    }

    pub fn volumes(&self) -> Result<Arc<Vec<Volume>>, DashboardError> {
        let path = self.store.rollup_path(RollupKind::Volumes);
        self.volumes
            .get_or_try_load(&path, || Ok(self.store.read_volumes()?))
    }

    /// Compare `week` with the next older week
    pub fn report(&self, week: &WeekId) -> Result<Arc<WeekReport>, DashboardError> {
        let catalog = self.catalog()?;
        if !catalog.contains(week) {
            return Err(DashboardError::UnknownWeek(week.to_string()));
        }
        let previous_week = catalog.previous_of(week)?;

        self.reports.get_or_try_load(&(*week, self.config), || {
            let current = self.snapshot(week)?;
            let previous = self.snapshot(&previous_week)?;
            let new_users = self.new_users()?;
            let volumes = self.volumes()?;
            let dimensions = self.dimensions()?;

            let report = WeekReport::build(
                ReportInputs {
                    week: *week,
                    previous_week,
                    current: &current,
                    previous: &previous,
                    new_users: &new_users,
                    volumes: &volumes,
                    dimensions: &dimensions,
                },
                &self.config,
            );
            info!(%week, %previous_week, orders = current.len(), "Built week report");
            Ok(report)
        })
    }

    /// Drop every cached table and report
    pub fn invalidate(&self) {
        self.snapshots.clear();
        self.dimensions.clear();
        self.new_users.clear();
        self.volumes.clear();
        self.reports.clear();
    }
}
