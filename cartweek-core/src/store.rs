//! Processed output directory: weekly snapshots and roll-up archives
//!
//! Layout:
//!
//! ```text
//! processed/
//!   orders_2023-10-01_2023-09-25.csv.gz   (orders.csv inside)
//!   orders_2023-09-24_2023-09-18.csv.gz
//!   ...
//!   new_users.csv.gz
//!   engagement.csv.gz
//!   retention.csv.gz
//!   volumes.csv.gz
//! ```

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::archive::{ARCHIVE_EXT, read_archive, write_archive};
use crate::error::StoreError;
use crate::model::EnrichedOrder;
use crate::partition::{WeekId, WeeklySnapshot};
use crate::rollup::{NewUser, Rollups, Volume};

const SNAPSHOT_PREFIX: &str = "orders_";
const SNAPSHOT_ENTRY: &str = "orders.csv";

/// The four roll-up tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RollupKind {
    NewUsers,
    Engagement,
    Retention,
    Volumes,
}

impl RollupKind {
    pub const ALL: [RollupKind; 4] = [
        Self::NewUsers,
        Self::Engagement,
        Self::Retention,
        Self::Volumes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::NewUsers => "new_users",
            Self::Engagement => "engagement",
            Self::Retention => "retention",
            Self::Volumes => "volumes",
        }
    }

    fn entry(&self) -> String {
        format!("{}.csv", self.name())
    }
}

/// Row counts of the roll-ups written by one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RollupCounts {
    pub new_users: usize,
    pub engagement: usize,
    pub retention: usize,
    pub volumes: usize,
}

/// Parse `orders_<end>_<first_day>.csv.gz` into its week id
pub fn parse_snapshot_name(file_name: &str) -> Result<WeekId, StoreError> {
    file_name
        .strip_prefix(SNAPSHOT_PREFIX)
        .and_then(|rest| rest.strip_suffix(ARCHIVE_EXT))
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| StoreError::InvalidArchiveName(file_name.to_string()))
}

/// Delete `dir` with everything in it and recreate it empty.
/// Safe to call when the directory does not exist.
pub fn reset_dir(dir: &Path) -> Result<(), StoreError> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
    }
    std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
    debug!(dir = %dir.display(), "Reset directory");
    Ok(())
}

/// Reads and writes the processed directory
#[derive(Debug, Clone)]
pub struct ProcessedStore {
    dir: PathBuf,
}

impl ProcessedStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Delete the directory with everything in it and recreate it empty
    pub fn reset(&self) -> Result<(), StoreError> {
        reset_dir(&self.dir)
    }

    pub fn snapshot_path(&self, week: &WeekId) -> PathBuf {
        self.dir
            .join(format!("{SNAPSHOT_PREFIX}{week}{ARCHIVE_EXT}"))
    }

    pub fn rollup_path(&self, kind: RollupKind) -> PathBuf {
        self.dir.join(format!("{}{ARCHIVE_EXT}", kind.name()))
    }

    pub fn write_snapshot(&self, snapshot: &WeeklySnapshot) -> Result<WeekId, StoreError> {
        let week = snapshot.window.id();
        let path = self.snapshot_path(&week);
        let rows = write_archive(&path, SNAPSHOT_ENTRY, &snapshot.orders)?;
        debug!(week = %week, rows, "Saved weekly orders");
        Ok(week)
    }

    pub fn write_rollups(&self, rollups: &Rollups) -> Result<RollupCounts, StoreError> {
        let counts = RollupCounts {
            new_users: self.write_rollup(RollupKind::NewUsers, &rollups.new_users)?,
            engagement: self.write_rollup(RollupKind::Engagement, &rollups.engagement)?,
            retention: self.write_rollup(RollupKind::Retention, &rollups.retention)?,
            volumes: self.write_rollup(RollupKind::Volumes, &rollups.volumes)?,
        };
        info!(?counts, "Saved roll-ups");
        Ok(counts)
    }

    fn write_rollup<T: Serialize>(
        &self,
        kind: RollupKind,
        rows: &[T],
    ) -> Result<usize, StoreError> {
        write_archive(&self.rollup_path(kind), &kind.entry(), rows)
    }

    /// Week ids of all snapshots present, newest first. A missing directory has none.
    pub fn list_weeks(&self) -> Result<Vec<WeekId>, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };

        let mut weeks = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with(SNAPSHOT_PREFIX) && name.ends_with(ARCHIVE_EXT) {
                weeks.push(parse_snapshot_name(name)?);
            }
        }
        weeks.sort_by(|a, b| b.cmp(a));
        Ok(weeks)
    }

    pub fn read_snapshot(&self, week: &WeekId) -> Result<Vec<EnrichedOrder>, StoreError> {
        read_archive(&self.snapshot_path(week), SNAPSHOT_ENTRY)
    }

    fn read_rollup<T: DeserializeOwned>(&self, kind: RollupKind) -> Result<Vec<T>, StoreError> {
        read_archive(&self.rollup_path(kind), &kind.entry())
    }

    pub fn read_new_users(&self) -> Result<Vec<NewUser>, StoreError> {
        self.read_rollup(RollupKind::NewUsers)
    }

    pub fn read_volumes(&self) -> Result<Vec<Volume>, StoreError> {
        self.read_rollup(RollupKind::Volumes)
    }

    /// When the last complete run finished; the volumes roll-up is written last
    pub fn written_at(&self) -> Option<SystemTime> {
        std::fs::metadata(self.rollup_path(RollupKind::Volumes))
            .and_then(|meta| meta.modified())
            .ok()
    }
}
