//! Available weekly snapshots and their neighbours

use serde::Serialize;

use crate::error::DashboardError;
use crate::partition::WeekId;
use crate::store::ProcessedStore;

/// Snapshot week ids, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeekCatalog {
    weeks: Vec<WeekId>,
}

impl WeekCatalog {
    pub fn new(mut weeks: Vec<WeekId>) -> Self {
        weeks.sort_by(|a, b| b.cmp(a));
        weeks.dedup();
        Self { weeks }
    }

    pub fn scan(store: &ProcessedStore) -> Result<Self, DashboardError> {
        Ok(Self::new(store.list_weeks()?))
    }

    pub fn all(&self) -> &[WeekId] {
        &self.weeks
    }

    /// Weeks that can be compared: the newest and the oldest are left out
    pub fn selectable(&self) -> &[WeekId] {
        if self.weeks.len() <= 2 {
            return &[];
        }
        &self.weeks[1..self.weeks.len() - 1]
    }

    /// Default selection
    pub fn newest_selectable(&self) -> Option<WeekId> {
        self.selectable().first().copied()
    }

    pub fn contains(&self, week: &WeekId) -> bool {
        self.weeks.contains(week)
    }

    /// The next older week
    pub fn previous_of(&self, week: &WeekId) -> Result<WeekId, DashboardError> {
        let index = self
            .weeks
            .iter()
            .position(|w| w == week)
            .ok_or_else(|| DashboardError::UnknownWeek(week.to_string()))?;
        self.weeks
            .get(index + 1)
            .copied()
            .ok_or_else(|| DashboardError::NoPreviousWeek(week.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::WeekWindow;
    use chrono::NaiveDate;

    fn week(day: u32) -> WeekId {
        WeekWindow::ending(NaiveDate::from_ymd_opt(2023, 9, day).unwrap()).id()
    }

    #[test]
    fn selectable_excludes_newest_and_oldest() {
        let catalog = WeekCatalog::new(vec![week(3), week(24), week(10), week(17)]);
        assert_eq!(catalog.all(), &[week(24), week(17), week(10), week(3)]);
        assert_eq!(catalog.selectable(), &[week(17), week(10)]);
        assert_eq!(catalog.newest_selectable(), Some(week(17)));
    }

    #[test]
    fn short_catalog_has_nothing_selectable() {
        assert!(WeekCatalog::new(vec![week(3), week(10)]).selectable().is_empty());
        assert!(WeekCatalog::default().selectable().is_empty());
    }

    #[test]
    fn previous_is_next_older_week() {
        let catalog = WeekCatalog::new(vec![week(3), week(10), week(17)]);
        assert_eq!(catalog.previous_of(&week(17)).unwrap(), week(10));
        assert_eq!(catalog.previous_of(&week(10)).unwrap(), week(3));
    }

    #[test]
    fn oldest_week_has_no_previous() {
        let catalog = WeekCatalog::new(vec![week(3), week(10)]);
        let err = catalog.previous_of(&week(3)).unwrap_err();
        assert!(matches!(err, DashboardError::NoPreviousWeek(_)));
    }

    #[test]
    fn unknown_week_is_rejected() {
        let catalog = WeekCatalog::new(vec![week(3), week(10)]);
        let err = catalog.previous_of(&week(24)).unwrap_err();
        assert!(matches!(err, DashboardError::UnknownWeek(_)));
    }
}
