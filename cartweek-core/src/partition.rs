//! Weekly partitioning of the enriched order stream
//!
//! Windows are carved backwards from the newest order date: `(max - 7, max]`,
//! then `(max - 14, max - 7]`, and so on while at least seven days of range
//! remain. The oldest, partial window is dropped so that every snapshot
//! covers exactly seven days.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::EnrichedOrder;

pub const WEEK_DAYS: u64 = 7;

/// Half-open seven day window `(end - 7, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekWindow {
    end: NaiveDate,
}

impl WeekWindow {
    pub fn ending(end: NaiveDate) -> Self {
        Self { end }
    }

    /// Last date inside the window
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Exclusive lower boundary
    pub fn start(&self) -> NaiveDate {
        self.end
            .checked_sub_days(Days::new(WEEK_DAYS))
            .unwrap_or(NaiveDate::MIN)
    }

    /// First date inside the window
    pub fn first_day(&self) -> NaiveDate {
        self.end
            .checked_sub_days(Days::new(WEEK_DAYS - 1))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date > self.start() && date <= self.end
    }

    /// The window immediately before this one
    pub fn previous(&self) -> Self {
        Self::ending(self.start())
    }

    pub fn id(&self) -> WeekId {
        WeekId {
            end: self.end,
            first_day: self.first_day(),
        }
    }
}

/// Name of a weekly snapshot: `<end>_<first_day>`, e.g. `2023-10-01_2023-09-25`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekId {
    pub end: NaiveDate,
    pub first_day: NaiveDate,
}

impl WeekId {
    /// Inclusive on both ends
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.end
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}",
            self.end.format("%Y-%m-%d"),
            self.first_day.format("%Y-%m-%d")
        )
    }
}

impl FromStr for WeekId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (end, first_day) = s
            .split_once('_')
            .ok_or_else(|| format!("week id must be <end>_<first_day>: {s}"))?;
        let parse = |part: &str| {
            NaiveDate::parse_from_str(part, "%Y-%m-%d")
                .map_err(|e| format!("invalid date {part:?} in week id {s}: {e}"))
        };
        let id = Self {
            end: parse(end)?,
            first_day: parse(first_day)?,
        };
        if id.first_day > id.end {
            return Err(format!("week id {s} ends before it starts"));
        }
        Ok(id)
    }
}

impl TryFrom<String> for WeekId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekId> for String {
    fn from(id: WeekId) -> Self {
        id.to_string()
    }
}

/// All full windows between `min` and `max`, newest first.
///
/// The count is `floor((max - min) / 7)`; whatever remains below the oldest
/// window spans fewer than seven days.
pub fn week_windows(min: NaiveDate, max: NaiveDate) -> Vec<WeekWindow> {
    let span = (max - min).num_days().max(0) as u64;
    let count = span / WEEK_DAYS;

    let mut windows = Vec::with_capacity(count as usize);
    let mut window = WeekWindow::ending(max);
    for _ in 0..count {
        windows.push(window);
        window = window.previous();
    }
    windows
}

/// Orders of one window
#[derive(Debug, Clone)]
pub struct WeeklySnapshot {
    pub window: WeekWindow,
    pub orders: Vec<EnrichedOrder>,
}

/// Split enriched orders into weekly snapshots, newest first.
///
/// Orders older than the oldest full window are not part of any snapshot.
pub fn partition(orders: &[EnrichedOrder]) -> Vec<WeeklySnapshot> {
    let Some((min, max)) = date_range(orders) else {
        return Vec::new();
    };

    let mut snapshots: Vec<WeeklySnapshot> = week_windows(min, max)
        .into_iter()
        .map(|window| WeeklySnapshot {
            window,
            orders: Vec::new(),
        })
        .collect();

    let mut dropped = 0usize;
    for order in orders {
        let index = ((max - order.date).num_days() as u64 / WEEK_DAYS) as usize;
        match snapshots.get_mut(index) {
            Some(snapshot) => snapshot.orders.push(order.clone()),
            None => dropped += 1,
        }
    }

    debug!(
        weeks = snapshots.len(),
        dropped,
        min = %min,
        max = %max,
        "Partitioned orders"
    );
    snapshots
}

/// Oldest and newest order dates
pub fn date_range(orders: &[EnrichedOrder]) -> Option<(NaiveDate, NaiveDate)> {
    let min = orders.iter().map(|o| o.date).min()?;
    let max = orders.iter().map(|o| o.date).max()?;
    Some((min, max))
}
