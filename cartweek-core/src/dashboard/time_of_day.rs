//! Fixed time-of-day buckets

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// Up to 06:00
    Night,
    /// 07:00 - 09:00
    EarlyMorning,
    /// 10:00 - 12:00
    Morning,
    /// 13:00 - 15:00
    EarlyAfternoon,
    /// 16:00 - 18:00
    Afternoon,
    /// After 18:00
    Evening,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 6] = [
        Self::Night,
        Self::EarlyMorning,
        Self::Morning,
        Self::EarlyAfternoon,
        Self::Afternoon,
        Self::Evening,
    ];

    pub fn from_hour(hour: u8) -> Self {
        match hour {
            0..=6 => Self::Night,
            7..=9 => Self::EarlyMorning,
            10..=12 => Self::Morning,
            13..=15 => Self::EarlyAfternoon,
            16..=18 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Night => "night",
            Self::EarlyMorning => "early morning",
            Self::Morning => "morning",
            Self::EarlyAfternoon => "early afternoon",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Order counts per bucket, indexed in [`TimeOfDay::ALL`] order
pub(crate) fn bucket_counts(hours: impl IntoIterator<Item = u8>) -> [u64; 6] {
    let mut counts = [0u64; 6];
    for hour in hours {
        counts[TimeOfDay::from_hour(hour).index()] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_boundaries() {
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(7), TimeOfDay::EarlyMorning);
        assert_eq!(TimeOfDay::from_hour(9), TimeOfDay::EarlyMorning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(15), TimeOfDay::EarlyAfternoon);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(19), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Evening);
    }

    #[test]
    fn all_is_in_chronological_order() {
        let mut sorted = TimeOfDay::ALL;
        sorted.sort();
        assert_eq!(sorted, TimeOfDay::ALL);
        for (i, bucket) in TimeOfDay::ALL.iter().enumerate() {
            assert_eq!(bucket.index(), i);
        }
    }

    #[test]
    fn counts_every_hour_once() {
        let counts = bucket_counts(0..24);
        assert_eq!(counts, [7, 3, 3, 3, 3, 5]);
        assert_eq!(counts.iter().sum::<u64>(), 24);
    }
}
