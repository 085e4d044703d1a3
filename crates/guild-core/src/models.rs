use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A calendar month, the unit over which gains are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based month (1 = January).
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Whether `date` falls inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Identifier of one snapshot file: the file stem plus the date embedded in it.
///
/// Ordering is by date first and name second, so snapshots sort
/// chronologically and same-day files still have a stable order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnapshotId {
    pub date: NaiveDate,
    pub name: String,
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One member's cumulative point total at the moment a snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub identity: String,
    pub points: u64,
}

/// Canonical, normalised member roster keyed by identity.
pub type Roster = BTreeMap<String, MemberRecord>;

/// Point change of a single member across a gain window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GainRecord {
    pub identity: String,
    /// End points minus start points. Negative values are kept as-is.
    pub delta: i64,
}

/// One row of a ranked leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based competition rank, shared by entries with equal delta.
    pub rank: usize,
    pub identity: String,
    pub delta: i64,
}
