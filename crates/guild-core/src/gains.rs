//! Per-member point deltas between two normalised rosters.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::models::{GainRecord, Roster};

/// Gains for every member present at both ends of a window, plus the
/// identities that could not be compared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GainReport {
    /// Keyed by identity; iteration order is identity ascending.
    pub gains: BTreeMap<String, GainRecord>,
    /// Members present at window start but missing from the end roster,
    /// sorted ascending.
    pub dropped: Vec<String>,
}

impl GainReport {
    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }

    /// Gain records in identity order.
    pub fn records(&self) -> Vec<GainRecord> {
        self.gains.values().cloned().collect()
    }
}

/// Stateless delta computation.
pub struct GainCalculator;

impl GainCalculator {
    /// Compute `end - start` for every identity in `start`.
    ///
    /// Members missing from `end` are recorded in [`GainReport::dropped`]
    /// instead of failing the batch. Members only in `end` joined during the
    /// window and are not scored.
    pub fn compute_gains(start: &Roster, end: &Roster) -> GainReport {
        let mut report = GainReport::default();

        for (identity, before) in start {
            match end.get(identity) {
                Some(after) => {
                    let delta = after.points as i64 - before.points as i64;
                    if delta < 0 {
                        debug!("{} lost {} points during the window", identity, -delta);
                    }
                    report.gains.insert(
                        identity.clone(),
                        GainRecord {
                            identity: identity.clone(),
                            delta,
                        },
                    );
                }
                None => {
                    warn!(
                        "{} not found in end snapshot; excluded from gains",
                        identity
                    );
                    report.dropped.push(identity.clone());
                }
            }
        }

        let joined = end.keys().filter(|id| !start.contains_key(*id)).count();
        debug!(
            "Compared {} members: {} dropped, {} joined",
            start.len(),
            report.dropped.len(),
            joined
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberRecord;

    fn roster(members: &[(&str, u64)]) -> Roster {
        members
            .iter()
            .map(|(name, points)| {
                (
                    name.to_string(),
                    MemberRecord {
                        identity: name.to_string(),
                        points: *points,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_compute_gains_basic() {
        let start = roster(&[("alice", 100), ("bob", 200)]);
        let end = roster(&[("alice", 150), ("bob", 250)]);

        let report = GainCalculator::compute_gains(&start, &end);

        assert_eq!(report.gains.len(), 2);
        assert_eq!(report.gains["alice"].delta, 50);
        assert_eq!(report.gains["bob"].delta, 50);
        assert!(report.dropped.is_empty());
    }

    #[test]
    fn test_compute_gains_negative_delta_not_clamped() {
        let start = roster(&[("alice", 300)]);
        let end = roster(&[("alice", 120)]);

        let report = GainCalculator::compute_gains(&start, &end);
        assert_eq!(report.gains["alice"].delta, -180);
    }

    #[test]
    fn test_compute_gains_member_missing_from_end_is_dropped() {
        let start = roster(&[("alice", 100), ("dave", 40), ("bob", 10)]);
        let end = roster(&[("alice", 110), ("bob", 12)]);

        let report = GainCalculator::compute_gains(&start, &end);

        assert_eq!(report.gains.len(), 2);
        assert!(!report.gains.contains_key("dave"));
        assert_eq!(report.dropped, vec!["dave".to_string()]);
    }

    #[test]
    fn test_compute_gains_new_members_not_scored() {
        let start = roster(&[("alice", 100)]);
        let end = roster(&[("alice", 100), ("newbie", 5_000)]);

        let report = GainCalculator::compute_gains(&start, &end);

        assert_eq!(report.gains.len(), 1);
        assert_eq!(report.gains["alice"].delta, 0);
        assert!(report.dropped.is_empty());
    }

    #[test]
    fn test_compute_gains_empty_start() {
        let report = GainCalculator::compute_gains(&Roster::new(), &roster(&[("alice", 1)]));
        assert!(report.is_empty());
    }

    #[test]
    fn test_records_in_identity_order() {
        let start = roster(&[("carol", 1), ("alice", 1), ("bob", 1)]);
        let end = roster(&[("carol", 2), ("alice", 2), ("bob", 2)]);

        let names: Vec<String> = GainCalculator::compute_gains(&start, &end)
            .records()
            .into_iter()
            .map(|r| r.identity)
            .collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }
}
