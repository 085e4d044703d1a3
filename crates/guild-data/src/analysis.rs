//! Monthly gain pipeline.
//!
//! Selects the month's boundary snapshots, normalises both, diffs them and
//! ranks the result, returning structured data for a presentation layer.

use guild_core::error::{GainError, Result};
use guild_core::gains::GainCalculator;
use guild_core::leaderboard::LeaderboardRanker;
use guild_core::models::{LeaderboardEntry, Roster, SnapshotId};
use guild_core::validation::MonthlyGainRequest;
use serde::Serialize;
use tracing::info;

use crate::parser::SnapshotParser;
use crate::store::SnapshotStore;

// ── Public types ──────────────────────────────────────────────────────────────

/// The complete output of [`evaluate_monthly_gain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyGainResult {
    /// Ranked, tie-extended leaderboard.
    pub entries: Vec<LeaderboardEntry>,
    /// Members present in the first snapshot but missing from the last.
    pub dropped: Vec<String>,
    /// First snapshot of the month (window start).
    pub start_snapshot: SnapshotId,
    /// Last snapshot of the month (window end).
    pub end_snapshot: SnapshotId,
    /// Number of members present in both snapshots.
    pub members_compared: usize,
}

impl MonthlyGainResult {
    /// The leaderboard as `(identity, delta)` pairs, in rank order.
    pub fn pairs(&self) -> Vec<(String, i64)> {
        self.entries
            .iter()
            .map(|e| (e.identity.clone(), e.delta))
            .collect()
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline for one validated request.
///
/// 1. List the month's snapshots; fewer than two is
///    [`GainError::InsufficientData`].
/// 2. Load and normalise the earliest and latest of them.
/// 3. Diff the rosters.
/// 4. Rank the gains.
pub fn evaluate_monthly_gain(
    store: &SnapshotStore,
    request: &MonthlyGainRequest,
) -> Result<MonthlyGainResult> {
    let year_month = request.year_month;

    // ── Step 1: Boundary snapshots ────────────────────────────────────────────
    let mut snapshots = store.list_snapshot_names(year_month);
    if snapshots.len() < 2 {
        return Err(GainError::InsufficientData(format!(
            "not enough data to compare, only {} snapshot(s) found for {}",
            snapshots.len(),
            year_month
        )));
    }
    let end_snapshot = snapshots.pop().ok_or_else(|| {
        GainError::InsufficientData(format!("no snapshots found for {year_month}"))
    })?;
    let start_snapshot = snapshots.swap_remove(0);

    info!(
        "Evaluating {} from {} to {}",
        year_month, start_snapshot, end_snapshot
    );

    // ── Step 2: Normalise ─────────────────────────────────────────────────────
    let start = load_roster(store, &start_snapshot)?;
    let end = load_roster(store, &end_snapshot)?;

    // ── Step 3: Diff ──────────────────────────────────────────────────────────
    let report = GainCalculator::compute_gains(&start, &end);
    if report.is_empty() {
        return Err(GainError::InsufficientData(format!(
            "no member of {} is present in {}",
            start_snapshot, end_snapshot
        )));
    }

    // ── Step 4: Rank ──────────────────────────────────────────────────────────
    let entries = LeaderboardRanker::rank(&report.records(), request.limit)?;

    info!(
        "Ranked {} of {} members ({} dropped)",
        entries.len(),
        report.gains.len(),
        report.dropped.len()
    );

    Ok(MonthlyGainResult {
        entries,
        members_compared: report.gains.len(),
        dropped: report.dropped,
        start_snapshot,
        end_snapshot,
    })
}

/// Load a snapshot and normalise it into a roster.
pub fn load_roster(store: &SnapshotStore, snapshot: &SnapshotId) -> Result<Roster> {
    let payload = store.load(&snapshot.name)?;
    SnapshotParser::normalize(&payload)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use guild_core::settings::StoreConfig;
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_snapshot(dir: &Path, date: &str, payload: serde_json::Value) {
        let path = dir.join(format!("idle_on_data_{date}.json"));
        std::fs::write(path, serde_json::to_string_pretty(&payload).unwrap()).unwrap();
    }

    fn members(list: &[(&str, u64)]) -> serde_json::Value {
        let members: Vec<serde_json::Value> = list
            .iter()
            .map(|(name, gp)| json!({"a": name, "e": gp}))
            .collect();
        json!({"guildData": {"members": members}})
    }

    fn run(dir: &TempDir, year: i32, month: u32, limit: usize) -> Result<MonthlyGainResult> {
        let store = SnapshotStore::new(StoreConfig::new(dir.path()));
        let request = MonthlyGainRequest::new(year, month, limit).unwrap();
        evaluate_monthly_gain(&store, &request)
    }

    #[test]
    fn test_evaluate_tied_gain_both_returned() {
        let dir = TempDir::new().unwrap();
        write_snapshot(dir.path(), "2025-02-01", members(&[("alice", 100), ("bob", 200)]));
        write_snapshot(dir.path(), "2025-02-28", members(&[("alice", 150), ("bob", 250)]));

        let result = run(&dir, 2025, 2, 1).unwrap();
        assert_eq!(
            result.pairs(),
            vec![("alice".to_string(), 50), ("bob".to_string(), 50)]
        );
        assert!(result.entries.iter().all(|e| e.rank == 1));
        assert_eq!(result.members_compared, 2);
    }

    #[test]
    fn test_evaluate_uses_month_boundaries_only() {
        let dir = TempDir::new().unwrap();
        write_snapshot(
            dir.path(),
            "2025-02-01",
            members(&[("alice", 100), ("bob", 50), ("carol", 10)]),
        );
        // A mid-month snapshot must not influence the window.
        write_snapshot(
            dir.path(),
            "2025-02-14",
            members(&[("alice", 9_000), ("bob", 9_000), ("carol", 9_000)]),
        );
        write_snapshot(
            dir.path(),
            "2025-02-27",
            members(&[("alice", 120), ("bob", 50), ("carol", 30)]),
        );
        // Neighbouring months are ignored.
        write_snapshot(
            dir.path(),
            "2025-03-01",
            members(&[("alice", 1), ("bob", 1), ("carol", 1)]),
        );

        let result = run(&dir, 2025, 2, 1).unwrap();
        assert_eq!(result.start_snapshot.name, "idle_on_data_2025-02-01");
        assert_eq!(result.end_snapshot.name, "idle_on_data_2025-02-27");
        assert_eq!(
            result.pairs(),
            vec![("alice".to_string(), 20), ("carol".to_string(), 20)]
        );
    }

    #[test]
    fn test_evaluate_single_snapshot_is_insufficient() {
        let dir = TempDir::new().unwrap();
        write_snapshot(dir.path(), "2025-02-01", members(&[("alice", 100)]));

        let err = run(&dir, 2025, 2, 5).unwrap_err();
        assert!(matches!(err, GainError::InsufficientData(_)));
        assert!(err.to_string().contains("only 1 snapshot"));
    }

    #[test]
    fn test_evaluate_member_missing_from_end_is_dropped() {
        let dir = TempDir::new().unwrap();
        write_snapshot(
            dir.path(),
            "2025-02-01",
            members(&[("alice", 100), ("bob", 100), ("gone", 100)]),
        );
        write_snapshot(dir.path(), "2025-02-20", members(&[("alice", 300), ("bob", 150)]));

        let result = run(&dir, 2025, 2, 5).unwrap();
        assert_eq!(result.dropped, vec!["gone".to_string()]);
        assert!(result.entries.iter().all(|e| e.identity != "gone"));
        assert_eq!(result.members_compared, 2);
    }

    #[test]
    fn test_evaluate_mixed_schema_versions() {
        let dir = TempDir::new().unwrap();
        write_snapshot(dir.path(), "2025-02-01", members(&[("alice", 100), ("bob", 100)]));
        write_snapshot(
            dir.path(),
            "2025-02-20",
            json!({"members": [
                {"name": "alice", "gpEarned": 400},
                {"name": "bob", "gpEarned": 110},
            ]}),
        );

        let result = run(&dir, 2025, 2, 1).unwrap();
        assert_eq!(result.pairs(), vec![("alice".to_string(), 300)]);
    }

    #[test]
    fn test_evaluate_schema_error_propagates() {
        let dir = TempDir::new().unwrap();
        write_snapshot(dir.path(), "2025-02-01", members(&[("alice", 100)]));
        write_snapshot(dir.path(), "2025-02-20", json!({"unexpected": true}));

        let err = run(&dir, 2025, 2, 1).unwrap_err();
        assert!(matches!(err, GainError::Schema(_)));
    }

    #[test]
    fn test_evaluate_corrupt_snapshot_propagates() {
        let dir = TempDir::new().unwrap();
        write_snapshot(dir.path(), "2025-02-01", members(&[("alice", 100)]));
        std::fs::write(dir.path().join("idle_on_data_2025-02-20.json"), "{truncated").unwrap();

        let err = run(&dir, 2025, 2, 1).unwrap_err();
        assert!(matches!(err, GainError::CorruptData { .. }));
    }

    #[test]
    fn test_evaluate_no_overlap_is_insufficient() {
        let dir = TempDir::new().unwrap();
        write_snapshot(dir.path(), "2025-02-01", members(&[("alice", 100)]));
        write_snapshot(dir.path(), "2025-02-20", members(&[("bob", 100)]));

        let err = run(&dir, 2025, 2, 1).unwrap_err();
        assert!(matches!(err, GainError::InsufficientData(_)));
    }

    #[test]
    fn test_evaluate_is_reproducible() {
        let dir = TempDir::new().unwrap();
        write_snapshot(
            dir.path(),
            "2025-02-01",
            members(&[("d", 0), ("c", 0), ("b", 0), ("a", 0)]),
        );
        write_snapshot(
            dir.path(),
            "2025-02-20",
            members(&[("d", 5), ("c", 5), ("b", 9), ("a", 5)]),
        );

        let first = run(&dir, 2025, 2, 2).unwrap();
        let second = run(&dir, 2025, 2, 2).unwrap();
        assert_eq!(first, second);
        let names: Vec<&str> = first.entries.iter().map(|e| e.identity.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c", "d"]);
    }
}
