//! Tie-aware leaderboard ranking over gain records.

use std::cmp::Ordering;

use tracing::debug;

use crate::error::{GainError, Result};
use crate::models::{GainRecord, LeaderboardEntry};

/// Stateless ranking of gain records.
pub struct LeaderboardRanker;

impl LeaderboardRanker {
    /// Rank `gains` by delta descending and cut the list after `limit`
    /// entries, extended so that members tied at the cutoff are never split.
    ///
    /// * Equal deltas are ordered by identity ascending, so the output does not
    ///   depend on input order.
    /// * A `limit` of at least `gains.len()` is clamped to `gains.len() - 1`
    ///   (never below 1) before tie extension. With distinct deltas this leaves
    ///   out the lowest gainer.
    /// * Ranks are competition ranks: ties share a rank and the next distinct
    ///   delta gets its 1-based position (`1, 1, 3`).
    ///
    /// Fails with [`GainError::InsufficientData`] when `gains` is empty and
    /// [`GainError::Validation`] when `limit` is zero.
    pub fn rank(gains: &[GainRecord], limit: usize) -> Result<Vec<LeaderboardEntry>> {
        if gains.is_empty() {
            return Err(GainError::InsufficientData(
                "no gain records to rank".to_string(),
            ));
        }
        if limit == 0 {
            return Err(GainError::Validation(
                "leaderboard limit must be at least 1".to_string(),
            ));
        }

        let mut sorted: Vec<&GainRecord> = gains.iter().collect();
        sorted.sort_by(|a, b| Self::compare(a, b));

        let count = sorted.len();
        let mut cutoff = if limit >= count { count - 1 } else { limit };
        cutoff = cutoff.max(1);
        let clamped = cutoff;

        // Extend while the last included and first excluded entries are tied.
        while cutoff < count && sorted[cutoff - 1].delta == sorted[cutoff].delta {
            cutoff += 1;
        }

        if cutoff != clamped {
            debug!(
                "Extended leaderboard cutoff from {} to {} to keep tied deltas together",
                clamped, cutoff
            );
        }

        let mut entries = Vec::with_capacity(cutoff);
        let mut rank = 0usize;
        let mut prev_delta: Option<i64> = None;
        for (position, record) in sorted.into_iter().take(cutoff).enumerate() {
            if prev_delta != Some(record.delta) {
                rank = position + 1;
            }
            prev_delta = Some(record.delta);
            entries.push(LeaderboardEntry {
                rank,
                identity: record.identity.clone(),
                delta: record.delta,
            });
        }

        Ok(entries)
    }

    /// Delta descending, then identity ascending.
    fn compare(a: &GainRecord, b: &GainRecord) -> Ordering {
        b.delta
            .cmp(&a.delta)
            .then_with(|| a.identity.cmp(&b.identity))
    }
}
