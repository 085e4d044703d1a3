use crate::error::{GainError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Achievement tiers a member reaches by accumulating guild points.
///
/// Declaration order is the rank order: a later variant always outranks an
/// earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Copper,
    Silver,
    Gold,
    Plat,
    Lustre,
    Dreadlo,
    Void,
}

impl FromStr for Tier {
    type Err = GainError;

    /// Case-insensitive construction from a tier name.
    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "copper" => Ok(Tier::Copper),
            "silver" => Ok(Tier::Silver),
            "gold" => Ok(Tier::Gold),
            "plat" => Ok(Tier::Plat),
            "lustre" => Ok(Tier::Lustre),
            "dreadlo" => Ok(Tier::Dreadlo),
            "void" => Ok(Tier::Void),
            other => Err(GainError::Validation(format!("unknown tier: {other}"))),
        }
    }
}

impl Tier {
    /// The canonical uppercase display name, as used for role names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Copper => "COPPER",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Plat => "PLAT",
            Tier::Lustre => "LUSTRE",
            Tier::Dreadlo => "DREADLO",
            Tier::Void => "VOID",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Thresholds ────────────────────────────────────────────────────────────────

/// Production thresholds, ascending.
pub const DEFAULT_THRESHOLDS: &[(Tier, u64)] = &[
    (Tier::Copper, 1_000),
    (Tier::Silver, 2_000),
    (Tier::Gold, 5_000),
    (Tier::Plat, 10_000),
    (Tier::Lustre, 15_000),
    (Tier::Dreadlo, 25_000),
    (Tier::Void, 50_000),
];

/// Sorted staircase of `(tier, minimum points)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    steps: Vec<(Tier, u64)>,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            steps: DEFAULT_THRESHOLDS.to_vec(),
        }
    }
}

impl TierTable {
    /// Build a table from explicit steps.
    ///
    /// Both thresholds and tiers must be strictly increasing, so the order
    /// over tiers mirrors the order over thresholds.
    pub fn new(steps: Vec<(Tier, u64)>) -> Result<Self> {
        if steps.is_empty() {
            return Err(GainError::Config("tier table is empty".to_string()));
        }
        for pair in steps.windows(2) {
            let (lower_tier, lower_min) = pair[0];
            let (upper_tier, upper_min) = pair[1];
            if upper_min <= lower_min || upper_tier <= lower_tier {
                return Err(GainError::Config(format!(
                    "tier thresholds must be strictly increasing: {lower_tier}={lower_min}, {upper_tier}={upper_min}"
                )));
            }
        }
        Ok(Self { steps })
    }

    /// The steps in ascending order.
    pub fn steps(&self) -> &[(Tier, u64)] {
        &self.steps
    }

    /// Minimum points for `tier`, or `None` when the table has no such step.
    pub fn threshold(&self, tier: Tier) -> Option<u64> {
        self.steps
            .iter()
            .find(|(t, _)| *t == tier)
            .map(|(_, min)| *min)
    }

    /// The greatest tier whose threshold is `<= points`, or `None` when
    /// `points` is below every threshold.
    pub fn classify(&self, points: u64) -> Option<Tier> {
        let mut reached = None;
        for &(tier, min) in &self.steps {
            if points >= min {
                reached = Some(tier);
            } else {
                break;
            }
        }
        reached
    }

    /// Decide which tier changes follow from a newly observed point value,
    /// given the tiers a member currently holds.
    pub fn plan_promotion(&self, held: &[Tier], points: u64) -> PromotionPlan {
        let Some(reached) = self.classify(points) else {
            return PromotionPlan::NoTier;
        };

        if let Some(&highest) = held.iter().filter(|t| **t > reached).max() {
            debug!("held tier {} outranks reached tier {}", highest, reached);
            return PromotionPlan::AlreadyHigher { held: highest };
        }

        let mut remove: Vec<Tier> = held.iter().copied().filter(|t| *t < reached).collect();
        remove.sort();
        remove.dedup();

        if held.contains(&reached) && remove.is_empty() {
            return PromotionPlan::UpToDate { tier: reached };
        }

        PromotionPlan::Promote {
            to: reached,
            remove,
        }
    }
}

/// Outcome of [`TierTable::plan_promotion`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PromotionPlan {
    /// The point value reaches no tier.
    NoTier,
    /// The member already holds a tier above the one reached.
    AlreadyHigher { held: Tier },
    /// The member holds exactly the reached tier and nothing lower.
    UpToDate { tier: Tier },
    /// Grant `to` (if not already held) and strip the lower tiers in `remove`.
    Promote { to: Tier, remove: Vec<Tier> },
}

/// Classify `points` against the production table.
pub fn classify(points: u64) -> Option<Tier> {
    TierTable::default().classify(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> TierTable {
        TierTable::new(vec![
            (Tier::Copper, 100),
            (Tier::Silver, 500),
            (Tier::Gold, 1_000),
        ])
        .unwrap()
    }

    // ── Tier::from_str ─────────────────────────────────────────────────────

    #[test]
    fn test_tier_from_str_case_insensitive() {
        assert_eq!("copper".parse::<Tier>().unwrap(), Tier::Copper);
        assert_eq!("VOID".parse::<Tier>().unwrap(), Tier::Void);
        assert_eq!(" Dreadlo ".parse::<Tier>().unwrap(), Tier::Dreadlo);
    }

    #[test]
    fn test_tier_from_str_invalid() {
        let err = "diamond".parse::<Tier>().unwrap_err();
        assert!(matches!(err, GainError::Validation(_)));
        assert!(err.to_string().contains("diamond"));
    }

    #[test]
    fn test_tier_order_follows_declaration() {
        assert!(Tier::Copper < Tier::Silver);
        assert!(Tier::Dreadlo < Tier::Void);
    }

    // ── TierTable::new ─────────────────────────────────────────────────────

    #[test]
    fn test_table_rejects_non_increasing_thresholds() {
        let err = TierTable::new(vec![(Tier::Copper, 500), (Tier::Silver, 500)]).unwrap_err();
        assert!(matches!(err, GainError::Config(_)));
    }

    #[test]
    fn test_table_rejects_tier_order_mismatch() {
        let err = TierTable::new(vec![(Tier::Gold, 100), (Tier::Silver, 500)]).unwrap_err();
        assert!(matches!(err, GainError::Config(_)));
    }

    #[test]
    fn test_table_rejects_empty() {
        assert!(TierTable::new(Vec::new()).is_err());
    }

    #[test]
    fn test_default_table_is_valid() {
        let table = TierTable::new(DEFAULT_THRESHOLDS.to_vec()).unwrap();
        assert_eq!(table, TierTable::default());
        assert_eq!(table.threshold(Tier::Plat), Some(10_000));
    }

    // ── classify ───────────────────────────────────────────────────────────

    #[test]
    fn test_classify_small_table_staircase() {
        let table = small_table();
        assert_eq!(table.classify(50), None);
        assert_eq!(table.classify(100), Some(Tier::Copper));
        assert_eq!(table.classify(499), Some(Tier::Copper));
        assert_eq!(table.classify(500), Some(Tier::Silver));
        assert_eq!(table.classify(999), Some(Tier::Silver));
        assert_eq!(table.classify(1_000), Some(Tier::Gold));
        assert_eq!(table.classify(1_000_000), Some(Tier::Gold));
    }

    #[test]
    fn test_classify_zero_yields_none() {
        let table = small_table();
        assert_eq!(table.classify(0), None);
    }

    #[test]
    fn test_classify_full_u64_range() {
        assert_eq!(classify(u64::MAX), Some(Tier::Void));
        assert_eq!(classify(i64::MAX as u64 + 1), Some(Tier::Void));
    }

    #[test]
    fn test_classify_production_boundaries() {
        assert_eq!(classify(999), None);
        assert_eq!(classify(1_000), Some(Tier::Copper));
        assert_eq!(classify(4_999), Some(Tier::Silver));
        assert_eq!(classify(25_000), Some(Tier::Dreadlo));
        assert_eq!(classify(49_999), Some(Tier::Dreadlo));
        assert_eq!(classify(50_000), Some(Tier::Void));
    }

    // ── plan_promotion ─────────────────────────────────────────────────────

    #[test]
    fn test_plan_promotion_no_tier() {
        let plan = TierTable::default().plan_promotion(&[Tier::Copper], 10);
        assert_eq!(plan, PromotionPlan::NoTier);
    }

    #[test]
    fn test_plan_promotion_already_higher() {
        let plan = TierTable::default().plan_promotion(&[Tier::Copper, Tier::Lustre], 5_500);
        assert_eq!(plan, PromotionPlan::AlreadyHigher { held: Tier::Lustre });
    }

    #[test]
    fn test_plan_promotion_up_to_date() {
        let plan = TierTable::default().plan_promotion(&[Tier::Gold], 6_000);
        assert_eq!(plan, PromotionPlan::UpToDate { tier: Tier::Gold });
    }

    #[test]
    fn test_plan_promotion_strips_lower_tiers() {
        let held = [Tier::Silver, Tier::Copper, Tier::Silver];
        let plan = TierTable::default().plan_promotion(&held, 10_000);
        assert_eq!(
            plan,
            PromotionPlan::Promote {
                to: Tier::Plat,
                remove: vec![Tier::Copper, Tier::Silver],
            }
        );
    }

    #[test]
    fn test_plan_promotion_held_target_with_lower_leftovers() {
        let plan = TierTable::default().plan_promotion(&[Tier::Copper, Tier::Gold], 5_000);
        assert_eq!(
            plan,
            PromotionPlan::Promote {
                to: Tier::Gold,
                remove: vec![Tier::Copper],
            }
        );
    }

    #[test]
    fn test_plan_promotion_from_nothing() {
        let plan = TierTable::default().plan_promotion(&[], 2_000);
        assert_eq!(
            plan,
            PromotionPlan::Promote {
                to: Tier::Silver,
                remove: vec![],
            }
        );
    }
}
