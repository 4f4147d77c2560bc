//! Amount planner: turns `(profile, total)` into per-tier integer targets.
//!
//! Each weighted tier gets `floor(total * weight)`. Whatever rounding leaves
//! over is handed out one unit per weighted tier in fall-through order, wrapping
//! as often as needed. Tiers without a weight never receive anything.

use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::DifficultyTier;
use crate::error::AllocationError;
use crate::profiles::DifficultyProfile;

/// Per-tier item counts, indexed by `DifficultyTier`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(into = "BTreeMap<DifficultyTier, u32>")]
pub struct AllocationPlan([u32; DifficultyTier::COUNT]);

impl AllocationPlan {
    pub fn counts(&self) -> [u32; DifficultyTier::COUNT] { self.0 }

    pub fn total(&self) -> u64 { self.0.iter().map(|&c| u64::from(c)).sum() }
}

impl Index<DifficultyTier> for AllocationPlan {
    type Output = u32;
    fn index(&self, tier: DifficultyTier) -> &u32 { &self.0[tier.index()] }
}

impl IndexMut<DifficultyTier> for AllocationPlan {
    fn index_mut(&mut self, tier: DifficultyTier) -> &mut u32 { &mut self.0[tier.index()] }
}

impl From<AllocationPlan> for BTreeMap<DifficultyTier, u32> {
    fn from(plan: AllocationPlan) -> Self {
        DifficultyTier::ALL.into_iter().zip(plan.counts()).collect()
    }
}

/// Reject negative totals, and totals beyond `u32::MAX`, before any planning happens.
pub fn validate_total(total_amount: i64) -> Result<u32, AllocationError> {
    u32::try_from(total_amount).map_err(|_| AllocationError::InvalidTotalAmount(total_amount))
}

/// Plan how many items to draw from each tier. The result always sums to `total_amount`.
#[instrument(level = "debug", skip(profile), fields(code = %profile.code()))]
pub fn plan(profile: &DifficultyProfile, total_amount: i64) -> Result<AllocationPlan, AllocationError> {
    let total = validate_total(total_amount)?;
    Ok(plan_amounts(profile, total))
}

pub fn plan_amounts(profile: &DifficultyProfile, total: u32) -> AllocationPlan {
    let weighted: Vec<(DifficultyTier, f64)> = profile
        .tiers_in_fall_through_order()
        .into_iter()
        .filter_map(|t| profile.weight(t).map(|w| (t, w)))
        .collect();

    let mut plan = AllocationPlan::default();
    if weighted.is_empty() {
        return plan;
    }

    // Truncation, never round-half-even.
    let mut actual_total: u64 = 0;
    for &(tier, weight) in &weighted {
        let amount = (f64::from(total) * weight).floor() as u32;
        plan[tier] = amount;
        actual_total += u64::from(amount);
    }

    let wanted = u64::from(total);
    if actual_total < wanted {
        // Equivalent to walking the order one unit at a time until nothing is left.
        let remainder = wanted - actual_total;
        let n = weighted.len() as u64;
        let (each, extra) = (remainder / n, remainder % n);
        for (i, &(tier, _)) in weighted.iter().enumerate() {
            let bump = each + u64::from((i as u64) < extra);
            plan[tier] += bump as u32;
        }
        debug!(target: "allocation", remainder, "Distributed rounding remainder");
    } else if actual_total > wanted {
        // Only reachable when supplied weights sum above 1.
        let mut excess = actual_total - wanted;
        while excess > 0 {
            for &(tier, _) in weighted.iter().rev() {
                if excess == 0 {
                    break;
                }
                if plan[tier] > 0 {
                    plan[tier] -= 1;
                    excess -= 1;
                }
            }
        }
        debug!(target: "allocation", excess = actual_total - wanted, "Trimmed overshooting weights");
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FallThroughDirection;
    use crate::profiles::ProfileRegistry;
    use proptest::prelude::*;
    use DifficultyTier::*;

    fn plan_for(code: &str, total: i64) -> AllocationPlan {
        let reg = ProfileRegistry::with_defaults();
        plan(reg.lookup(code).unwrap(), total).unwrap()
    }

    #[test]
    fn test_balanced_exact() {
        assert_eq!(plan_for("balanced", 5).counts(), [1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_easy_only_no_remainder() {
        let p = plan_for("easy_only", 5);
        assert_eq!(p.counts(), [2, 3, 0, 0, 0]);
    }

    #[test]
    fn test_easy_only_remainder_goes_bottom_up() {
        let p = plan_for("easy_only", 9);
        assert_eq!(p[VeryEasy], 4);
        assert_eq!(p[Easy], 5);
        assert_eq!(p.total(), 9);
    }

    #[test]
    fn test_hard_only_remainder_goes_top_down() {
        let p = plan_for("hard_only", 9);
        assert_eq!(p[Hard], 5);
        assert_eq!(p[VeryHard], 4);
        assert_eq!(p.counts()[..3], [0, 0, 0]);
    }

    #[test]
    fn test_balanced_remainder_starts_at_very_hard() {
        assert_eq!(plan_for("balanced", 7).counts(), [1, 1, 1, 2, 2]);
    }

    #[test]
    fn test_mostly_profiles() {
        assert_eq!(plan_for("mostly_easy", 10).counts(), [3, 3, 2, 1, 1]);
        assert_eq!(plan_for("mostly_hard", 10).counts(), [1, 1, 2, 3, 3]);
    }

    #[test]
    fn test_zero_total() {
        for code in ["easy_only", "hard_only", "balanced", "mostly_easy", "mostly_hard"] {
            assert_eq!(plan_for(code, 0), AllocationPlan::default());
        }
    }

    #[test]
    fn test_negative_total_rejected() {
        let reg = ProfileRegistry::with_defaults();
        let err = plan(reg.lookup("balanced").unwrap(), -1).unwrap_err();
        assert_eq!(err, AllocationError::InvalidTotalAmount(-1));
    }

    #[test]
    fn test_total_above_u32_range_rejected() {
        let reg = ProfileRegistry::with_defaults();
        let profile = reg.lookup("balanced").unwrap();
        let max = i64::from(u32::MAX);

        assert_eq!(plan(profile, max).unwrap().total(), u64::from(u32::MAX));
        assert_eq!(plan(profile, max + 1).unwrap_err(), AllocationError::InvalidTotalAmount(max + 1));
    }

    #[test]
    fn test_single_tier_profile() {
        let p = DifficultyProfile::new("medium_only", FallThroughDirection::BottomUp, [(Medium, 1.0)]).unwrap();
        assert_eq!(plan_amounts(&p, 13).counts(), [0, 0, 13, 0, 0]);
    }

    #[test]
    fn test_remainder_wraps_for_undersized_weights() {
        // Weights sum to 0.2: most of the total arrives as remainder.
        let p = DifficultyProfile::new("thin", FallThroughDirection::TopDown, [(Easy, 0.1), (Hard, 0.1)]).unwrap();
        let plan = plan_amounts(&p, 11);
        // floor(1.1) = 1 each, remainder 9: Hard gets 5, Easy gets 4.
        assert_eq!(plan[Hard], 6);
        assert_eq!(plan[Easy], 5);
        assert_eq!(plan.total(), 11);
    }

    #[test]
    fn test_overshooting_weights_trimmed() {
        let p = DifficultyProfile::new("fat", FallThroughDirection::BottomUp, [(VeryEasy, 0.8), (Easy, 0.8)]).unwrap();
        let plan = plan_amounts(&p, 10);
        assert_eq!(plan.total(), 10);
        // Trimming walks backwards from the checkpoint side, one unit per tier.
        assert_eq!(plan[VeryEasy], 5);
        assert_eq!(plan[Easy], 5);
    }

    #[test]
    fn test_plan_serializes_as_tier_map() {
        let json = serde_json::to_value(plan_for("easy_only", 5)).unwrap();
        assert_eq!(json["very_easy"], 2);
        assert_eq!(json["easy"], 3);
        assert_eq!(json["very_hard"], 0);
    }

    proptest! {
        #[test]
        fn plan_sums_to_total(total in 0..=1000i64) {
            let reg = ProfileRegistry::with_defaults();
            for profile in reg.iter() {
                let p = plan(profile, total).unwrap();
                prop_assert_eq!(p.total(), total as u64, "profile {}", profile.code());
            }
        }

        #[test]
        fn absent_tiers_stay_empty(total in 0..=1000u32) {
            let reg = ProfileRegistry::with_defaults();
            for profile in reg.iter() {
                let p = plan_amounts(profile, total);
                for tier in DifficultyTier::ALL {
                    if profile.weight(tier).is_none() {
                        prop_assert_eq!(p[tier], 0);
                    }
                }
            }
        }
    }
}
