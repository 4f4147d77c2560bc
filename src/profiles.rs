//! Difficulty profiles and the registry they are looked up from.
//!
//! A profile maps a subset of tiers to a fraction of the requested total and
//! names the direction in which shortfalls fall through. The registry is built
//! once at startup (defaults + optional TOML overrides) and only read afterwards.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::{DifficultyTier, FallThroughDirection};
use crate::error::AllocationError;

/// Weight sums further than this from 1.0 are logged; they are never rejected.
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

impl FallThroughDirection {
    /// All five tiers in traversal order. Only these two orderings exist.
    pub fn tiers(self) -> [DifficultyTier; DifficultyTier::COUNT] {
        let mut tiers = DifficultyTier::ALL;
        if self == FallThroughDirection::TopDown {
            tiers.reverse();
        }
        tiers
    }

    /// Tier reached last in one full traversal cycle.
    pub fn checkpoint(self) -> DifficultyTier {
        match self {
            FallThroughDirection::BottomUp => DifficultyTier::VeryHard,
            FallThroughDirection::TopDown => DifficultyTier::VeryEasy,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DifficultyProfile {
    code: String,
    weights: [Option<f64>; DifficultyTier::COUNT],
    direction: FallThroughDirection,
}

impl DifficultyProfile {
    /// Build a validated profile: at least one tier, every weight in (0, 1].
    pub fn new<I>(code: impl Into<String>, direction: FallThroughDirection, weights: I) -> Result<Self, AllocationError>
    where
        I: IntoIterator<Item = (DifficultyTier, f64)>,
    {
        let code = code.into();
        let invalid = |reason: String| AllocationError::InvalidProfile { code: code.clone(), reason };

        let mut table = [None; DifficultyTier::COUNT];
        for (tier, weight) in weights {
            if !(weight > 0.0 && weight <= 1.0) {
                return Err(invalid(format!("weight for {tier} must be in (0, 1], got {weight}")));
            }
            if table[tier.index()].replace(weight).is_some() {
                return Err(invalid(format!("weight for {tier} given twice")));
            }
        }
        if table.iter().all(Option::is_none) {
            return Err(invalid("no tier carries a weight".into()));
        }

        let profile = Self { code, weights: table, direction };
        let sum = profile.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warn!(target: "allocation", code = %profile.code, sum, "Profile weights do not sum to 1; planner will rebalance");
        }
        Ok(profile)
    }

    fn builtin(code: &str, direction: FallThroughDirection, weights: [Option<f64>; DifficultyTier::COUNT]) -> Self {
        Self { code: code.to_string(), weights, direction }
    }

    pub fn code(&self) -> &str { &self.code }

    pub fn direction(&self) -> FallThroughDirection { self.direction }

    /// Weight for a tier, `None` if the profile leaves the tier out.
    pub fn weight(&self, tier: DifficultyTier) -> Option<f64> { self.weights[tier.index()] }

    pub fn weights(&self) -> impl Iterator<Item = (DifficultyTier, f64)> + '_ {
        DifficultyTier::ALL
            .into_iter()
            .filter_map(|t| self.weight(t).map(|w| (t, w)))
    }

    pub fn weight_sum(&self) -> f64 { self.weights().map(|(_, w)| w).sum() }

    pub fn tiers_in_fall_through_order(&self) -> [DifficultyTier; DifficultyTier::COUNT] {
        self.direction.tiers()
    }

    pub fn last_tier_checked(&self) -> DifficultyTier { self.direction.checkpoint() }
}

/// Read-only table of profiles keyed by their stable code.
#[derive(Clone, Debug)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, DifficultyProfile>,
}

impl Default for ProfileRegistry {
    fn default() -> Self { Self::with_defaults() }
}

impl ProfileRegistry {
    pub fn empty() -> Self { Self { profiles: BTreeMap::new() } }

    /// Default registry. Existing callers depend on these exact values.
    pub fn with_defaults() -> Self {
        use FallThroughDirection::{BottomUp, TopDown};

        let mut reg = Self::empty();
        for p in [
            DifficultyProfile::builtin("easy_only", BottomUp, [Some(0.4), Some(0.6), None, None, None]),
            DifficultyProfile::builtin("hard_only", TopDown, [None, None, None, Some(0.6), Some(0.4)]),
            DifficultyProfile::builtin("balanced", TopDown, [Some(0.2); 5]),
            DifficultyProfile::builtin("mostly_easy", BottomUp, [Some(0.20), Some(0.30), Some(0.25), Some(0.15), Some(0.10)]),
            DifficultyProfile::builtin("mostly_hard", TopDown, [Some(0.10), Some(0.15), Some(0.25), Some(0.30), Some(0.20)]),
        ] {
            reg.profiles.insert(p.code.clone(), p);
        }
        reg
    }

    /// Register a profile, returning the one it replaced (if any).
    pub fn insert(&mut self, profile: DifficultyProfile) -> Option<DifficultyProfile> {
        debug!(target: "allocation", code = %profile.code, direction = ?profile.direction, "Registering difficulty profile");
        self.profiles.insert(profile.code.clone(), profile)
    }

    pub fn lookup(&self, code: &str) -> Result<&DifficultyProfile, AllocationError> {
        self.profiles
            .get(code)
            .ok_or_else(|| AllocationError::UnknownProfile(code.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DifficultyProfile> { self.profiles.values() }

    pub fn len(&self) -> usize { self.profiles.len() }
}
