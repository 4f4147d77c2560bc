//! Public protocol structs for HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{DifficultyTier, FallThroughDirection, Item, ItemId, ItemKind, TopicId};
use crate::planner::AllocationPlan;
use crate::profiles::DifficultyProfile;

/// DTO for a registered difficulty profile.
#[derive(Debug, Serialize)]
pub struct ProfileOut {
    pub code: String,
    pub direction: FallThroughDirection,
    pub weights: BTreeMap<DifficultyTier, f64>,
}

pub fn profile_out(p: &DifficultyProfile) -> ProfileOut {
    ProfileOut {
        code: p.code().to_string(),
        direction: p.direction(),
        weights: p.weights().collect(),
    }
}

pub fn tier_counts(counts: [usize; DifficultyTier::COUNT]) -> BTreeMap<DifficultyTier, usize> {
    DifficultyTier::ALL.into_iter().map(|t| (t, counts[t.index()])).collect()
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    pub difficulty_profile: String,
    pub amount: i64,
}
#[derive(Serialize)]
pub struct PlanOut {
    pub difficulty_profile: String,
    pub amount: i64,
    pub plan: AllocationPlan,
}

#[derive(Debug, Deserialize)]
pub struct MatchingQuery {
    pub difficulty_profile: String,
    pub amount: i64,
    /// Items this user already submitted are left out.
    #[serde(default)]
    pub user: Option<String>,
}
#[derive(Serialize)]
pub struct MatchingOut {
    pub plan: AllocationPlan,
    pub requested: u64,
    pub shortfall: u64,
    pub items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
pub struct TopicIn {
    pub name: String,
    #[serde(default)]
    pub items_type: ItemKind,
}

#[derive(Debug, Deserialize)]
pub struct ItemIn {
    pub difficulty: DifficultyTier,
    #[serde(default)]
    pub kind: Option<ItemKind>,
    pub text: String,
}
#[derive(Serialize)]
pub struct ItemOut {
    pub id: ItemId,
}

#[derive(Serialize)]
pub struct TopicStatsOut {
    pub topic: TopicId,
    pub counts: BTreeMap<DifficultyTier, usize>,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionIn {
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub struct RuleIn {
    pub topic: TopicId,
    pub difficulty_profile: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct TemplateIn {
    #[serde(default)]
    pub name: String,
    pub rules: Vec<RuleIn>,
}

#[derive(Debug, Deserialize)]
pub struct SessionIn {
    pub template_id: String,
    pub trainee: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
