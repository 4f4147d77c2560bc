//! Item allocator: realizes an `AllocationPlan` against a finite candidate pool.
//!
//! Tiers are visited in the profile's fall-through order. Whatever a tier cannot
//! supply is carried into the next tier's request. Reaching the checkpoint tier
//! with nothing outstanding ends the run; otherwise one more cycle is made in
//! which every tier is asked only for the outstanding carry. After the second
//! cycle the run ends regardless, possibly short of the planned total.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::domain::{DifficultyTier, Item, ItemId, TopicId};
use crate::planner::AllocationPlan;
use crate::profiles::DifficultyProfile;

/// Anything that can hand out random, not-yet-excluded items for a topic and tier.
pub trait CandidateSource {
    type Error;

    /// Return at most `limit` distinct items of `(topic, tier)` whose ids are not in `exclude`.
    fn query(
        &self,
        topic: TopicId,
        tier: DifficultyTier,
        exclude: &HashSet<ItemId>,
        limit: usize,
    ) -> Result<Vec<Item>, Self::Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
    First,
    Second,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    AwaitingTier { pass: Pass, step: usize },
    Done,
}

/// Items in draw order. Draw order becomes the session position order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AllocationResult {
    pub items: Vec<Item>,
    pub requested: u64,
}

impl AllocationResult {
    pub fn len(&self) -> usize { self.items.len() }

    /// How many planned items the pool could not supply.
    pub fn shortfall(&self) -> u64 { self.requested.saturating_sub(self.items.len() as u64) }
}

#[instrument(level = "debug", skip(source, plan, profile, exclusions), fields(code = %profile.code(), planned = plan.total()))]
pub fn allocate<S: CandidateSource>(
    source: &S,
    topic: TopicId,
    plan: &AllocationPlan,
    profile: &DifficultyProfile,
    exclusions: &HashSet<ItemId>,
) -> Result<AllocationResult, S::Error> {
    let order = profile.tiers_in_fall_through_order();
    let checkpoint = profile.last_tier_checked();

    let mut excluded = exclusions.clone();
    let mut selected: Vec<Item> = Vec::new();
    let mut carry: u64 = 0;
    let mut state = State::AwaitingTier { pass: Pass::First, step: 0 };

    while let State::AwaitingTier { pass, step } = state {
        let tier = order[step];
        let own = match pass {
            Pass::First => u64::from(plan[tier]),
            Pass::Second => 0,
        };
        let requested = own + carry;

        let drawn = if requested == 0 {
            0
        } else {
            draw(source, topic, tier, requested, &mut excluded, &mut selected)?
        };
        carry = requested - drawn;
        debug!(target: "allocation", ?pass, %tier, requested, drawn, carry, "Tier visited");

        state = if tier == checkpoint {
            match (pass, carry) {
                (_, 0) => State::Done,
                (Pass::First, _) => State::AwaitingTier { pass: Pass::Second, step: 0 },
                (Pass::Second, _) => {
                    warn!(target: "allocation", topic, code = %profile.code(), shortfall = carry, "Pool exhausted; returning fewer items than planned");
                    State::Done
                }
            }
        } else {
            debug_assert!(step + 1 < order.len(), "checkpoint must close every cycle");
            State::AwaitingTier { pass, step: step + 1 }
        };
    }

    Ok(AllocationResult { items: selected, requested: plan.total() })
}

/// Draw up to `requested` items for one tier, returning how many were kept.
/// Ids already excluded and anything past `requested` are dropped, so a
/// misbehaving source cannot break the no-duplicate guarantee.
fn draw<S: CandidateSource>(
    source: &S,
    topic: TopicId,
    tier: DifficultyTier,
    requested: u64,
    excluded: &mut HashSet<ItemId>,
    selected: &mut Vec<Item>,
) -> Result<u64, S::Error> {
    let limit = usize::try_from(requested).unwrap_or(usize::MAX);
    let batch = source.query(topic, tier, excluded, limit)?;

    let mut kept: u64 = 0;
    for item in batch {
        if kept == requested {
            warn!(target: "allocation", topic, %tier, limit, "Candidate source returned more than requested");
            break;
        }
        if !excluded.insert(item.id) {
            warn!(target: "allocation", topic, %tier, id = item.id, "Candidate source returned an excluded item");
            continue;
        }
        selected.push(item);
        kept += 1;
    }
    Ok(kept)
}
