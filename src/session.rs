//! Training templates and the sessions built from them.
//!
//! A template is a list of rules `(topic, profile, amount)`. The per-tier plan
//! of a rule is computed once when the rule is created. Building a session
//! allocates every rule in order and numbers the drawn items by position.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::allocator::{allocate, CandidateSource};
use crate::domain::{Item, ItemId, TopicId};
use crate::error::{AllocationError, AppError, Result};
use crate::planner::{plan, AllocationPlan};
use crate::profiles::ProfileRegistry;

#[derive(Clone, Debug, Serialize)]
pub struct TemplateRule {
    pub topic: TopicId,
    pub difficulty_profile: String,
    pub amount: u32,
    pub plan: AllocationPlan,
}

impl TemplateRule {
    pub fn new(registry: &ProfileRegistry, topic: TopicId, difficulty_profile: &str, amount: i64) -> std::result::Result<Self, AllocationError> {
        let profile = registry.lookup(difficulty_profile)?;
        let plan = plan(profile, amount)?;
        Ok(Self {
            topic,
            difficulty_profile: difficulty_profile.to_string(),
            amount: plan.total() as u32,
            plan,
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TrainingTemplate {
    pub id: String,
    pub name: String,
    pub rules: Vec<TemplateRule>,
}

impl TrainingTemplate {
    pub fn new(name: impl Into<String>, rules: Vec<TemplateRule>) -> Self {
        Self { id: Uuid::new_v4().to_string(), name: name.into(), rules }
    }

    pub fn requested(&self) -> u64 { self.rules.iter().map(|r| r.plan.total()).sum() }
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionEntry {
    pub position: usize,
    pub item: Item,
}

#[derive(Clone, Debug, Serialize)]
pub struct TrainingSession {
    pub id: String,
    pub trainee: String,
    pub template_id: String,
    pub requested: u64,
    pub entries: Vec<SessionEntry>,
}

impl TrainingSession {
    pub fn shortfall(&self) -> u64 { self.requested.saturating_sub(self.entries.len() as u64) }
}

/// Allocate every rule of `template` and assign zero-based positions in draw order.
///
/// Items drawn for earlier rules are excluded from later ones, so a session
/// never holds the same item twice even when two rules share a topic.
#[instrument(level = "info", skip(source, registry, template, exclusions), fields(template = %template.id, rules = template.rules.len()))]
pub fn build_session<S>(
    source: &S,
    registry: &ProfileRegistry,
    template: &TrainingTemplate,
    trainee: &str,
    exclusions: &HashSet<ItemId>,
) -> Result<TrainingSession>
where
    S: CandidateSource,
    AppError: From<S::Error>,
{
    let mut excluded = exclusions.clone();
    let mut entries = Vec::new();

    for rule in &template.rules {
        let profile = registry.lookup(&rule.difficulty_profile)?;
        let result = allocate(source, rule.topic, &rule.plan, profile, &excluded)?;
        if result.shortfall() > 0 {
            warn!(target: "allocation", topic = rule.topic, code = %rule.difficulty_profile, shortfall = result.shortfall(), "Rule under-fulfilled");
        }
        for item in result.items {
            excluded.insert(item.id);
            entries.push(SessionEntry { position: entries.len(), item });
        }
    }

    let session = TrainingSession {
        id: Uuid::new_v4().to_string(),
        trainee: trainee.to_string(),
        template_id: template.id.clone(),
        requested: template.requested(),
        entries,
    };
    info!(target: "allocation", session = %session.id, %trainee, items = session.entries.len(), requested = session.requested, "Training session built");
    Ok(session)
}
