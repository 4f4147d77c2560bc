//! Application state: profile registry, item pool, templates, sessions and submissions.
//!
//! The registry is built once from defaults plus optional TOML profiles and is
//! only read afterwards. Everything else lives in in-memory stores guarded by
//! async RwLocks. Allocation itself is synchronous and runs under a read guard
//! on the pool.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::allocator::{allocate, AllocationResult};
use crate::config::{load_pool_config_from_env, PoolConfig};
use crate::domain::{DifficultyTier, ItemId, ItemKind, Topic, TopicId};
use crate::error::{AppError, Result};
use crate::planner::{plan, AllocationPlan};
use crate::pool::ItemPool;
use crate::profiles::ProfileRegistry;
use crate::seeds::seed_pool;
use crate::session::{build_session, TemplateRule, TrainingSession, TrainingTemplate};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProfileRegistry>,
    pub pool: Arc<RwLock<ItemPool>>,
    pub templates: Arc<RwLock<HashMap<String, TrainingTemplate>>>,
    pub sessions: Arc<RwLock<HashMap<String, TrainingSession>>>,
    /// user -> items that user already submitted a solution for
    pub submissions: Arc<RwLock<HashMap<String, HashSet<ItemId>>>>,
}

impl AppState {
    /// Build state from env: load config, build the registry, seed the pool.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_pool_config_from_env().unwrap_or_default();
        Self::from_config(&cfg)
    }

    /// Configured topics replace the built-in demo bank when present.
    pub fn from_config(cfg: &PoolConfig) -> Self {
        let registry = cfg.build_registry();
        let mut pool = ItemPool::new();
        if cfg.topics.is_empty() {
            seed_pool(&mut pool);
        } else {
            cfg.populate(&mut pool);
        }

        for topic in pool.topics() {
            if let Ok(counts) = pool.count_by_tier(topic.id) {
                info!(target: "pool", topic = topic.id, name = %topic.name, ?counts, "Startup item inventory");
            }
        }
        info!(target: "quiz_allocator", profiles = registry.len(), items = pool.len(), "State initialized");

        Self::with_parts(registry, pool)
    }

    pub fn with_parts(registry: ProfileRegistry, pool: ItemPool) -> Self {
        Self {
            registry: Arc::new(registry),
            pool: Arc::new(RwLock::new(pool)),
            templates: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            submissions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn plan(&self, difficulty_profile: &str, amount: i64) -> Result<AllocationPlan> {
        let profile = self.registry.lookup(difficulty_profile)?;
        Ok(plan(profile, amount)?)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn add_topic(&self, name: &str, items_type: ItemKind) -> Topic {
        let mut pool = self.pool.write().await;
        let id = pool.add_topic(name, items_type);
        Topic { id, name: name.to_string(), items_type }
    }

    /// Add an item; `kind` defaults to the topic's item type.
    #[instrument(level = "debug", skip(self, text))]
    pub async fn add_item(&self, topic: TopicId, difficulty: DifficultyTier, kind: Option<ItemKind>, text: &str) -> Result<ItemId> {
        let mut pool = self.pool.write().await;
        let kind = match kind {
            Some(k) => k,
            None => pool.topic(topic)?.items_type,
        };
        Ok(pool.add_item(topic, difficulty, kind, text)?)
    }

    pub async fn topic_stats(&self, topic: TopicId) -> Result<[usize; DifficultyTier::COUNT]> {
        Ok(self.pool.read().await.count_by_tier(topic)?)
    }

    /// Allocate without persisting anything. Items already submitted by `user` are excluded.
    #[instrument(level = "info", skip(self))]
    pub async fn matching_items(
        &self,
        topic: TopicId,
        difficulty_profile: &str,
        amount: i64,
        user: Option<&str>,
    ) -> Result<(AllocationPlan, AllocationResult)> {
        let profile = self.registry.lookup(difficulty_profile)?;
        let plan = plan(profile, amount)?;

        let exclusions = match user {
            Some(u) => self.submissions.read().await.get(u).cloned().unwrap_or_default(),
            None => HashSet::new(),
        };

        let pool = self.pool.read().await;
        pool.topic(topic)?;
        let result = allocate(&*pool, topic, &plan, profile, &exclusions)?;
        if result.shortfall() > 0 {
            warn!(target: "allocation", topic, code = %difficulty_profile, shortfall = result.shortfall(), "Matching items under-fulfilled");
        }
        Ok((plan, result))
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn record_submission(&self, user: &str, topic: TopicId, item: ItemId) -> Result<()> {
        self.pool.read().await.item_in_topic(topic, item)?;
        self.submissions
            .write()
            .await
            .entry(user.to_string())
            .or_default()
            .insert(item);
        Ok(())
    }

    /// Validate rules against the registry and pool, then store the template.
    #[instrument(level = "info", skip(self, rules), fields(rule_count = rules.len()))]
    pub async fn create_template(&self, name: &str, rules: &[(TopicId, String, i64)]) -> Result<TrainingTemplate> {
        let built = {
            let pool = self.pool.read().await;
            let mut built = Vec::with_capacity(rules.len());
            for (topic, code, amount) in rules {
                pool.topic(*topic)?;
                built.push(TemplateRule::new(&self.registry, *topic, code, *amount)?);
            }
            built
        };

        let template = TrainingTemplate::new(name, built);
        self.templates
            .write()
            .await
            .insert(template.id.clone(), template.clone());
        info!(target: "allocation", template = %template.id, requested = template.requested(), "Training template created");
        Ok(template)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn create_session(&self, template_id: &str, trainee: &str) -> Result<TrainingSession> {
        let template = self
            .templates
            .read()
            .await
            .get(template_id)
            .cloned()
            .ok_or_else(|| AppError::UnknownTemplate(template_id.to_string()))?;

        let session = {
            let pool = self.pool.read().await;
            build_session(&*pool, &self.registry, &template, trainee, &HashSet::new())?
        };
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    pub async fn get_session(&self, id: &str) -> Result<TrainingSession> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::UnknownSession(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AllocationError, PoolError};

    fn empty_state() -> AppState {
        AppState::with_parts(ProfileRegistry::with_defaults(), ItemPool::new())
    }

    #[tokio::test]
    async fn test_matching_items_excludes_submissions() {
        let state = empty_state();
        let topic = state.add_topic("Loops", ItemKind::ProgrammingExercises).await;
        let a = state.add_item(topic.id, DifficultyTier::Easy, None, "a").await.unwrap();
        let b = state.add_item(topic.id, DifficultyTier::Easy, None, "b").await.unwrap();

        state.record_submission("alice", topic.id, a).await.unwrap();

        let (_, result) = state.matching_items(topic.id, "easy_only", 2, Some("alice")).await.unwrap();
        let ids: Vec<ItemId> = result.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![b]);
        assert_eq!(result.shortfall(), 1);

        let (_, result) = state.matching_items(topic.id, "easy_only", 2, Some("bob")).await.unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_matching_items_errors() {
        let state = empty_state();
        let topic = state.add_topic("Loops", ItemKind::ProgrammingExercises).await;

        let err = state.matching_items(topic.id, "nope", 2, None).await.unwrap_err();
        assert!(matches!(err, AppError::Allocation(AllocationError::UnknownProfile(_))));

        let err = state.matching_items(topic.id, "balanced", -2, None).await.unwrap_err();
        assert!(matches!(err, AppError::Allocation(AllocationError::InvalidTotalAmount(-2))));

        let err = state.matching_items(999, "balanced", 2, None).await.unwrap_err();
        assert!(matches!(err, AppError::Pool(PoolError::UnknownTopic(999))));
    }

    #[tokio::test]
    async fn test_submission_must_belong_to_topic() {
        let state = empty_state();
        let t1 = state.add_topic("A", ItemKind::Questions).await;
        let t2 = state.add_topic("B", ItemKind::Questions).await;
        let item = state.add_item(t1.id, DifficultyTier::Hard, None, "q").await.unwrap();
        assert!(state.record_submission("alice", t2.id, item).await.is_err());
    }

    #[tokio::test]
    async fn test_template_and_session_roundtrip() {
        let state = empty_state();
        let topic = state.add_topic("Arithmetic", ItemKind::Questions).await;
        for tier in DifficultyTier::ALL {
            state.add_item(topic.id, tier, None, "q").await.unwrap();
        }

        let template = state
            .create_template("weekly", &[(topic.id, "balanced".to_string(), 5)])
            .await
            .unwrap();
        assert_eq!(template.rules[0].plan.counts(), [1, 1, 1, 1, 1]);

        let session = state.create_session(&template.id, "student").await.unwrap();
        assert_eq!(session.entries.len(), 5);
        assert_eq!(state.get_session(&session.id).await.unwrap().entries.len(), 5);

        assert!(matches!(state.create_session("missing", "student").await, Err(AppError::UnknownTemplate(_))));
        assert!(matches!(state.get_session("missing").await, Err(AppError::UnknownSession(_))));
    }

    #[tokio::test]
    async fn test_template_rejects_unknown_topic() {
        let state = empty_state();
        let err = state
            .create_template("bad", &[(7, "balanced".to_string(), 5)])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Pool(PoolError::UnknownTopic(7))));
        assert!(state.templates.read().await.is_empty());
    }

    #[test]
    fn test_default_config_seeds_demo_bank() {
        let state = AppState::from_config(&PoolConfig::default());
        assert!(state.pool.try_read().unwrap().len() > 0);
        assert_eq!(state.registry.len(), 5);
    }
}
