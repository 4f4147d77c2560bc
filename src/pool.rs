//! In-memory item pool: topics, items, and a by-(topic, tier) index.
//!
//! Drawing is non-destructive sampling; items stay in the pool after being
//! handed out, so concurrent sessions may receive overlapping items.

use std::collections::{BTreeMap, HashMap, HashSet};

use rand::seq::SliceRandom;
use tracing::{debug, info, instrument};

use crate::allocator::CandidateSource;
use crate::domain::{DifficultyTier, Item, ItemId, ItemKind, Topic, TopicId};
use crate::error::PoolError;

#[derive(Debug, Default)]
pub struct ItemPool {
    topics: BTreeMap<TopicId, Topic>,
    items: HashMap<ItemId, Item>,
    by_tier: HashMap<(TopicId, DifficultyTier), Vec<ItemId>>,
    next_topic: TopicId,
    next_item: ItemId,
}

impl ItemPool {
    pub fn new() -> Self { Self { next_topic: 1, next_item: 1, ..Default::default() } }

    #[instrument(level = "debug", skip(self))]
    pub fn add_topic(&mut self, name: &str, items_type: ItemKind) -> TopicId {
        let id = self.next_topic;
        self.next_topic += 1;
        self.topics.insert(id, Topic { id, name: name.to_string(), items_type });
        info!(target: "pool", topic = id, %name, ?items_type, "Topic created");
        id
    }

    /// Add an item to a topic. The item kind must match the topic's item type.
    #[instrument(level = "debug", skip(self, text))]
    pub fn add_item(&mut self, topic: TopicId, difficulty: DifficultyTier, kind: ItemKind, text: &str) -> Result<ItemId, PoolError> {
        let t = self.topics.get(&topic).ok_or(PoolError::UnknownTopic(topic))?;
        if t.items_type != kind {
            return Err(PoolError::KindMismatch { topic, expected: t.items_type, got: kind });
        }

        let id = self.next_item;
        self.next_item += 1;
        self.items.insert(id, Item { id, topic, difficulty, kind, text: text.to_string() });
        self.by_tier.entry((topic, difficulty)).or_default().push(id);
        debug!(target: "pool", topic, id, %difficulty, "Item added");
        Ok(id)
    }

    pub fn topic(&self, topic: TopicId) -> Result<&Topic, PoolError> {
        self.topics.get(&topic).ok_or(PoolError::UnknownTopic(topic))
    }

    pub fn topics(&self) -> impl Iterator<Item = &Topic> { self.topics.values() }

    /// Look up an item and check that it belongs to `topic`.
    pub fn item_in_topic(&self, topic: TopicId, item: ItemId) -> Result<&Item, PoolError> {
        self.topic(topic)?;
        self.items
            .get(&item)
            .filter(|i| i.topic == topic)
            .ok_or(PoolError::UnknownItem { topic, item })
    }

    pub fn count_by_tier(&self, topic: TopicId) -> Result<[usize; DifficultyTier::COUNT], PoolError> {
        self.topic(topic)?;
        let mut counts = [0; DifficultyTier::COUNT];
        for tier in DifficultyTier::ALL {
            counts[tier.index()] = self.by_tier.get(&(topic, tier)).map_or(0, Vec::len);
        }
        Ok(counts)
    }

    pub fn len(&self) -> usize { self.items.len() }
}

impl CandidateSource for ItemPool {
    type Error = std::convert::Infallible;

    fn query(&self, topic: TopicId, tier: DifficultyTier, exclude: &HashSet<ItemId>, limit: usize) -> Result<Vec<Item>, Self::Error> {
        let eligible: Vec<ItemId> = self
            .by_tier
            .get(&(topic, tier))
            .map(|ids| ids.iter().copied().filter(|id| !exclude.contains(id)).collect())
            .unwrap_or_default();

        let mut rng = rand::thread_rng();
        Ok(eligible
            .choose_multiple(&mut rng, limit)
            .filter_map(|id| self.items.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DifficultyTier::*;

    fn pool_with_topic() -> (ItemPool, TopicId) {
        let mut pool = ItemPool::new();
        let topic = pool.add_topic("Trigonometry", ItemKind::Questions);
        (pool, topic)
    }

    #[test]
    fn test_add_and_count() {
        let (mut pool, topic) = pool_with_topic();
        for (i, tier) in [Easy, Easy, Hard].into_iter().enumerate() {
            pool.add_item(topic, tier, ItemKind::Questions, &format!("q{i}")).unwrap();
        }
        assert_eq!(pool.count_by_tier(topic).unwrap(), [0, 2, 0, 1, 0]);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_kind_must_match_topic() {
        let (mut pool, topic) = pool_with_topic();
        let err = pool.add_item(topic, Easy, ItemKind::ProgrammingExercises, "fn main() {}").unwrap_err();
        assert_eq!(
            err,
            PoolError::KindMismatch { topic, expected: ItemKind::Questions, got: ItemKind::ProgrammingExercises }
        );
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn test_unknown_topic() {
        let mut pool = ItemPool::new();
        assert_eq!(pool.add_item(42, Easy, ItemKind::Questions, "x"), Err(PoolError::UnknownTopic(42)));
        assert_eq!(pool.count_by_tier(42), Err(PoolError::UnknownTopic(42)));
    }

    #[test]
    fn test_item_in_topic() {
        let (mut pool, topic) = pool_with_topic();
        let other = pool.add_topic("Logarithms", ItemKind::Questions);
        let id = pool.add_item(topic, Medium, ItemKind::Questions, "sin(x)").unwrap();
        assert_eq!(pool.item_in_topic(topic, id).unwrap().text, "sin(x)");
        assert_eq!(pool.item_in_topic(other, id), Err(PoolError::UnknownItem { topic: other, item: id }));
    }

    #[test]
    fn test_query_respects_limit_and_exclusions() {
        let (mut pool, topic) = pool_with_topic();
        let ids: Vec<ItemId> = (0..6)
            .map(|i| pool.add_item(topic, Medium, ItemKind::Questions, &format!("q{i}")).unwrap())
            .collect();
        let exclude: HashSet<ItemId> = ids[..4].iter().copied().collect();

        let got = pool.query(topic, Medium, &exclude, 10).unwrap();
        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|i| !exclude.contains(&i.id)));

        let got = pool.query(topic, Medium, &HashSet::new(), 3).unwrap();
        assert_eq!(got.len(), 3);
        let distinct: HashSet<ItemId> = got.iter().map(|i| i.id).collect();
        assert_eq!(distinct.len(), 3);

        assert!(pool.query(topic, VeryHard, &HashSet::new(), 3).unwrap().is_empty());
    }
}
