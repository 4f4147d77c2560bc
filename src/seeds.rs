//! Built-in demo bank so the service is useful without external config.

use tracing::error;

use crate::domain::{DifficultyTier, ItemKind};
use crate::pool::ItemPool;

/// (topic name, item type, [(difficulty, text)])
type SeedTopic = (&'static str, ItemKind, &'static [(DifficultyTier, &'static str)]);

const SEED_TOPICS: &[SeedTopic] = &[
  (
    "Arithmetic",
    ItemKind::Questions,
    &[
      (DifficultyTier::VeryEasy, "What is 2 + 2?"),
      (DifficultyTier::VeryEasy, "What is 10 - 3?"),
      (DifficultyTier::Easy, "What is 7 * 8?"),
      (DifficultyTier::Easy, "What is 81 / 9?"),
      (DifficultyTier::Medium, "What is 15% of 240?"),
      (DifficultyTier::Medium, "Simplify 18/24."),
      (DifficultyTier::Hard, "What is the least common multiple of 12, 18 and 30?"),
      (DifficultyTier::VeryHard, "How many trailing zeros does 100! have?"),
    ],
  ),
  (
    "Loops",
    ItemKind::ProgrammingExercises,
    &[
      (DifficultyTier::VeryEasy, "Print the numbers from 1 to 10."),
      (DifficultyTier::Easy, "Return the sum of a list of integers."),
      (DifficultyTier::Medium, "Return the n-th Fibonacci number."),
      (DifficultyTier::Hard, "Return all primes below n."),
      (DifficultyTier::VeryHard, "Print every permutation of a string."),
    ],
  ),
];

pub fn seed_pool(pool: &mut ItemPool) {
  for (name, kind, items) in SEED_TOPICS {
    let topic = pool.add_topic(name, *kind);
    for (difficulty, text) in items.iter() {
      if let Err(e) = pool.add_item(topic, *difficulty, *kind, text) {
        error!(target: "pool", topic = %name, error = %e, "Skipping seed item");
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_seed_pool_populates_every_item() {
    let mut pool = ItemPool::new();
    seed_pool(&mut pool);
    let expected: usize = SEED_TOPICS.iter().map(|(_, _, items)| items.len()).sum();
    assert_eq!(pool.len(), expected);
    assert_eq!(pool.topics().count(), SEED_TOPICS.len());
  }
}
