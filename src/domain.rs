//! Domain models: difficulty tiers, fall-through direction, topics and items.

use serde::{Deserialize, Serialize};

pub type TopicId = u64;
pub type ItemId = u64;

/// Five fixed difficulty levels, ordered from easiest to hardest.
/// The discriminant doubles as an array index (see `AllocationPlan`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
  VeryEasy = 0,
  Easy = 1,
  Medium = 2,
  Hard = 3,
  VeryHard = 4,
}

impl DifficultyTier {
  pub const COUNT: usize = 5;

  /// All tiers in ascending order.
  pub const ALL: [DifficultyTier; DifficultyTier::COUNT] = [
    DifficultyTier::VeryEasy,
    DifficultyTier::Easy,
    DifficultyTier::Medium,
    DifficultyTier::Hard,
    DifficultyTier::VeryHard,
  ];

  pub fn index(self) -> usize { self as usize }

  pub fn label(self) -> &'static str {
    match self {
      DifficultyTier::VeryEasy => "very_easy",
      DifficultyTier::Easy => "easy",
      DifficultyTier::Medium => "medium",
      DifficultyTier::Hard => "hard",
      DifficultyTier::VeryHard => "very_hard",
    }
  }
}

impl std::fmt::Display for DifficultyTier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.label()) }
}

/// Which end of the tier range a traversal starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallThroughDirection {
  /// VeryEasy first, moving toward VeryHard.
  BottomUp,
  /// VeryHard first, moving toward VeryEasy.
  TopDown,
}

/// Topics hold either questions or programming exercises, never both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
  Questions,
  ProgrammingExercises,
}

impl Default for ItemKind {
  fn default() -> Self { ItemKind::Questions }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Topic {
  pub id: TopicId,
  pub name: String,
  pub items_type: ItemKind,
}

/// A gradable item (question or programming exercise) in a topic's pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
  pub id: ItemId,
  pub topic: TopicId,
  pub difficulty: DifficultyTier,
  pub kind: ItemKind,
  #[serde(default)] pub text: String,
}
