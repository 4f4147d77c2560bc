//! Loading pool configuration (extra difficulty profiles + optional item bank) from TOML.
//!
//! Example:
//! ```toml
//! [[profiles]]
//! code = "medium_heavy"
//! direction = "bottom_up"
//! weights = { easy = 0.25, medium = 0.5, hard = 0.25 }
//!
//! [[topics]]
//! name = "Trigonometry"
//! items_type = "questions"
//! items = [
//!   { difficulty = "easy", text = "sin(0) = ?" },
//! ]
//! ```

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::{DifficultyTier, FallThroughDirection, ItemKind};
use crate::pool::ItemPool;
use crate::profiles::{DifficultyProfile, ProfileRegistry};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PoolConfig {
  #[serde(default)]
  pub profiles: Vec<ProfileCfg>,
  #[serde(default)]
  pub topics: Vec<TopicCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProfileCfg {
  pub code: String,
  pub direction: FallThroughDirection,
  pub weights: WeightsCfg,
}

/// Tier weights; leave a tier out to exclude it from the profile.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct WeightsCfg {
  #[serde(default)] pub very_easy: Option<f64>,
  #[serde(default)] pub easy: Option<f64>,
  #[serde(default)] pub medium: Option<f64>,
  #[serde(default)] pub hard: Option<f64>,
  #[serde(default)] pub very_hard: Option<f64>,
}

impl WeightsCfg {
  pub fn pairs(&self) -> Vec<(DifficultyTier, f64)> {
    [self.very_easy, self.easy, self.medium, self.hard, self.very_hard]
      .into_iter()
      .zip(DifficultyTier::ALL)
      .filter_map(|(w, t)| w.map(|w| (t, w)))
      .collect()
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TopicCfg {
  pub name: String,
  #[serde(default)] pub items_type: ItemKind,
  #[serde(default)] pub items: Vec<ItemCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ItemCfg {
  pub difficulty: DifficultyTier,
  pub text: String,
}

impl PoolConfig {
  pub fn parse(s: &str) -> Result<Self, toml::de::Error> { toml::from_str(s) }

  /// Default registry extended with configured profiles. Invalid entries are logged and skipped.
  pub fn build_registry(&self) -> ProfileRegistry {
    let mut reg = ProfileRegistry::with_defaults();
    for p in &self.profiles {
      match DifficultyProfile::new(p.code.clone(), p.direction, p.weights.pairs()) {
        Ok(profile) => {
          if reg.insert(profile).is_some() {
            warn!(target: "quiz_allocator", code = %p.code, "Config profile overrides a built-in profile");
          }
        }
        Err(e) => error!(target: "quiz_allocator", code = %p.code, error = %e, "Skipping invalid profile"),
      }
    }
    reg
  }

  /// Create configured topics and their items in `pool`.
  pub fn populate(&self, pool: &mut ItemPool) {
    for t in &self.topics {
      let topic = pool.add_topic(&t.name, t.items_type);
      for item in &t.items {
        if let Err(e) = pool.add_item(topic, item.difficulty, t.items_type, &item.text) {
          error!(target: "pool", topic = %t.name, error = %e, "Skipping bank item");
        }
      }
    }
  }
}

/// Attempt to load `PoolConfig` from POOL_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_pool_config_from_env() -> Option<PoolConfig> {
  let path = std::env::var("POOL_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match PoolConfig::parse(&s) {
      Ok(cfg) => {
        info!(target: "quiz_allocator", %path, profiles = cfg.profiles.len(), topics = cfg.topics.len(), "Loaded pool config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quiz_allocator", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quiz_allocator", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
