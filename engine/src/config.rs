// ═══════════════════════════════════════════════════════════════════════
// Engine configuration
// ═══════════════════════════════════════════════════════════════════════

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for one game (and for every game of a tournament).
/// Every field has a default, so a config file only lists overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub seed: u64,
    pub initial_armies: u32,
    pub starting_cards: usize,
    pub cards_per_kind: usize,
    pub reinforcement_card_armies: u32,
    /// Chance per combat round that an attacking unit kills a defender.
    pub attacker_kill_chance: f64,
    /// Chance per combat round that a defending unit kills an attacker.
    pub defender_kill_chance: f64,
    /// Safety cap on issue-orders passes per phase.
    pub max_issue_passes: usize,
    /// Turn ceiling for a non-tournament game; reaching it is a draw.
    pub max_turns: u32,
    pub min_players: usize,
    pub max_players: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            seed: 42,
            initial_armies: 50,
            starting_cards: 2,
            cards_per_kind: 5,
            reinforcement_card_armies: 5,
            attacker_kill_chance: 0.6,
            defender_kill_chance: 0.7,
            max_issue_passes: 1000,
            max_turns: 500,
            min_players: 2,
            max_players: 6,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, p) in [
            ("attacker_kill_chance", self.attacker_kill_chance),
            ("defender_kill_chance", self.defender_kill_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!("{} must be within [0, 1], got {}", name, p)));
            }
        }
        if self.attacker_kill_chance + self.defender_kill_chance <= 0.0 {
            return Err(ConfigError::Invalid(
                "attacker_kill_chance and defender_kill_chance cannot both be 0".into(),
            ));
        }
        if self.max_issue_passes == 0 {
            return Err(ConfigError::Invalid("max_issue_passes must be positive".into()));
        }
        if self.max_turns == 0 {
            return Err(ConfigError::Invalid("max_turns must be positive".into()));
        }
        if self.min_players < 2 || self.min_players > self.max_players {
            return Err(ConfigError::Invalid(format!(
                "player range {}..={} is not usable",
                self.min_players, self.max_players
            )));
        }
        Ok(())
    }
}
