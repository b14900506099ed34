//! Floor generation settings
//!
//! Supplied by the launcher, either from a level preset or a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SEARCH_BUDGET, MAX_PATH_ROOMS};
use crate::error::ConfigError;

/// Quotas and bounds for one generated floor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Shortest acceptable path, start and boss included
    pub min_rooms: usize,
    /// Longest acceptable path; also the search depth limit
    pub max_rooms: usize,
    pub min_puzzle_rooms: usize,
    pub min_combat_rooms: usize,
    /// Exactly one loot room when set, otherwise at most one
    pub require_loot: bool,
    /// Paths must end in a boss room
    pub require_boss: bool,
    pub seed: u64,
    /// Maximum depth-first expansions before the search stops early
    pub search_budget: u64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::for_level(1, 0)
    }
}

impl LevelConfig {
    /// Preset quotas per dungeon level
    pub fn for_level(level: u32, seed: u64) -> Self {
        let (min_rooms, max_rooms, min_puzzle_rooms, min_combat_rooms) = match level {
            2 => (7, 9, 3, 3),
            3 => (9, 11, 4, 4),
            _ => (5, 7, 2, 2),
        };

        Self {
            min_rooms,
            max_rooms,
            min_puzzle_rooms,
            min_combat_rooms,
            require_loot: true,
            require_boss: true,
            seed,
            search_budget: DEFAULT_SEARCH_BUDGET,
        }
    }

    /// Parse a JSON config; missing fields take the level 1 preset values
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Load a JSON config from disk
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json(&contents)
    }

    /// Check internal consistency of the bounds
    pub fn validate(&self) -> Result<(), String> {
        if self.max_rooms < 2 {
            return Err(format!("max_rooms must be at least 2, got {}", self.max_rooms));
        }
        if self.max_rooms > MAX_PATH_ROOMS {
            return Err(format!(
                "max_rooms must be at most {MAX_PATH_ROOMS}, got {}",
                self.max_rooms
            ));
        }
        if self.min_rooms > self.max_rooms {
            return Err(format!(
                "min_rooms ({}) exceeds max_rooms ({})",
                self.min_rooms, self.max_rooms
            ));
        }
        if self.search_budget == 0 {
            return Err("search_budget must be positive".to_string());
        }
        Ok(())
    }
}
