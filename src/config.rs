//! Game configuration
//!
//! Every gameplay constant lives here with defaults matching the shipped
//! game. Files are RON or JSON, picked by extension; missing fields fall back
//! to the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::KindTable;
use crate::ai::{FollowTuning, Ranges, SearchOptions};
use crate::map::{MAP_HEIGHT, MAP_WIDTH};

/// Errors raised while loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse RON config: {0}")]
    Ron(String),

    #[error("failed to parse JSON config: {0}")]
    Json(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("unsupported config format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Ron,
    Json,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Ok(Format::Ron),
            Some("json") => Ok(Format::Json),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Per-enemy behavior shared by all kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentTuning {
    pub ranges: Ranges,
    pub movement: FollowTuning,
    pub search: SearchOptions,
    /// Seconds between accepted hits
    pub damage_cooldown: f32,
    /// Stun length after a hit
    pub hurt_duration: f32,
    /// Death sequence length before removal
    pub death_duration: f32,
}

impl AgentTuning {
    /// Use different perception radii
    #[must_use]
    pub fn with_ranges(mut self, ranges: Ranges) -> Self {
        self.ranges = ranges;
        self
    }

    /// Use different search options
    #[must_use]
    pub fn with_search(mut self, search: SearchOptions) -> Self {
        self.search = search;
        self
    }
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            ranges: Ranges::default(),
            movement: FollowTuning::default(),
            search: SearchOptions::default(),
            damage_cooldown: 0.5,
            hurt_duration: 0.3,
            death_duration: 1.0,
        }
    }
}

/// Player combat values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: i32,
    /// Seconds between accepted hits
    pub damage_cooldown: f32,
    /// Seconds without damage per point of regeneration
    pub heal_interval: f32,
    pub attack_damage: i32,
    /// How long a swing can land hits
    pub swing_duration: f32,
    /// Seconds between swings
    pub swing_cooldown: f32,
    /// Hit box width and height
    pub hitbox: Vec2,
    /// Center of the player at map start
    pub spawn: Vec2,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 10,
            damage_cooldown: 2.15,
            heal_interval: 5.0,
            attack_damage: 1,
            swing_duration: 0.2,
            swing_cooldown: 0.5,
            hitbox: Vec2::new(38.4, 51.2),
            spawn: Vec2::new(148.0, 164.0),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub agent: AgentTuning,
    pub player: PlayerTuning,
    pub kinds: KindTable,
    /// Directory holding `map_<n>.dat`
    pub maps_dir: PathBuf,
    /// Map loaded first
    pub first_map: u32,
    /// Map dimensions in tiles
    pub map_width: usize,
    pub map_height: usize,
    /// Enemies spawned per map
    pub max_enemies: usize,
    /// Random positions tried per enemy before giving up
    pub spawn_attempts: u32,
    /// Spawn corners stay this many pixels away from the right and bottom edges
    pub spawn_margin: f32,
    /// Fixed RNG seed; random when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            agent: AgentTuning::default(),
            player: PlayerTuning::default(),
            kinds: KindTable::default(),
            maps_dir: PathBuf::from("Assets/maps"),
            first_map: 1,
            map_width: MAP_WIDTH,
            map_height: MAP_HEIGHT,
            max_enemies: 5,
            spawn_attempts: 100,
            spawn_margin: 100.0,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load from a `.ron` or `.json` file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown extension,
    /// or fails to parse
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let content = fs::read_to_string(path)?;
        match format {
            Format::Ron => ron::from_str(&content).map_err(|e| ConfigError::Ron(e.to_string())),
            Format::Json => {
                serde_json::from_str(&content).map_err(|e| ConfigError::Json(e.to_string()))
            }
        }
    }

    /// Save to a `.ron` or `.json` file
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is unknown or the file cannot be written
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = match Format::of(path)? {
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Format::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };
        fs::write(path, content)?;
        Ok(())
    }

    /// Use a fixed RNG seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Read maps from a different directory
    #[must_use]
    pub fn with_maps_dir(mut self, maps_dir: impl Into<PathBuf>) -> Self {
        self.maps_dir = maps_dir.into();
        self
    }

    /// Spawn a different number of enemies per map
    #[must_use]
    pub fn with_max_enemies(mut self, max_enemies: usize) -> Self {
        self.max_enemies = max_enemies;
        self
    }

    /// Use different agent tuning
    #[must_use]
    pub fn with_agent(mut self, agent: AgentTuning) -> Self {
        self.agent = agent;
        self
    }
}
