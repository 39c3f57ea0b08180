//! Enemy AI for a tile-based 2D action game
//!
//! This crate provides:
//! - Tile passability grids and the persisted map format
//! - A* pathfinding with tile-center waypoints
//! - Steering with wall sliding, stuck detection and recovery
//! - A per-enemy state machine driving movement, combat and animation
//! - A level context that spawns, ticks and removes enemies

pub mod agent;
pub mod ai;
pub mod audio;
pub mod combat;
pub mod config;
pub mod core;
pub mod ecs;
pub mod level;
pub mod map;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agent::{Enemy, EnemyKind, KindTable, KindTuning};
    pub use crate::ai::{AgentState, Heuristic, PathFollower, Ranges, SearchOptions, find_path};
    pub use crate::audio::{DetectionTracker, MusicCue};
    pub use crate::combat::{Damageable, DamageOutcome, Hitbox, Player, Positioned};
    pub use crate::config::{AgentTuning, GameConfig, PlayerTuning};
    pub use crate::core::{EventQueue, GameEvent, Timer};
    pub use crate::ecs::World;
    pub use crate::level::Level;
    pub use crate::map::{Grid, MapError, MapManager, Passability, TileCoord};
    pub use glam::Vec2;
}
