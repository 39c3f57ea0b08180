//! Level context
//!
//! Owns everything one map needs: the map provider, the enemy world, the
//! player, the RNG and the event queue. A map transition goes through
//! `&mut Level`, so no enemy can observe a half-swapped grid.

use glam::Vec2;
use hecs::Entity;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::agent::{Enemy, EnemyKind, TickContext};
use crate::audio::{DetectionTracker, MusicCue};
use crate::combat::{Damageable, Player, Positioned, exchange_blows};
use crate::config::GameConfig;
use crate::core::{EventQueue, GameEvent};
use crate::ecs::World;
use crate::map::{Grid, MapError, MapManager, Passability};

/// One running map with its enemies and the player
pub struct Level {
    config: GameConfig,
    maps: MapManager,
    world: World,
    player: Player,
    rng: StdRng,
    events: EventQueue,
    music: DetectionTracker,
    cleared: bool,
}

impl Level {
    fn new(config: GameConfig, maps: MapManager) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            player: Player::new(config.player),
            config,
            maps,
            world: World::new(),
            rng,
            events: EventQueue::new(),
            music: DetectionTracker::new(),
            cleared: false,
        }
    }

    /// Start on a prebuilt grid numbered `index`, without touching the file
    /// system
    #[must_use]
    pub fn with_grid(config: GameConfig, grid: Grid, index: u32) -> Self {
        let mut level = Self::new(config, MapManager::from_grid(grid, index));
        level.enter_map();
        level
    }

    /// Start on `config.first_map` from `config.maps_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the first map cannot be loaded
    pub fn load(config: GameConfig) -> Result<Self, MapError> {
        let maps = MapManager::with_size(&config.maps_dir, config.map_width, config.map_height);
        let first = config.first_map;
        let mut level = Self::new(config, maps);
        level.load_map(first)?;
        Ok(level)
    }

    /// Switch to map `index` and respawn.
    ///
    /// # Errors
    ///
    /// Returns an error if the map cannot be loaded; the current map and its
    /// enemies are kept in that case.
    pub fn load_map(&mut self, index: u32) -> Result<(), MapError> {
        self.maps.load_map(index)?;
        self.enter_map();
        Ok(())
    }

    /// Load the map after the current one
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotFound` after the last map
    pub fn advance(&mut self) -> Result<(), MapError> {
        self.load_map(self.maps.current_map_index() + 1)
    }

    fn enter_map(&mut self) {
        self.world.clear();
        self.events.clear();
        self.music.reset();
        self.player.respawn();
        self.cleared = false;

        let index = self.maps.current_map_index();
        info!("Entering map {index} ({})", MapManager::tilesheet_for(index));
        self.events.push(GameEvent::MapLoaded { index });
        self.spawn_enemies();
    }

    /// Spawn up to `max_enemies` of the map's kind at random passable spots.
    /// Returns how many were placed.
    pub fn spawn_enemies(&mut self) -> usize {
        let kind = EnemyKind::for_map(self.maps.current_map_index());
        let half_extent = self.config.kinds.get(kind).half_extent();

        let mut spawned = 0;
        for _ in 0..self.config.max_enemies {
            match self.find_spawn_point(half_extent) {
                Some(position) => {
                    self.spawn_enemy_at(kind, position);
                    spawned += 1;
                }
                None => warn!(
                    "No passable spawn point for {} after {} attempts",
                    kind.name(),
                    self.config.spawn_attempts
                ),
            }
        }
        info!("Spawned {spawned} {}(s)", kind.name());
        spawned
    }

    /// Random sprite corners inside the spawn margin; the first whose sprite
    /// center is passable wins
    fn find_spawn_point(&mut self, half_extent: f32) -> Option<Vec2> {
        let size = self.maps.grid().pixel_size();
        let span_x = ((size.x - self.config.spawn_margin) as i32).max(1);
        let span_y = ((size.y - self.config.spawn_margin) as i32).max(1);

        for _ in 0..self.config.spawn_attempts {
            let corner = Vec2::new(
                self.rng.random_range(0..span_x) as f32,
                self.rng.random_range(0..span_y) as f32,
            );
            let center = corner + Vec2::splat(half_extent);
            if self.maps.is_point_passable(center) {
                return Some(center);
            }
        }
        None
    }

    /// Place one enemy centered at `position`
    pub fn spawn_enemy_at(&mut self, kind: EnemyKind, position: Vec2) -> Entity {
        let tuning = self.config.kinds.get(kind).clone();
        let enemy = Enemy::new(kind, tuning, self.config.agent, position);
        let entity = self.world.spawn_enemy(enemy);
        self.cleared = false;
        self.events.push(GameEvent::EnemySpawned {
            entity,
            kind,
            position,
        });
        entity
    }

    /// Run one simulation tick
    pub fn tick(&mut self, delta_time: f32) {
        self.player.tick(delta_time, &mut self.events);
        self.world.reap_finished();

        let target = self.player.position();
        for (entity, enemy) in self.world.enemies_mut() {
            let mut ctx = TickContext {
                grid: &self.maps,
                target,
                delta_time,
                rng: &mut self.rng,
                events: &mut self.events,
                entity,
            };
            enemy.tick(&mut ctx);
            exchange_blows(&mut self.player, enemy, entity, &mut self.events);
        }

        if !self.cleared && self.world.enemy_count() == 0 {
            self.cleared = true;
            let index = self.maps.current_map_index();
            info!("Map {index} cleared");
            self.events.push(GameEvent::LevelCleared { index });
        }

        self.events.swap();
        for event in self.events.iter() {
            self.music.observe(event);
        }
    }

    /// Events produced by the last tick
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub fn maps(&self) -> &MapManager {
        &self.maps
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        self.maps.grid()
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn current_map_index(&self) -> u32 {
        self.maps.current_map_index()
    }

    /// Every enemy is gone
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        !self.player.is_alive()
    }

    /// Track that should be playing
    #[must_use]
    pub fn music_cue(&self) -> MusicCue {
        self.music.cue()
    }

    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.world.enemy_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AgentState;
    use crate::combat::DamageOutcome;
    use crate::map::{TextureRect, TileMapFile, TileRecord};

    const DT: f32 = 1.0 / 60.0;

    fn config() -> GameConfig {
        GameConfig::default().with_seed(7)
    }

    fn processed(level: &Level) -> Vec<GameEvent> {
        level.events().iter().cloned().collect()
    }

    #[test]
    fn test_spawns_on_passable_tiles() {
        let mut grid = Grid::new(30, 20);
        for y in 0..20 {
            for x in 0..15 {
                grid.set_passable(x, y, false);
            }
        }
        let level = Level::with_grid(config(), grid, 1);

        assert_eq!(level.enemy_count(), 5);
        for entity in level.world().enemy_entities() {
            let enemy = level.world().enemy(entity).unwrap();
            assert_eq!(enemy.kind(), EnemyKind::Slime);
            assert!(level.maps().is_point_passable(enemy.position()));
            // Spawn corners stay inside the margin
            assert!(enemy.position().x < 1440.0 - 100.0 + 64.0);
        }
    }

    #[test]
    fn test_first_tick_reports_spawns() {
        let mut level = Level::with_grid(config().with_max_enemies(3), Grid::new(30, 20), 1);
        level.tick(DT);

        let events = processed(&level);
        assert_eq!(events[0], GameEvent::MapLoaded { index: 1 });
        let spawned = events
            .iter()
            .filter(|event| matches!(event, GameEvent::EnemySpawned { .. }))
            .count();
        assert_eq!(spawned, 3);
    }

    #[test]
    fn test_map_two_spawns_goblins() {
        let mut level = Level::with_grid(config(), Grid::new(30, 20), 2);
        assert_eq!(level.enemy_count(), 5);
        for (_, enemy) in level.world_mut().enemies_mut() {
            assert_eq!(enemy.kind(), EnemyKind::Goblin);
        }
    }

    #[test]
    fn test_blocked_map_spawns_nothing_and_clears_once() {
        let mut grid = Grid::new(30, 20);
        for y in 0..20 {
            for x in 0..30 {
                grid.set_passable(x, y, false);
            }
        }
        let mut level = Level::with_grid(config(), grid, 1);
        assert_eq!(level.enemy_count(), 0);

        level.tick(DT);
        assert!(level.is_cleared());
        assert!(processed(&level).contains(&GameEvent::LevelCleared { index: 1 }));

        level.tick(DT);
        assert!(!processed(&level).contains(&GameEvent::LevelCleared { index: 1 }));
    }

    #[test]
    fn test_killing_every_enemy_clears_level() {
        let mut level = Level::with_grid(config().with_max_enemies(2), Grid::new(30, 20), 1);
        let entities = level.world().enemy_entities();
        for entity in entities {
            let outcome = level.world_mut().enemy_mut(entity).unwrap().take_damage(10);
            assert_eq!(outcome, DamageOutcome::Killed);
        }

        level.tick(0.5);
        assert_eq!(level.enemy_count(), 2);
        assert!(!level.is_cleared());

        level.tick(0.6);
        level.tick(DT);
        assert_eq!(level.enemy_count(), 0);
        assert!(level.is_cleared());
        assert!(processed(&level).contains(&GameEvent::LevelCleared { index: 1 }));
    }

    #[test]
    fn test_detection_switches_music() {
        let mut level = Level::with_grid(config().with_max_enemies(0), Grid::new(30, 20), 1);
        let spawn = level.player().position();
        let entity = level.spawn_enemy_at(EnemyKind::Slime, spawn + Vec2::new(150.0, 0.0));

        level.tick(DT);
        assert!(processed(&level).contains(&GameEvent::DetectionBegan { entity }));
        assert_eq!(level.music_cue(), MusicCue::Critical);

        level.player_mut().set_position(spawn + Vec2::new(900.0, 700.0));
        level.tick(DT);
        assert!(processed(&level).contains(&GameEvent::DetectionEnded { entity }));
        assert_eq!(level.music_cue(), MusicCue::Background);
    }

    #[test]
    fn test_attacking_enemy_damages_player() {
        let mut level = Level::with_grid(config().with_max_enemies(0), Grid::new(30, 20), 1);
        let spawn = level.player().position();
        let entity = level.spawn_enemy_at(EnemyKind::Slime, spawn + Vec2::new(30.0, 0.0));

        level.tick(DT);
        assert_eq!(
            level.world().enemy(entity).unwrap().state(),
            AgentState::Attack
        );
        assert_eq!(level.player().health(), 9);
        assert!(processed(&level).contains(&GameEvent::PlayerDamaged {
            source: entity,
            amount: 1,
            remaining: 9
        }));
    }

    #[test]
    fn test_advance_through_map_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config().with_maps_dir(dir.path()).with_max_enemies(2);
        config.map_width = 20;
        config.map_height = 15;

        let manager = MapManager::with_size(dir.path(), 20, 15);
        let mut map = TileMapFile::new(20, 15);
        map.set_tile(
            0,
            0,
            TileRecord::Placed {
                rect: TextureRect {
                    x: 0,
                    y: 0,
                    w: 16,
                    h: 16,
                },
                passable: false,
            },
        );
        manager.save_map(1, &map).unwrap();
        manager.save_map(2, &TileMapFile::new(20, 15)).unwrap();

        let mut level = Level::load(config).unwrap();
        assert_eq!(level.current_map_index(), 1);
        assert!(!level.grid().is_passable(0, 0));
        assert_eq!(level.enemy_count(), 2);

        level.player_mut().set_position(Vec2::new(500.0, 500.0));
        level.advance().unwrap();
        assert_eq!(level.current_map_index(), 2);
        assert!(level.grid().is_passable(0, 0));
        assert_eq!(level.player().position(), Vec2::new(148.0, 164.0));
        assert_eq!(level.enemy_count(), 2);
        for (_, enemy) in level.world_mut().enemies_mut() {
            assert_eq!(enemy.kind(), EnemyKind::Goblin);
        }

        let err = level.advance().unwrap_err();
        assert!(matches!(err, MapError::NotFound { .. }));
        assert_eq!(level.current_map_index(), 2);
        assert_eq!(level.enemy_count(), 2);
    }

    #[test]
    fn test_seeded_levels_match() {
        let a = Level::with_grid(config(), Grid::new(30, 20), 1);
        let b = Level::with_grid(config(), Grid::new(30, 20), 1);
        let positions = |level: &Level| -> Vec<Vec2> {
            level
                .world()
                .enemy_entities()
                .into_iter()
                .map(|entity| level.world().enemy(entity).unwrap().position())
                .collect()
        };
        assert_eq!(positions(&a), positions(&b));
    }
}
