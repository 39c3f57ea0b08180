//! Combat
//!
//! Hit boxes, health with hit cooldowns, and the per-tick exchange of blows
//! between the player and one enemy. Every accepted hit is reported on the
//! event queue.

use glam::Vec2;
use hecs::Entity;
use log::{debug, info};

use crate::agent::Enemy;
use crate::ai::AgentState;
use crate::config::PlayerTuning;
use crate::core::{EventQueue, GameEvent, Timer};

/// Anything with a center point in world pixels
pub trait Positioned {
    /// Center in world pixels
    fn position(&self) -> Vec2;
}

/// Anything with health that can be hit
pub trait Damageable {
    /// Apply a hit of `amount` points
    fn take_damage(&mut self, amount: i32) -> DamageOutcome;

    /// Whether health is above zero
    fn is_alive(&self) -> bool;

    /// Remaining health points
    fn health(&self) -> i32;
}

/// Result of a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Dead or still inside the hit cooldown
    Ignored,
    /// Survived with `remaining` health
    Hurt { remaining: i32 },
    /// Health reached zero
    Killed,
}

/// Axis-aligned box around a center point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    /// Box center in world pixels
    pub center: Vec2,
    /// Full width and height
    pub size: Vec2,
}

impl Hitbox {
    #[must_use]
    pub const fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// Square box with edge `edge`
    #[must_use]
    pub fn square(center: Vec2, edge: f32) -> Self {
        Self::new(center, Vec2::splat(edge))
    }

    /// Top-left corner
    #[must_use]
    pub fn min(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    /// Bottom-right corner
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.center + self.size * 0.5
    }

    /// Boxes share interior area. Touching edges do not count.
    #[must_use]
    pub fn intersects(&self, other: &Hitbox) -> bool {
        let gap = (self.center - other.center).abs();
        let reach = (self.size + other.size) * 0.5;
        gap.x < reach.x && gap.y < reach.y
    }
}

// ============================================================================
// Player
// ============================================================================

/// The pursuit target. Regenerates health while left alone and lands hits
/// for a short window after each swing.
#[derive(Debug, Clone)]
pub struct Player {
    tuning: PlayerTuning,
    position: Vec2,
    health: i32,
    score: u32,
    damage_cooldown: Timer,
    heal_timer: Timer,
    swing_timer: Timer,
    attacking: bool,
}

impl Player {
    /// Create a player at full health on its spawn point
    #[must_use]
    pub fn new(tuning: PlayerTuning) -> Self {
        Self {
            position: tuning.spawn,
            health: tuning.max_health,
            score: 0,
            damage_cooldown: Timer::from_elapsed(tuning.damage_cooldown),
            heal_timer: Timer::new(),
            swing_timer: Timer::from_elapsed(tuning.swing_cooldown),
            attacking: false,
            tuning,
        }
    }

    /// Advance regeneration and the swing window
    pub fn tick(&mut self, delta_time: f32, events: &mut EventQueue) {
        self.damage_cooldown.tick(delta_time);
        self.heal_timer.tick(delta_time);
        self.swing_timer.tick(delta_time);

        if self.attacking && self.swing_timer.has_elapsed(self.tuning.swing_duration) {
            self.attacking = false;
        }

        if self.is_alive()
            && self.health < self.tuning.max_health
            && self.heal_timer.elapsed() > self.tuning.heal_interval
        {
            self.health += 1;
            self.heal_timer.reset();
            events.push(GameEvent::PlayerHealed {
                health: self.health,
            });
        }
    }

    /// Start a swing. Returns false while the previous one is cooling down.
    pub fn swing(&mut self) -> bool {
        if !self.is_alive() || !self.swing_timer.has_elapsed(self.tuning.swing_cooldown) {
            return false;
        }
        self.attacking = true;
        self.swing_timer.reset();
        true
    }

    /// Whether a swing can land hits this tick
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        self.attacking
    }

    #[must_use]
    pub fn attack_damage(&self) -> i32 {
        self.tuning.attack_damage
    }

    #[must_use]
    pub fn max_health(&self) -> i32 {
        self.tuning.max_health
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Add kill points and return the new total
    pub fn add_score(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Back to the spawn point, keeping health and score
    pub fn respawn(&mut self) {
        self.position = self.tuning.spawn;
        self.attacking = false;
    }

    #[must_use]
    pub fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.position, self.tuning.hitbox)
    }
}

impl Positioned for Player {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl Damageable for Player {
    fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if !self.is_alive() || !self.damage_cooldown.has_elapsed(self.tuning.damage_cooldown) {
            return DamageOutcome::Ignored;
        }

        self.health = (self.health - amount.max(0)).max(0);
        self.damage_cooldown.reset();
        self.heal_timer.reset();

        if self.health == 0 {
            DamageOutcome::Killed
        } else {
            DamageOutcome::Hurt {
                remaining: self.health,
            }
        }
    }

    fn is_alive(&self) -> bool {
        self.health > 0
    }

    fn health(&self) -> i32 {
        self.health
    }
}

// ============================================================================
// Exchange
// ============================================================================

/// Resolve contact between the player and `enemy` for one tick.
///
/// An attacking enemy hurts the player on overlap; a swinging player hurts
/// the enemy on overlap. Kills award the enemy's score.
pub fn exchange_blows(
    player: &mut Player,
    enemy: &mut Enemy,
    entity: Entity,
    events: &mut EventQueue,
) {
    let Some(enemy_box) = enemy.hitbox() else {
        return;
    };
    if !player.hitbox().intersects(&enemy_box) {
        return;
    }

    if enemy.state() == AgentState::Attack {
        let amount = enemy.attack_damage();
        match player.take_damage(amount) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Hurt { remaining } => {
                debug!("Player hit for {amount}, {remaining} left");
                events.push(GameEvent::PlayerDamaged {
                    source: entity,
                    amount,
                    remaining,
                });
            }
            DamageOutcome::Killed => {
                info!("Player killed by {}", enemy.kind().name());
                events.push(GameEvent::PlayerDamaged {
                    source: entity,
                    amount,
                    remaining: 0,
                });
                events.push(GameEvent::PlayerDied);
            }
        }
    }

    if player.is_attacking() {
        let amount = player.attack_damage();
        match enemy.take_damage(amount) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Hurt { remaining } => {
                events.push(GameEvent::EnemyDamaged {
                    entity,
                    amount,
                    remaining,
                });
            }
            DamageOutcome::Killed => {
                events.push(GameEvent::EnemyDamaged {
                    entity,
                    amount,
                    remaining: 0,
                });
                events.push(GameEvent::EnemyDied {
                    entity,
                    kind: enemy.kind(),
                });
                let score = player.add_score(enemy.score_value());
                events.push(GameEvent::ScoreChanged { score });
            }
        }
    }
}
