//! Enemy agent
//!
//! An enemy perceives its target, runs the state machine, and in `Walk`
//! follows a path toward the target. Entering a state applies its side
//! effects once: `Idle` and `Attack` stop movement, `Hurt` starts the stun
//! timer, `Dead` stops movement and starts the death timer.

use glam::Vec2;
use hecs::Entity;
use log::debug;
use rand::rngs::StdRng;

use super::animation::{PlaybackState, SpriteAnimator};
use super::kind::{EnemyKind, KindTuning, PlaybackMode};
use crate::ai::{AgentState, Path, PathFollower, StateMachine, Stimulus, Transition, perceive};
use crate::combat::{DamageOutcome, Damageable, Hitbox, Positioned};
use crate::config::AgentTuning;
use crate::core::{EventQueue, GameEvent, Timer};
use crate::map::{Passability, TextureRect};

/// Everything an enemy needs from the level for one tick
pub struct TickContext<'a> {
    /// Passability of the active map
    pub grid: &'a dyn Passability,
    /// Pursuit target (player center)
    pub target: Vec2,
    /// Seconds since the previous tick
    pub delta_time: f32,
    /// Randomness for stuck escapes
    pub rng: &'a mut StdRng,
    /// Signal sink
    pub events: &'a mut EventQueue,
    /// This enemy's entity, for event payloads
    pub entity: Entity,
}

/// A single enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    kind: EnemyKind,
    tuning: KindTuning,
    agent: AgentTuning,
    position: Vec2,
    health: i32,
    fsm: StateMachine,
    follower: PathFollower,
    animator: SpriteAnimator,
    damage_cooldown: Timer,
    hurt_timer: Timer,
    death_timer: Timer,
    detecting: bool,
}

impl Enemy {
    /// Create an idle enemy centered at `position`
    #[must_use]
    pub fn new(kind: EnemyKind, tuning: KindTuning, agent: AgentTuning, position: Vec2) -> Self {
        Self {
            kind,
            health: tuning.max_health,
            tuning,
            follower: PathFollower::new(agent.movement, agent.search),
            agent,
            position,
            fsm: StateMachine::new(AgentState::Idle),
            animator: SpriteAnimator::new(),
            damage_cooldown: Timer::from_elapsed(agent.damage_cooldown),
            hurt_timer: Timer::new(),
            death_timer: Timer::new(),
            detecting: false,
        }
    }

    /// Advance one tick
    pub fn tick(&mut self, ctx: &mut TickContext<'_>) {
        let dt = ctx.delta_time;
        self.damage_cooldown.tick(dt);
        self.fsm.tick(dt);

        match self.fsm.current() {
            AgentState::Dead => {
                self.set_detecting(false, ctx);
                self.death_timer.tick(dt);
                self.animate(dt);
                return;
            }
            AgentState::Hurt => {
                self.hurt_timer.tick(dt);
                self.animate(dt);
                let stimulus = Stimulus {
                    timer_expired: self.hurt_timer.has_elapsed(self.agent.hurt_duration),
                    ..Stimulus::idle(self.health)
                };
                if let Some(transition) = self.fsm.apply(&stimulus, &self.agent.ranges) {
                    self.on_transition(transition);
                }
                return;
            }
            _ => {}
        }

        let perception = perceive(
            ctx.grid,
            self.position,
            ctx.target,
            self.agent.ranges.detection,
        );
        self.set_detecting(perception.can_see, ctx);

        let stimulus = Stimulus {
            distance: perception.distance,
            line_of_sight: perception.can_see,
            health: self.health,
            damaged: false,
            timer_expired: false,
        };
        if let Some(transition) = self.fsm.apply(&stimulus, &self.agent.ranges) {
            self.on_transition(transition);
        }

        if self.fsm.is_in(AgentState::Walk) {
            if self.follower.should_replan(self.position, dt) {
                self.follower.plan(ctx.grid, self.position, ctx.target);
            }
            self.follower.step(
                ctx.grid,
                &mut self.position,
                Some(ctx.target),
                dt,
                &mut *ctx.rng,
            );
        }

        self.animate(dt);
    }

    fn animate(&mut self, dt: f32) {
        let state = self.fsm.current();
        let clip = *self.tuning.clips.for_state(state);
        let playback = self.animator.update(&clip, self.tuning.frame_delay, dt);

        if playback == PlaybackState::Finished
            && clip.mode == PlaybackMode::Once
            && state == AgentState::Attack
            && let Some(transition) = self.fsm.force(AgentState::Idle)
        {
            self.on_transition(transition);
        }
    }

    fn set_detecting(&mut self, detecting: bool, ctx: &mut TickContext<'_>) {
        if detecting == self.detecting {
            return;
        }
        self.detecting = detecting;
        let entity = ctx.entity;
        ctx.events.push(if detecting {
            GameEvent::DetectionBegan { entity }
        } else {
            GameEvent::DetectionEnded { entity }
        });
    }

    fn on_transition(&mut self, transition: Transition) {
        debug!("{} {}", self.kind.name(), transition);
        self.animator.reset();
        match transition.to {
            AgentState::Idle | AgentState::Attack => self.follower.halt(),
            AgentState::Walk => {}
            AgentState::Hurt => self.hurt_timer.reset(),
            AgentState::Dead => {
                self.follower.halt();
                self.death_timer.reset();
            }
        }
    }

    /// Kind of this enemy
    #[must_use]
    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Kind tuning, including texture paths
    #[must_use]
    pub fn tuning(&self) -> &KindTuning {
        &self.tuning
    }

    /// Active state
    #[must_use]
    pub fn state(&self) -> AgentState {
        self.fsm.current()
    }

    /// Move the enemy (spawning, tests)
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Smoothed velocity in pixels per tick
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.follower.velocity()
    }

    /// Route being followed, for debug overlays
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.follower.path()
    }

    /// Route follower
    #[must_use]
    pub fn follower(&self) -> &PathFollower {
        &self.follower
    }

    /// Mutable route follower
    pub fn follower_mut(&mut self) -> &mut PathFollower {
        &mut self.follower
    }

    /// Sprite frame to draw
    #[must_use]
    pub fn frame_index(&self) -> u32 {
        self.animator.frame()
    }

    /// Source rectangle of the current frame in the state's sheet
    #[must_use]
    pub fn source_rect(&self) -> TextureRect {
        self.animator.source_rect(self.tuning.frame_size)
    }

    /// Sheet for the current state
    #[must_use]
    pub fn texture(&self) -> &str {
        self.tuning.textures.for_state(self.state())
    }

    /// Whether the target was visible last tick
    #[must_use]
    pub fn is_detecting(&self) -> bool {
        self.detecting
    }

    /// Damage dealt to the player per hit
    #[must_use]
    pub fn attack_damage(&self) -> i32 {
        self.tuning.attack_damage
    }

    /// Points for killing this enemy
    #[must_use]
    pub fn score_value(&self) -> u32 {
        self.tuning.score_value
    }

    /// Hit box while alive; corpses do not collide
    #[must_use]
    pub fn hitbox(&self) -> Option<Hitbox> {
        self.is_alive()
            .then(|| Hitbox::square(self.position, self.tuning.hitbox_size))
    }

    /// Death sequence is over and the enemy can be removed
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state() == AgentState::Dead && self.death_timer.has_elapsed(self.agent.death_duration)
    }
}

impl Positioned for Enemy {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl Damageable for Enemy {
    /// Ignored while dead or cooling down. A non-lethal hit stuns unless the
    /// enemy is already stunned.
    fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if !self.is_alive() || !self.damage_cooldown.has_elapsed(self.agent.damage_cooldown) {
            return DamageOutcome::Ignored;
        }

        self.health = (self.health - amount.max(0)).max(0);
        self.damage_cooldown.reset();

        let stimulus = Stimulus {
            damaged: true,
            ..Stimulus::idle(self.health)
        };
        if let Some(transition) = self.fsm.apply(&stimulus, &self.agent.ranges) {
            self.on_transition(transition);
        }

        if self.health == 0 {
            debug!("{} defeated", self.kind.name());
            DamageOutcome::Killed
        } else {
            DamageOutcome::Hurt {
                remaining: self.health,
            }
        }
    }

    fn is_alive(&self) -> bool {
        self.state() != AgentState::Dead
    }

    fn health(&self) -> i32 {
        self.health
    }
}
