//! Steering behaviors for AI movement
//!
//! Velocities are in pixels per tick. Movement legality is checked against the
//! passability grid at the agent's center; blocked moves try to slide along
//! one axis before giving up.

use glam::Vec2;
use smallvec::SmallVec;

use crate::map::Passability;

/// Output from a steering behavior
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Desired velocity
    pub linear: Vec2,
}

impl SteeringOutput {
    /// Zero steering
    pub const ZERO: Self = Self { linear: Vec2::ZERO };
}

/// Trait for steering behaviors
pub trait SteeringBehavior {
    /// Calculate steering based on agent state
    fn calculate(&self, position: Vec2, velocity: Vec2) -> SteeringOutput;
}

/// Seek behavior - move towards target at full speed
#[derive(Debug, Clone)]
pub struct Seek {
    /// Target position
    pub target: Vec2,
    /// Speed in pixels per tick
    pub max_speed: f32,
}

impl Seek {
    /// Create a new seek behavior
    #[must_use]
    pub fn new(target: Vec2, max_speed: f32) -> Self {
        Self { target, max_speed }
    }
}

impl SteeringBehavior for Seek {
    fn calculate(&self, position: Vec2, _velocity: Vec2) -> SteeringOutput {
        let direction = (self.target - position).normalize_or_zero();
        SteeringOutput {
            linear: direction * self.max_speed,
        }
    }
}

/// Blend `current` toward `target` by `factor` (0 keeps current, 1 snaps).
#[must_use]
#[inline]
pub fn smooth_velocity(current: Vec2, target: Vec2, factor: f32) -> Vec2 {
    current * (1.0 - factor) + target * factor
}

/// Where a tentative move ended up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveResolution {
    /// Full move was legal
    Clear(Vec2),
    /// Only one axis of the move was legal
    Slid(Vec2),
    /// Nothing was legal; stay put
    Blocked,
}

impl MoveResolution {
    /// New position, if the agent moved
    #[must_use]
    pub fn position(self) -> Option<Vec2> {
        match self {
            MoveResolution::Clear(p) | MoveResolution::Slid(p) => Some(p),
            MoveResolution::Blocked => None,
        }
    }
}

/// Resolve a move of `velocity` from `position` against the grid.
///
/// Tries the full move, then horizontal only, then vertical only. An axis
/// with no velocity component is skipped so a zero-length slide never hides
/// a blocked move.
#[must_use]
pub fn resolve_move<G: Passability + ?Sized>(
    grid: &G,
    position: Vec2,
    velocity: Vec2,
) -> MoveResolution {
    let full = position + velocity;
    if grid.is_point_passable(full) {
        return MoveResolution::Clear(full);
    }

    if velocity.x != 0.0 {
        let horizontal = position + Vec2::new(velocity.x, 0.0);
        if grid.is_point_passable(horizontal) {
            return MoveResolution::Slid(horizontal);
        }
    }

    if velocity.y != 0.0 {
        let vertical = position + Vec2::new(0.0, velocity.y);
        if grid.is_point_passable(vertical) {
            return MoveResolution::Slid(vertical);
        }
    }

    MoveResolution::Blocked
}

/// Left, right, up and down probes at `radius` around `center`
#[must_use]
pub fn probe_points(center: Vec2, radius: f32) -> SmallVec<[Vec2; 4]> {
    SmallVec::from_buf([
        center - Vec2::new(radius, 0.0),
        center + Vec2::new(radius, 0.0),
        center - Vec2::new(0.0, radius),
        center + Vec2::new(0.0, radius),
    ])
}

/// Whether any cardinal probe around `center` is blocked
#[must_use]
pub fn near_wall<G: Passability + ?Sized>(grid: &G, center: Vec2, radius: f32) -> bool {
    probe_points(center, radius)
        .iter()
        .any(|&point| !grid.is_point_passable(point))
}
