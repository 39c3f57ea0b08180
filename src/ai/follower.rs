//! Waypoint following with stuck recovery
//!
//! A [`PathFollower`] owns one agent's route. Each tick it seeks the current
//! waypoint, smooths its velocity, resolves the move against the grid and
//! watches how long it has gone without moving. A fully blocked move stops
//! the agent and tries routes to points beside the target. When an agent
//! stays blocked past the stuck threshold the route is dropped and replaced
//! with a short hop to a random nearby point.

use glam::Vec2;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::pathfinding::{SearchOptions, find_path_with};
use super::steering::{
    MoveResolution, Seek, SteeringBehavior, near_wall, resolve_move, smooth_velocity,
};
use crate::core::Timer;
use crate::map::Passability;

/// Movement and recovery parameters. Speeds are pixels per tick, times are seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowTuning {
    /// Speed in open areas
    pub normal_speed: f32,
    /// Speed when a wall probe hits
    pub slow_speed: f32,
    /// Distance of the four wall probes from the agent
    pub wall_probe_radius: f32,
    /// Velocity blend factor per tick
    pub smoothing: f32,
    /// Waypoint counts as reached inside this distance
    pub arrival_threshold: f32,
    /// Periodic re-plan only fires when the waypoint is farther than this
    pub progress_threshold: f32,
    /// Seconds between periodic re-plan checks
    pub replan_interval: f32,
    /// Seconds without movement before escaping
    pub stuck_threshold: f32,
    /// Escape targets are picked within this many pixels per axis
    pub escape_radius: i32,
    /// Distance of the side targets tried after a blocked move
    pub flank_offset: f32,
}

impl Default for FollowTuning {
    fn default() -> Self {
        Self {
            normal_speed: 1.25,
            slow_speed: 0.75,
            wall_probe_radius: 32.0,
            smoothing: 0.15,
            arrival_threshold: 8.0,
            progress_threshold: 32.0,
            replan_interval: 1.0,
            stuck_threshold: 0.5,
            escape_radius: 32,
            flank_offset: 32.0,
        }
    }
}

/// A non-empty route with a cursor on the next waypoint
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    waypoints: Vec<Vec2>,
    cursor: usize,
}

impl Path {
    /// Wrap waypoints; `None` when there are none
    #[must_use]
    pub fn new(waypoints: Vec<Vec2>) -> Option<Self> {
        (!waypoints.is_empty()).then_some(Self {
            waypoints,
            cursor: 0,
        })
    }

    /// Waypoint being approached
    #[must_use]
    pub fn current(&self) -> Vec2 {
        self.waypoints[self.cursor]
    }

    /// Move to the next waypoint. Returns false once the route is exhausted.
    fn advance(&mut self) -> bool {
        self.cursor += 1;
        self.cursor < self.waypoints.len()
    }

    /// All waypoints, start first
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Index of the current waypoint
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Waypoints not yet reached, current included
    #[must_use]
    pub fn remaining(&self) -> &[Vec2] {
        &self.waypoints[self.cursor..]
    }
}

/// What happened during one follower step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No route to follow
    NoPath,
    /// The last waypoint was reached; no movement this tick
    PathExhausted {
        /// A fresh route toward the live target was found
        replanned: bool,
    },
    /// Moved the full step
    Moved,
    /// Moved along one axis only
    Slid,
    /// Could not move; the agent stopped and its route was dropped
    Blocked {
        /// A route to a point beside the target was found
        rerouted: bool,
    },
    /// Blocked past the stuck threshold; the route was replaced
    Stuck {
        /// An escape route was found
        replanned: bool,
    },
}

/// Per-agent route state
#[derive(Debug, Clone)]
pub struct PathFollower {
    tuning: FollowTuning,
    search: SearchOptions,
    path: Option<Path>,
    velocity: Vec2,
    speed: f32,
    since_moved: Timer,
    replan_timer: Timer,
    plans: u32,
    escapes: u32,
}

impl PathFollower {
    /// Create an idle follower
    #[must_use]
    pub fn new(tuning: FollowTuning, search: SearchOptions) -> Self {
        Self {
            tuning,
            search,
            path: None,
            velocity: Vec2::ZERO,
            speed: tuning.normal_speed,
            since_moved: Timer::new(),
            replan_timer: Timer::new(),
            plans: 0,
            escapes: 0,
        }
    }

    /// Search a route and replace the current one with it.
    ///
    /// Returns whether a route was found; on failure the follower has no path.
    pub fn plan<G: Passability + ?Sized>(&mut self, grid: &G, from: Vec2, to: Vec2) -> bool {
        let result = find_path_with(grid, from, to, &self.search);
        self.plans += 1;
        debug!(
            "Planned {} waypoints from {from} to {to} ({} expansions)",
            result.waypoints.len(),
            result.expanded
        );
        self.path = Path::new(result.waypoints);
        self.path.is_some()
    }

    /// Follow an explicit list of waypoints
    pub fn follow(&mut self, waypoints: Vec<Vec2>) {
        self.path = Path::new(waypoints);
    }

    /// Drop the route, keep momentum
    pub fn clear_path(&mut self) {
        self.path = None;
    }

    /// Drop the route and stop
    pub fn halt(&mut self) {
        self.path = None;
        self.velocity = Vec2::ZERO;
    }

    /// Whether the caller should search a new route this tick.
    ///
    /// Always true without a route. Otherwise true only when the re-plan
    /// interval has elapsed (the timer then restarts) and the current waypoint
    /// is farther than the progress threshold.
    pub fn should_replan(&mut self, position: Vec2, delta_time: f32) -> bool {
        self.replan_timer.tick(delta_time);
        let Some(path) = &self.path else {
            return true;
        };
        if !self.replan_timer.has_elapsed(self.tuning.replan_interval) {
            return false;
        }
        self.replan_timer.reset();
        position.distance(path.current()) > self.tuning.progress_threshold
    }

    /// Advance the agent at `position` one tick along the route.
    ///
    /// `target` is the live pursuit target; when present an exhausted route
    /// is re-planned toward it, and a blocked move looks for a route to one of
    /// four points beside it.
    pub fn step<G, R>(
        &mut self,
        grid: &G,
        position: &mut Vec2,
        target: Option<Vec2>,
        delta_time: f32,
        rng: &mut R,
    ) -> StepOutcome
    where
        G: Passability + ?Sized,
        R: Rng,
    {
        let arrival = self.tuning.arrival_threshold;
        let waypoint = {
            let Some(path) = self.path.as_mut() else {
                return StepOutcome::NoPath;
            };
            if position.distance(path.current()) < arrival && !path.advance() {
                None
            } else {
                Some(path.current())
            }
        };
        self.since_moved.tick(delta_time);

        let Some(waypoint) = waypoint else {
            self.path = None;
            let replanned = target.is_some_and(|goal| self.plan(grid, *position, goal));
            return StepOutcome::PathExhausted { replanned };
        };

        let desired = Seek::new(waypoint, self.speed).calculate(*position, self.velocity);
        self.velocity = smooth_velocity(self.velocity, desired.linear, self.tuning.smoothing);
        let tentative = *position + self.velocity;

        let outcome = match resolve_move(grid, *position, self.velocity) {
            MoveResolution::Clear(next) => {
                *position = next;
                self.since_moved.reset();
                StepOutcome::Moved
            }
            MoveResolution::Slid(next) => {
                *position = next;
                self.since_moved.reset();
                StepOutcome::Slid
            }
            MoveResolution::Blocked if self.since_moved.elapsed() > self.tuning.stuck_threshold => {
                self.velocity = Vec2::ZERO;
                let replanned = self.escape(grid, *position, rng);
                self.since_moved.reset();
                StepOutcome::Stuck { replanned }
            }
            MoveResolution::Blocked => {
                self.halt();
                let rerouted = target.is_some_and(|goal| self.flank(grid, *position, goal));
                StepOutcome::Blocked { rerouted }
            }
        };

        self.speed = if near_wall(grid, tentative, self.tuning.wall_probe_radius) {
            self.tuning.slow_speed
        } else {
            self.tuning.normal_speed
        };

        outcome
    }

    /// Route to the first reachable point beside `goal`: right, left, below, above.
    fn flank<G: Passability + ?Sized>(&mut self, grid: &G, position: Vec2, goal: Vec2) -> bool {
        let offset = self.tuning.flank_offset;
        let sides = [
            Vec2::new(offset, 0.0),
            Vec2::new(-offset, 0.0),
            Vec2::new(0.0, offset),
            Vec2::new(0.0, -offset),
        ];
        sides
            .into_iter()
            .map(|side| goal + side)
            .filter(|&side| grid.is_point_passable(side))
            .any(|side| self.plan(grid, position, side))
    }

    fn escape<G, R>(&mut self, grid: &G, position: Vec2, rng: &mut R) -> bool
    where
        G: Passability + ?Sized,
        R: Rng,
    {
        self.path = None;
        self.escapes += 1;

        let radius = self.tuning.escape_radius.max(1);
        let offset = Vec2::new(
            rng.random_range(-radius..radius) as f32,
            rng.random_range(-radius..radius) as f32,
        );
        let target = position + offset;
        debug!("Stuck at {position}, escaping toward {target}");

        grid.is_point_passable(target) && self.plan(grid, position, target)
    }

    /// Active route, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Smoothed velocity in pixels per tick
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Speed used for the next step
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Seconds since the last successful move
    #[must_use]
    pub fn time_since_moved(&self) -> f32 {
        self.since_moved.elapsed()
    }

    /// Number of searches run
    #[must_use]
    pub fn plan_count(&self) -> u32 {
        self.plans
    }

    /// Number of stuck escapes triggered
    #[must_use]
    pub fn escape_count(&self) -> u32 {
        self.escapes
    }

    /// Movement parameters
    #[must_use]
    pub fn tuning(&self) -> &FollowTuning {
        &self.tuning
    }
}

impl Default for PathFollower {
    fn default() -> Self {
        Self::new(FollowTuning::default(), SearchOptions::default())
    }
}
