//! AI and navigation module
//!
//! Provides grid pathfinding, perception, steering with path following, and
//! the enemy state machine.

mod follower;
mod fsm;
mod pathfinding;
mod perception;
mod steering;

pub use follower::{FollowTuning, Path, PathFollower, StepOutcome};
pub use fsm::{AgentState, Ranges, StateMachine, Stimulus, Transition, next_state};
pub use pathfinding::{
    CARDINAL_COST, DEFAULT_MAX_EXPANSIONS, DIAGONAL_COST, Heuristic, PathResult, SearchOptions,
    find_path, find_path_with,
};
pub use perception::{Perception, SIGHT_SAMPLE_STEP, has_line_of_sight, perceive};
pub use steering::{
    MoveResolution, Seek, SteeringBehavior, SteeringOutput, near_wall, probe_points, resolve_move,
    smooth_velocity,
};
