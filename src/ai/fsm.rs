//! Finite State Machine for enemy behavior
//!
//! Enemies have five states. The transition rule is a pure function of the
//! current state and what the enemy perceives this tick, so it can be tested
//! exhaustively and replayed. The [`StateMachine`] wrapper only tracks the
//! current state and how long it has been active; side effects of entering a
//! state belong to the owner.
//!
//! # Transition Order
//!
//! 1. No health left: `Dead` (absorbing)
//! 2. `Hurt` holds until its timer expires, then `Idle`
//! 3. A fresh hit: `Hurt`
//! 4. Target visible and inside attack range: `Attack`
//! 5. Target visible: `Walk`
//! 6. Otherwise: `Idle`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::Timer;

// ============================================================================
// States
// ============================================================================

/// Behavior state of an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AgentState {
    /// Standing still
    #[default]
    Idle,
    /// Pursuing the target along a path
    Walk,
    /// In melee range
    Attack,
    /// Stunned after a hit
    Hurt,
    /// Health depleted; playing the death sequence
    Dead,
}

impl AgentState {
    /// Every state, in declaration order
    pub const ALL: [AgentState; 5] = [
        AgentState::Idle,
        AgentState::Walk,
        AgentState::Attack,
        AgentState::Hurt,
        AgentState::Dead,
    ];

    /// State name for debugging and logging.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AgentState::Idle => "Idle",
            AgentState::Walk => "Walk",
            AgentState::Attack => "Attack",
            AgentState::Hurt => "Hurt",
            AgentState::Dead => "Dead",
        }
    }

    /// Whether the enemy may move or attack in this state
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, AgentState::Hurt | AgentState::Dead)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Everything the transition rule looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stimulus {
    /// Distance to the target in pixels
    pub distance: f32,
    /// Nothing blocks the view of the target
    pub line_of_sight: bool,
    /// Remaining health
    pub health: i32,
    /// A hit was accepted this tick
    pub damaged: bool,
    /// The hurt timer has run out
    pub timer_expired: bool,
}

impl Stimulus {
    /// A healthy enemy seeing nothing
    #[must_use]
    pub fn idle(health: i32) -> Self {
        Self {
            distance: f32::INFINITY,
            line_of_sight: false,
            health,
            damaged: false,
            timer_expired: false,
        }
    }
}

/// Perception radii in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ranges {
    /// Target must be closer than this to be seen
    pub detection: f32,
    /// Target must be closer than this to be attacked
    pub attack: f32,
}

impl Ranges {
    /// Target is in detection range with a clear view
    #[must_use]
    pub fn can_see(&self, stimulus: &Stimulus) -> bool {
        stimulus.line_of_sight && stimulus.distance < self.detection
    }
}

impl Default for Ranges {
    fn default() -> Self {
        Self {
            detection: 300.0,
            attack: 50.0,
        }
    }
}

// ============================================================================
// Transition Rule
// ============================================================================

/// Pick the state for this tick. Defined for every state and input.
#[must_use]
pub fn next_state(current: AgentState, stimulus: &Stimulus, ranges: &Ranges) -> AgentState {
    if stimulus.health <= 0 || current == AgentState::Dead {
        return AgentState::Dead;
    }

    if current == AgentState::Hurt {
        return if stimulus.timer_expired {
            AgentState::Idle
        } else {
            AgentState::Hurt
        };
    }

    if stimulus.damaged {
        return AgentState::Hurt;
    }

    if ranges.can_see(stimulus) {
        if stimulus.distance < ranges.attack {
            AgentState::Attack
        } else {
            AgentState::Walk
        }
    } else {
        AgentState::Idle
    }
}

// ============================================================================
// State Machine
// ============================================================================

/// A state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State that was left
    pub from: AgentState,
    /// State that was entered
    pub to: AgentState,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Current state plus time spent in it
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    current: AgentState,
    state_time: Timer,
}

impl StateMachine {
    /// Create a state machine in `initial`
    #[must_use]
    pub fn new(initial: AgentState) -> Self {
        Self {
            current: initial,
            state_time: Timer::new(),
        }
    }

    /// Advance the time-in-state clock
    pub fn tick(&mut self, delta_time: f32) {
        self.state_time.tick(delta_time);
    }

    /// Run the transition rule. Returns the change, if any.
    pub fn apply(&mut self, stimulus: &Stimulus, ranges: &Ranges) -> Option<Transition> {
        let next = next_state(self.current, stimulus, ranges);
        self.force(next)
    }

    /// Enter `state` regardless of the rule. Entering the current state is a no-op.
    pub fn force(&mut self, state: AgentState) -> Option<Transition> {
        if state == self.current {
            return None;
        }
        let transition = Transition {
            from: self.current,
            to: state,
        };
        self.current = state;
        self.state_time.reset();
        Some(transition)
    }

    /// Active state
    #[must_use]
    pub fn current(&self) -> AgentState {
        self.current
    }

    /// Seconds since the last transition
    #[must_use]
    pub fn state_time(&self) -> f32 {
        self.state_time.elapsed()
    }

    /// Check if the FSM is in the given state.
    #[must_use]
    pub fn is_in(&self, state: AgentState) -> bool {
        self.current == state
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn stimulus(distance: f32, line_of_sight: bool) -> Stimulus {
        Stimulus {
            distance,
            line_of_sight,
            health: 5,
            damaged: false,
            timer_expired: false,
        }
    }

    #[rstest]
    #[case::idle_sees_target(AgentState::Idle, 40.0, true, AgentState::Attack)]
    #[case::idle_target_far(AgentState::Idle, 200.0, true, AgentState::Walk)]
    #[case::walk_loses_sight(AgentState::Walk, 200.0, false, AgentState::Idle)]
    #[case::walk_out_of_range(AgentState::Walk, 300.0, true, AgentState::Idle)]
    #[case::attack_target_backs_off(AgentState::Attack, 50.0, true, AgentState::Walk)]
    #[case::hurt_holds(AgentState::Hurt, 10.0, true, AgentState::Hurt)]
    #[case::dead_absorbs(AgentState::Dead, 10.0, true, AgentState::Dead)]
    fn test_transition_table(
        #[case] from: AgentState,
        #[case] distance: f32,
        #[case] line_of_sight: bool,
        #[case] expected: AgentState,
    ) {
        let next = next_state(from, &stimulus(distance, line_of_sight), &Ranges::default());
        assert_eq!(next, expected);
    }

    #[test]
    fn test_transition_is_total() {
        let ranges = Ranges::default();
        let distances = [0.0, 10.0, 49.9, 50.0, 120.0, 299.9, 300.0, f32::INFINITY];

        for from in AgentState::ALL {
            for distance in distances {
                for line_of_sight in [false, true] {
                    for health in [-3, 0, 1, 5] {
                        for damaged in [false, true] {
                            for timer_expired in [false, true] {
                                let input = Stimulus {
                                    distance,
                                    line_of_sight,
                                    health,
                                    damaged,
                                    timer_expired,
                                };
                                let next = next_state(from, &input, &ranges);
                                assert!(AgentState::ALL.contains(&next));

                                if health <= 0 || from == AgentState::Dead {
                                    assert_eq!(next, AgentState::Dead, "{from} {input:?}");
                                }
                                if from == AgentState::Hurt && health > 0 {
                                    let expected = if timer_expired {
                                        AgentState::Idle
                                    } else {
                                        AgentState::Hurt
                                    };
                                    assert_eq!(next, expected, "{from} {input:?}");
                                }
                                if next == AgentState::Attack {
                                    assert!(line_of_sight && distance < ranges.attack);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_damage_interrupts_active_states() {
        let ranges = Ranges::default();
        let hit = Stimulus {
            damaged: true,
            ..stimulus(40.0, true)
        };
        for from in [AgentState::Idle, AgentState::Walk, AgentState::Attack] {
            assert_eq!(next_state(from, &hit, &ranges), AgentState::Hurt);
        }
    }

    #[test]
    fn test_hurt_expires_to_idle_even_when_visible() {
        let input = Stimulus {
            timer_expired: true,
            ..stimulus(100.0, true)
        };
        assert_eq!(
            next_state(AgentState::Hurt, &input, &Ranges::default()),
            AgentState::Idle
        );
    }

    #[test]
    fn test_state_machine_tracks_time_in_state() {
        let mut fsm = StateMachine::new(AgentState::Idle);
        fsm.tick(0.25);
        assert_eq!(fsm.state_time(), 0.25);

        let change = fsm.apply(&stimulus(100.0, true), &Ranges::default());
        assert_eq!(
            change,
            Some(Transition {
                from: AgentState::Idle,
                to: AgentState::Walk
            })
        );
        assert!(fsm.is_in(AgentState::Walk));
        assert_eq!(fsm.state_time(), 0.0);

        fsm.tick(0.1);
        assert_eq!(fsm.apply(&stimulus(120.0, true), &Ranges::default()), None);
        assert_eq!(fsm.state_time(), 0.1);
    }

    #[test]
    fn test_forced_transition() {
        let mut fsm = StateMachine::new(AgentState::Walk);
        assert!(fsm.force(AgentState::Walk).is_none());

        let change = fsm.force(AgentState::Dead).unwrap();
        assert_eq!(change.to_string(), "Walk -> Dead");
        assert_eq!(fsm.current(), AgentState::Dead);
    }
}
