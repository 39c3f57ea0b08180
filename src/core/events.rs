//! Event Queue System for Decoupled Communication
//!
//! Gameplay code (enemy ticks, combat, level progression) reports what
//! happened through a double-buffered queue. Collaborators outside the
//! simulation core (music, HUD, score display) read the queue after each
//! tick without being called directly.
//!
//! # Design Principles
//!
//! - **Type Safety**: All events are strongly typed via the `GameEvent` enum
//! - **Double Buffering**: Events are frame-consistent (no mid-frame mutations)
//! - **Simplicity**: No complex pub/sub - just push and iterate
//!
//! # Example
//!
//! ```ignore
//! // During an enemy tick
//! ctx.events.push(GameEvent::DetectionBegan { entity });
//!
//! // After the level tick, in the music collaborator
//! for event in level.events().iter() {
//!     tracker.observe(event);
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec2;
use hecs::Entity;

use crate::agent::EnemyKind;

// ============================================================================
// Event Types
// ============================================================================

/// Game events for inter-system communication.
///
/// The `#[non_exhaustive]` attribute allows adding new variants without
/// breaking downstream code that uses wildcard patterns.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GameEvent {
    // -------------------------------------------------------------------------
    // Combat Events
    // -------------------------------------------------------------------------
    /// An enemy accepted a hit.
    EnemyDamaged {
        /// The damaged enemy
        entity: Entity,
        /// Damage applied
        amount: i32,
        /// Health left after the hit
        remaining: i32,
    },

    /// An enemy's health reached zero.
    EnemyDied {
        /// The enemy that died
        entity: Entity,
        /// Its kind, for score and sound selection
        kind: EnemyKind,
    },

    /// The player accepted a hit.
    PlayerDamaged {
        /// Attacking enemy
        source: Entity,
        /// Damage applied
        amount: i32,
        /// Health left after the hit
        remaining: i32,
    },

    /// The player's health reached zero.
    PlayerDied,

    /// Passive regeneration restored a point of health.
    PlayerHealed {
        /// Health after healing
        health: i32,
    },

    // -------------------------------------------------------------------------
    // Perception Events
    // -------------------------------------------------------------------------
    /// An enemy started seeing its target.
    DetectionBegan {
        /// The detecting enemy
        entity: Entity,
    },

    /// An enemy stopped seeing its target (lost sight or died).
    DetectionEnded {
        /// The enemy that stopped detecting
        entity: Entity,
    },

    // -------------------------------------------------------------------------
    // Level Events
    // -------------------------------------------------------------------------
    /// An enemy entered the level.
    EnemySpawned {
        /// The new enemy
        entity: Entity,
        /// Its kind
        kind: EnemyKind,
        /// Spawn position in pixels
        position: Vec2,
    },

    /// A map finished loading and the level was repopulated.
    MapLoaded {
        /// Map number
        index: u32,
    },

    /// Every enemy on the current map is gone.
    LevelCleared {
        /// Map number that was cleared
        index: u32,
    },

    /// Player scored points.
    ScoreChanged {
        /// New score value
        score: u32,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for frame-consistent event processing.
///
/// Events pushed during a tick become readable once the tick calls
/// `swap()`. This prevents issues where event order depends on system
/// update order.
///
/// # Performance
///
/// - Push: O(1) amortized
/// - Iteration: O(n)
/// - Swap: O(1)
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<GameEvent>,
    /// Events from the last completed tick, ready for processing
    processing: VecDeque<GameEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be read after the current tick.
    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    ///
    /// Called once per tick, at the end of the level update. After swapping:
    /// - `iter()` returns events from the tick that just ran
    /// - `push()` writes to the new pending queue
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the last completed tick.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.processing.iter()
    }

    /// Drain all events from the last completed tick.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are any events to process.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Get the number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Get the number of events written during the current tick.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Events written during the current tick, oldest first.
    #[inline]
    pub fn pending(&self) -> impl Iterator<Item = &GameEvent> {
        self.pending.iter()
    }

    /// Clear all events (both pending and processing).
    ///
    /// Map transitions call this so no event refers to a despawned enemy.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entity() -> Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    #[test]
    fn test_event_queue_push_and_swap() {
        let mut queue = EventQueue::new();

        queue.push(GameEvent::ScoreChanged { score: 100 });
        assert!(queue.is_empty(), "Events should not be visible before swap");
        assert_eq!(queue.pending_count(), 1);

        queue.swap();
        assert_eq!(queue.len(), 1);

        let events: Vec<_> = queue.iter().collect();
        assert!(matches!(events[0], GameEvent::ScoreChanged { score: 100 }));
    }

    #[test]
    fn test_event_queue_double_buffer_isolation() {
        let mut queue = EventQueue::new();

        queue.push(GameEvent::MapLoaded { index: 1 });
        queue.swap();

        queue.push(GameEvent::LevelCleared { index: 1 });

        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GameEvent::MapLoaded { index: 1 }));

        queue.swap();
        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GameEvent::LevelCleared { index: 1 }));
    }

    #[test]
    fn test_event_queue_drain() {
        let mut queue = EventQueue::new();
        let entity = test_entity();

        queue.push(GameEvent::DetectionBegan { entity });
        queue.push(GameEvent::DetectionEnded { entity });
        queue.swap();

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events.len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_event_queue_clear() {
        let mut queue = EventQueue::new();

        queue.push(GameEvent::ScoreChanged { score: 50 });
        queue.swap();
        queue.push(GameEvent::ScoreChanged { score: 100 });

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_enemy_died_event_carries_kind() {
        let entity = test_entity();
        let event = GameEvent::EnemyDied {
            entity,
            kind: EnemyKind::Goblin,
        };

        if let GameEvent::EnemyDied { kind, .. } = event {
            assert_eq!(kind, EnemyKind::Goblin);
        } else {
            panic!("Wrong event type");
        }
    }
}
