//! Core simulation primitives
//!
//! Contains the game event queue and tick-driven timers

mod events;
mod time;

pub use events::{EventQueue, GameEvent};
pub use time::Timer;
