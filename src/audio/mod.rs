//! Music cues
//!
//! The level plays a calm background track until an enemy spots the player,
//! then switches to the critical theme until the last one loses sight.

mod music;

pub use music::{BACKGROUND_TRACK, CRITICAL_TRACK, DetectionTracker, MusicCue};
