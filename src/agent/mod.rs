//! Enemy agents
//!
//! Kind data, sprite playback, and the enemy that ties perception, the state
//! machine and path following together.

mod animation;
mod enemy;
mod kind;

pub use animation::{PlaybackState, SpriteAnimator};
pub use enemy::{Enemy, TickContext};
pub use kind::{ClipSet, ClipSpec, EnemyKind, KindTable, KindTuning, PlaybackMode, TextureSet};
