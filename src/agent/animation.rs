//! Sprite-sheet playback
//!
//! Advances a frame index at a fixed delay. At most one frame is advanced per
//! update and leftover time is dropped, so playback speed follows the tick rate
//! the same way on every machine.

use super::kind::{ClipSpec, PlaybackMode};
use crate::core::Timer;
use crate::map::TextureRect;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Animation is playing
    #[default]
    Playing,
    /// A once-only clip ran past its last frame
    Finished,
}

/// Frame cursor for the active clip
#[derive(Debug, Clone, Default)]
pub struct SpriteAnimator {
    /// Current frame index
    frame: u32,
    /// Time since the last frame change
    clock: Timer,
    /// Current playback state
    state: PlaybackState,
}

impl SpriteAnimator {
    /// Create an animator on frame 0
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart from the first frame (on every state change)
    pub fn reset(&mut self) {
        self.frame = 0;
        self.clock.reset();
        self.state = PlaybackState::Playing;
    }

    /// Update playback (call each tick).
    ///
    /// Returns `PlaybackState::Finished` on the tick a once-only clip ends.
    pub fn update(&mut self, clip: &ClipSpec, frame_delay: f32, delta_time: f32) -> PlaybackState {
        if self.state == PlaybackState::Finished {
            return self.state;
        }

        let last = clip.frames.saturating_sub(1);
        if self.frame > last {
            self.frame = 0;
        }

        self.clock.tick(delta_time);
        if self.clock.elapsed() <= frame_delay * clip.delay_scale {
            return self.state;
        }
        self.clock.reset();

        match clip.mode {
            PlaybackMode::Loop => {
                self.frame = if self.frame >= last { 0 } else { self.frame + 1 };
            }
            PlaybackMode::HoldLast => {
                self.frame = (self.frame + 1).min(last);
            }
            PlaybackMode::Once => {
                if self.frame < last {
                    self.frame += 1;
                } else {
                    self.frame = 0;
                    self.state = PlaybackState::Finished;
                }
            }
        }
        self.state
    }

    /// Get current frame
    #[must_use]
    pub const fn frame(&self) -> u32 {
        self.frame
    }

    /// Get playback state
    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Source rectangle of the current frame in a horizontal strip
    #[must_use]
    pub fn source_rect(&self, frame_size: i32) -> TextureRect {
        TextureRect {
            x: self.frame as i32 * frame_size,
            y: 0,
            w: frame_size,
            h: frame_size,
        }
    }
}
