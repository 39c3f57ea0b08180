//! Tick-driven timers
//!
//! Simulation time only advances through `tick()`, so every cooldown and
//! duration is reproducible from the sequence of frame deltas.

/// Accumulates elapsed simulation time in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Timer {
    elapsed: f32,
}

impl Timer {
    /// Create a timer at zero
    #[must_use]
    pub const fn new() -> Self {
        Self { elapsed: 0.0 }
    }

    /// Create a timer that has already been running for `seconds`.
    ///
    /// Used for cooldowns that should be ready immediately.
    #[must_use]
    pub const fn from_elapsed(seconds: f32) -> Self {
        Self { elapsed: seconds }
    }

    /// Advance by one frame. Negative deltas are ignored.
    #[inline]
    pub fn tick(&mut self, delta_time: f32) {
        self.elapsed += delta_time.max(0.0);
    }

    /// Restart from zero
    #[inline]
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    /// Seconds since the last reset
    #[must_use]
    #[inline]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whether at least `duration` seconds have passed
    #[must_use]
    #[inline]
    pub fn has_elapsed(&self, duration: f32) -> bool {
        self.elapsed >= duration
    }
}
