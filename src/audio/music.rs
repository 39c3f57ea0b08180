//! Detection tracker driving the music cue

use hecs::Entity;
use log::info;
use rustc_hash::FxHashSet;

use crate::core::GameEvent;

/// Looping track played while nobody is chasing the player
pub const BACKGROUND_TRACK: &str = "Assets/SoundTracks/PitcherPerfectTheme.wav";
/// Looping track played while any enemy sees the player
pub const CRITICAL_TRACK: &str = "Assets/SoundTracks/CriticalTheme.wav";

/// Track that should be playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MusicCue {
    #[default]
    Background,
    Critical,
}

impl MusicCue {
    /// Asset path of the track
    #[must_use]
    pub fn track(self) -> &'static str {
        match self {
            MusicCue::Background => BACKGROUND_TRACK,
            MusicCue::Critical => CRITICAL_TRACK,
        }
    }
}

/// Counts enemies that currently see the player.
///
/// Each enemy is counted once no matter how many begin signals it sends, and
/// an end signal from an enemy that was never counted is ignored, so the
/// count never goes negative.
#[derive(Debug, Default)]
pub struct DetectionTracker {
    detecting: FxHashSet<Entity>,
    cue: MusicCue,
}

impl DetectionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event. Returns the new cue when the track should switch.
    pub fn observe(&mut self, event: &GameEvent) -> Option<MusicCue> {
        match event {
            GameEvent::DetectionBegan { entity } => {
                self.detecting.insert(*entity);
            }
            GameEvent::DetectionEnded { entity } | GameEvent::EnemyDied { entity, .. } => {
                self.detecting.remove(entity);
            }
            _ => return None,
        }
        self.update_cue()
    }

    /// Forget every enemy (map change). Returns `Background` if the cue
    /// switched.
    pub fn reset(&mut self) -> Option<MusicCue> {
        self.detecting.clear();
        self.update_cue()
    }

    fn update_cue(&mut self) -> Option<MusicCue> {
        let cue = if self.detecting.is_empty() {
            MusicCue::Background
        } else {
            MusicCue::Critical
        };
        if cue == self.cue {
            return None;
        }
        info!("Switching music to {}", cue.track());
        self.cue = cue;
        Some(cue)
    }

    /// Track that should be playing now
    #[must_use]
    pub fn cue(&self) -> MusicCue {
        self.cue
    }

    /// Number of enemies that see the player
    #[must_use]
    pub fn detecting_count(&self) -> usize {
        self.detecting.len()
    }
}
