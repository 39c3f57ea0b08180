//! Enemy kinds and their tuning table
//!
//! Each kind differs only in data: sprite clips, damage, score and asset
//! paths. Behavior is shared.

use serde::{Deserialize, Serialize};

use crate::ai::AgentState;

/// Kind of enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Blue slime, found on most maps
    #[default]
    Slime,
    /// Goblin, found on map 2
    Goblin,
}

impl EnemyKind {
    /// Kind that populates map `index`
    #[must_use]
    pub fn for_map(index: u32) -> Self {
        if index == 2 {
            EnemyKind::Goblin
        } else {
            EnemyKind::Slime
        }
    }

    /// Display name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Slime => "Slime",
            EnemyKind::Goblin => "Goblin",
        }
    }
}

/// How a clip behaves on its last frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// Wrap to the first frame
    #[default]
    Loop,
    /// Finish after the last frame; the owner decides what follows
    Once,
    /// Stay on the last frame
    HoldLast,
}

/// One sprite-sheet row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipSpec {
    /// Frames in the row
    pub frames: u32,
    /// Multiplier on the kind's frame delay
    pub delay_scale: f32,
    /// End-of-clip behavior
    pub mode: PlaybackMode,
}

impl ClipSpec {
    /// Looping clip at normal speed
    #[must_use]
    pub const fn looping(frames: u32) -> Self {
        Self {
            frames,
            delay_scale: 1.0,
            mode: PlaybackMode::Loop,
        }
    }

    /// Clip that freezes on its last frame
    #[must_use]
    pub const fn hold(frames: u32) -> Self {
        Self {
            frames,
            delay_scale: 1.0,
            mode: PlaybackMode::HoldLast,
        }
    }

    /// Clip that plays once at `delay_scale` times the frame delay
    #[must_use]
    pub const fn once(frames: u32, delay_scale: f32) -> Self {
        Self {
            frames,
            delay_scale,
            mode: PlaybackMode::Once,
        }
    }
}

/// Clip for every state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipSet {
    pub idle: ClipSpec,
    pub walk: ClipSpec,
    pub attack: ClipSpec,
    pub hurt: ClipSpec,
    pub death: ClipSpec,
}

impl ClipSet {
    /// Clip played in `state`
    #[must_use]
    pub fn for_state(&self, state: AgentState) -> &ClipSpec {
        match state {
            AgentState::Idle => &self.idle,
            AgentState::Walk => &self.walk,
            AgentState::Attack => &self.attack,
            AgentState::Hurt => &self.hurt,
            AgentState::Dead => &self.death,
        }
    }
}

/// Texture paths, one sheet per state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureSet {
    pub idle: String,
    pub walk: String,
    pub attack: String,
    pub hurt: String,
    pub death: String,
}

impl TextureSet {
    /// Sheet used in `state`
    #[must_use]
    pub fn for_state(&self, state: AgentState) -> &str {
        match state {
            AgentState::Idle => &self.idle,
            AgentState::Walk => &self.walk,
            AgentState::Attack => &self.attack,
            AgentState::Hurt => &self.hurt,
            AgentState::Dead => &self.death,
        }
    }
}

/// Everything that varies between kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindTuning {
    pub clips: ClipSet,
    /// Seconds per frame before `delay_scale`
    pub frame_delay: f32,
    /// Edge of a sprite-sheet frame in pixels
    pub frame_size: i32,
    /// Draw scale applied to frames
    pub sprite_scale: f32,
    /// Damage dealt to the player per hit
    pub attack_damage: i32,
    /// Points awarded on kill
    pub score_value: u32,
    /// Starting health
    pub max_health: i32,
    /// Edge of the square hit box in pixels
    pub hitbox_size: f32,
    pub textures: TextureSet,
}

impl KindTuning {
    /// Half the drawn sprite edge; offset from a sprite's corner to its center
    #[must_use]
    pub fn half_extent(&self) -> f32 {
        self.frame_size as f32 * self.sprite_scale / 2.0
    }

    /// Blue slime defaults
    #[must_use]
    pub fn slime() -> Self {
        const DIR: &str = "Assets/Enemy/Slime/Blue Slime/Textures";
        Self {
            clips: ClipSet {
                idle: ClipSpec::looping(6),
                walk: ClipSpec::looping(6),
                attack: ClipSpec::looping(15),
                hurt: ClipSpec::looping(4),
                death: ClipSpec::hold(6),
            },
            frame_delay: 0.1,
            frame_size: 64,
            sprite_scale: 2.0,
            attack_damage: 1,
            score_value: 10,
            max_health: 5,
            hitbox_size: 38.4,
            textures: TextureSet {
                idle: format!("{DIR}/shadowless/spr_Blue_slime_idle_shadowless.png"),
                walk: format!("{DIR}/shadowless/spr_Blue_slime_walk_shadowless.png"),
                attack: format!("{DIR}/shadowless/spr_Blue_slime_attack_shadowless.png"),
                hurt: format!("{DIR}/spr_Blue_slime_hurt.png"),
                death: format!("{DIR}/spr_Blue_slime_death.png"),
            },
        }
    }

    /// Goblin defaults. The attack clip plays once at double speed.
    #[must_use]
    pub fn goblin() -> Self {
        const DIR: &str = "Assets/Enemy/Golbin/Textures";
        Self {
            clips: ClipSet {
                idle: ClipSpec::looping(4),
                walk: ClipSpec::looping(4),
                attack: ClipSpec::once(14, 0.5),
                hurt: ClipSpec::looping(4),
                death: ClipSpec::hold(4),
            },
            frame_delay: 0.1,
            frame_size: 64,
            sprite_scale: 2.0,
            attack_damage: 2,
            score_value: 20,
            max_health: 5,
            hitbox_size: 38.4,
            textures: TextureSet {
                idle: format!("{DIR}/spr_goblin_idle.png"),
                walk: format!("{DIR}/spr_goblin_walk.png"),
                attack: format!("{DIR}/spr_goblin_attack.png"),
                hurt: format!("{DIR}/spr_goblin_hurt.png"),
                death: format!("{DIR}/spr_goblin_death.png"),
            },
        }
    }
}

/// Tuning for every kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindTable {
    pub slime: KindTuning,
    pub goblin: KindTuning,
}

impl KindTable {
    /// Tuning for `kind`
    #[must_use]
    pub fn get(&self, kind: EnemyKind) -> &KindTuning {
        match kind {
            EnemyKind::Slime => &self.slime,
            EnemyKind::Goblin => &self.goblin,
        }
    }
}

impl Default for KindTable {
    fn default() -> Self {
        Self {
            slime: KindTuning::slime(),
            goblin: KindTuning::goblin(),
        }
    }
}
