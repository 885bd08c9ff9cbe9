//! Output channel from the simulation to the host
//!
//! The simulation never touches rendering or audio objects. Everything the host
//! needs to react to is pushed here and drained once per frame.

use serde::{Deserialize, Serialize};

/// Symbolic audio cue, synthesized by an external sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    Collect,
    PowerUp,
    Damage,
    MiniBossSpawn,
    LevelUp,
    Achievement,
    Ultimate,
    ObstacleWarning,
    PowerStation,
}

impl AudioCue {
    pub fn name(&self) -> &'static str {
        match self {
            AudioCue::Collect => "collect",
            AudioCue::PowerUp => "powerUp",
            AudioCue::Damage => "damage",
            AudioCue::MiniBossSpawn => "miniBossSpawn",
            AudioCue::LevelUp => "levelUp",
            AudioCue::Achievement => "achievement",
            AudioCue::Ultimate => "ultimate",
            AudioCue::ObstacleWarning => "obstacleWarning",
            AudioCue::PowerStation => "powerStation",
        }
    }
}

/// Notable things that happened during a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// Play a sound
    Cue(AudioCue),
    /// An achievement rule became true for the first time
    AchievementUnlocked {
        id: &'static str,
        name: &'static str,
        description: &'static str,
    },
    LevelUp { level: u32 },
    DifficultyIncreased { tier: u32 },
    MiniBossSpawned,
    MiniBossDefeated,
    /// Health reached zero
    RunEnded { score: u64 },
}
