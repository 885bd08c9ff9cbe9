//! Read-only HUD snapshot for the presentation layer

use serde::Serialize;

use super::state::{EffectKind, GamePhase, World};
use crate::consts::ULTIMATE_MAX;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub remaining_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub health: u32,
    pub max_health: u32,
    pub effects: Vec<ActiveEffect>,
    /// Only present while a combo is boosting score
    pub combo_multiplier: Option<f32>,
    pub level: u32,
    /// 0..=1 progress toward the next level
    pub experience_ratio: f32,
    pub ultimate_percent: u32,
    pub ultimate_ready: bool,
    pub difficulty: u32,
    pub phase: GamePhase,
}

impl Hud {
    pub fn from_world(world: &World) -> Self {
        let progression = &world.progression;
        let multiplier = progression.combo_multiplier();
        let player = &world.player;
        Self {
            score: progression.score,
            health: player.health,
            max_health: player.max_health,
            effects: player
                .effects
                .active()
                .map(|(kind, remaining_ms)| ActiveEffect { kind, remaining_ms })
                .collect(),
            combo_multiplier: (multiplier > 1.0).then_some(multiplier),
            level: progression.level,
            experience_ratio: progression.experience_ratio(),
            ultimate_percent: (player.ultimate_charge / ULTIMATE_MAX * 100.0).floor() as u32,
            ultimate_ready: player.ultimate_ready(),
            difficulty: progression.difficulty,
            phase: world.phase,
        }
    }

    /// Combo label as the HUD shows it, e.g. `COMBO x1.5`
    pub fn combo_label(&self) -> Option<String> {
        self.combo_multiplier.map(|m| format!("COMBO x{:.1}", m))
    }
}
