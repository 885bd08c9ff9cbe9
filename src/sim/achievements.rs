//! Achievement rules
//!
//! Each rule is a predicate over monotonic counters, so once a rule holds it
//! holds for the rest of the run and the unlock fires exactly once.

use serde::Serialize;

use super::effects::Burst;
use super::events::{AudioCue, GameEvent};
use super::state::World;
use crate::consts::ULTIMATE_MAX;

pub struct AchievementRule {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub condition: fn(&World) -> bool,
}

/// Evaluation order is the table order
pub const RULES: [AchievementRule; 7] = [
    AchievementRule {
        id: "first_energy",
        name: "First Energy",
        description: "Collect your first energy item",
        condition: |w| w.progression.score >= 1,
    },
    AchievementRule {
        id: "combo_master",
        name: "Combo Master",
        description: "Reach a 5x combo",
        condition: |w| w.progression.best_combo >= 5,
    },
    AchievementRule {
        id: "level_5",
        name: "Rising Star",
        description: "Reach level 5",
        condition: |w| w.progression.level >= 5,
    },
    AchievementRule {
        id: "survivor",
        name: "Survivor",
        description: "Survive for 2 minutes",
        condition: |w| w.time_ms >= 120_000,
    },
    AchievementRule {
        id: "energy_hunter",
        name: "Energy Hunter",
        description: "Reach 100 points",
        condition: |w| w.progression.score >= 100,
    },
    AchievementRule {
        id: "boss_slayer",
        name: "Boss Slayer",
        description: "Defeat a mini-boss",
        condition: |w| w.progression.bosses_defeated >= 1,
    },
    AchievementRule {
        id: "ultimate_master",
        name: "Ultimate Master",
        description: "Fully charge your ultimate",
        condition: |w| w.progression.peak_charge >= ULTIMATE_MAX,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementStatus {
    pub id: &'static str,
    pub unlocked: bool,
}

pub fn initial_statuses() -> Vec<AchievementStatus> {
    RULES
        .iter()
        .map(|rule| AchievementStatus {
            id: rule.id,
            unlocked: false,
        })
        .collect()
}

/// Unlock every rule that now holds. Returns how many were unlocked.
pub fn evaluate(world: &mut World) -> usize {
    let mut unlocked = 0;
    for (i, rule) in RULES.iter().enumerate() {
        let already = world.achievements.get(i).is_none_or(|s| s.unlocked);
        if already || !(rule.condition)(world) {
            continue;
        }
        world.achievements[i].unlocked = true;
        unlocked += 1;

        let pos = world.player.pos;
        world.burst(Burst::Achievement, pos);
        world.cue(AudioCue::Achievement);
        world.emit(GameEvent::AchievementUnlocked {
            id: rule.id,
            name: rule.name,
            description: rule.description,
        });
        log::info!("Achievement unlocked: {}", rule.name);
    }
    unlocked
}

/// Names of unlocked achievements, in table order
pub fn unlocked_names(world: &World) -> Vec<String> {
    RULES
        .iter()
        .zip(&world.achievements)
        .filter(|(_, status)| status.unlocked)
        .map(|(rule, _)| rule.name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_fires_once() {
        let mut world = World::new(EngineConfig::default(), 1);
        assert_eq!(evaluate(&mut world), 0);

        world.progression.score = 5;
        assert_eq!(evaluate(&mut world), 1);
        assert_eq!(evaluate(&mut world), 0);

        let unlocks = world
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::AchievementUnlocked { .. }))
            .count();
        assert_eq!(unlocks, 1);
        assert!(world.events.contains(&GameEvent::AchievementUnlocked {
            id: "first_energy",
            name: "First Energy",
            description: "Collect your first energy item",
        }));
    }

    #[test]
    fn test_survives_reset() {
        let mut world = World::new(EngineConfig::default(), 1);
        world.progression.best_combo = 5;
        evaluate(&mut world);
        world.reset();
        assert_eq!(unlocked_names(&world), vec!["Combo Master".to_string()]);
        world.progression.best_combo = 6;
        assert_eq!(evaluate(&mut world), 0);
    }

    #[test]
    fn test_multiple_in_table_order() {
        let mut world = World::new(EngineConfig::default(), 1);
        world.progression.score = 150;
        world.progression.peak_charge = ULTIMATE_MAX;
        world.progression.bosses_defeated = 1;
        assert_eq!(evaluate(&mut world), 4);
        assert_eq!(
            unlocked_names(&world),
            vec!["First Energy", "Energy Hunter", "Boss Slayer", "Ultimate Master"]
        );
    }
}
