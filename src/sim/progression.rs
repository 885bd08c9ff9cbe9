//! Score, combo, experience, difficulty and the ultimate ability
//!
//! These rules are shared between the collision resolver (a single pickup) and
//! the ultimate (mass collection), so both go through [`collect_energy`].

use super::effects::{Burst, TweenTarget};
use super::events::{AudioCue, GameEvent};
use super::schedule::ScheduledAction;
use super::spawn::SpawnKind;
use super::state::World;
use crate::consts::*;

/// Update the combo for a collection happening now and return the multiplier
/// that applies to it
pub fn register_collection(world: &mut World) -> f32 {
    let now = world.time_ms;
    let p = &mut world.progression;
    let in_window = p
        .last_collection_ms
        .is_some_and(|last| now.saturating_sub(last) < COMBO_WINDOW_MS);
    p.combo = if in_window { p.combo + 1 } else { 1 };
    p.best_combo = p.best_combo.max(p.combo);
    p.last_collection_ms = Some(now);
    p.combo_multiplier()
}

/// Drop the combo once the window since the last collection has lapsed
pub fn decay_combo(world: &mut World) {
    let now = world.time_ms;
    let p = &mut world.progression;
    if p.combo > 0
        && p
            .last_collection_ms
            .is_some_and(|last| now.saturating_sub(last) > COMBO_WINDOW_MS)
    {
        p.combo = 0;
    }
}

/// Collect energy item `index`. Returns the score gained, or `None` if it was
/// already collected or out of range.
pub fn collect_energy(world: &mut World, index: usize) -> Option<u64> {
    let item = world.energy_items.get_mut(index)?;
    if item.collected {
        return None;
    }
    item.collected = true;
    let (value, pos, color) = (item.value, item.pos, item.color);

    let multiplier = register_collection(world);
    let gained = (value as f32 * multiplier).floor() as u64;
    world.progression.score += gained;
    world.progression.items_collected += 1;
    add_experience(world, value * 2);
    add_charge(world, (value * 2) as f32);

    world.burst_tinted(Burst::Collect, pos, color);
    world.cue(AudioCue::Collect);
    world.shake(COLLECT_SHAKE);
    world.tween(TweenTarget::PlayerScale, 150, 0.15);

    if !world.energy_regen_pending && world.energy_items.iter().all(|i| i.collected) {
        world.energy_regen_pending = true;
        let batch = world.energy_batch;
        world.scheduler.schedule(
            world.time_ms,
            ENERGY_REGEN_DELAY_MS,
            ScheduledAction::RegenerateEnergy { batch },
        );
        log::trace!("Energy batch {} exhausted, regeneration queued", batch);
    }
    Some(gained)
}

/// Add experience, levelling up as many times as it covers
pub fn add_experience(world: &mut World, amount: u32) {
    world.progression.experience += amount;
    while world.progression.experience >= world.progression.experience_to_next
        && world.progression.experience_to_next > 0
    {
        level_up(world);
    }
}

fn level_up(world: &mut World) {
    let p = &mut world.progression;
    p.experience -= p.experience_to_next;
    p.experience_to_next = (p.experience_to_next as f32 * XP_CURVE).floor() as u32;
    p.level += 1;
    let level = p.level;

    world.player.base_speed = world.player.upgrades.base_speed();

    let pos = world.player.pos;
    world.burst(Burst::LevelUp, pos);
    world.cue(AudioCue::LevelUp);
    world.emit(GameEvent::LevelUp { level });
    world.tween(TweenTarget::CameraZoom, 600, 0.1);
    log::info!("Level up: {}", level);
}

/// Add ultimate charge (capped) and track the high-water mark
pub fn add_charge(world: &mut World, amount: f32) {
    let player = &mut world.player;
    player.ultimate_charge = (player.ultimate_charge + amount).clamp(0.0, ULTIMATE_MAX);
    let p = &mut world.progression;
    p.peak_charge = p.peak_charge.max(player.ultimate_charge);
}

/// Tier implied by the engine clock
pub fn difficulty_tier(time_ms: u64) -> u32 {
    (time_ms / DIFFICULTY_PERIOD_MS) as u32 + 1
}

/// Move to `tier`: fresh enemies no slower than their predecessors plus a
/// flat bonus, and a fresh energy batch
pub fn escalate(world: &mut World, tier: u32) {
    world.progression.difficulty = tier;

    let previous: Vec<f32> = world.enemies.iter().map(|e| e.speed).collect();
    world.regenerate(SpawnKind::Enemy);
    for (i, enemy) in world.enemies.iter_mut().enumerate() {
        if let Some(&old) = previous.get(i) {
            enemy.speed = enemy.speed.max(old);
        }
        enemy.speed += ESCALATION_SPEED_BONUS;
    }
    world.regenerate(SpawnKind::EnergyItem);

    let pos = world.player.pos;
    world.burst(Burst::Difficulty, pos);
    world.emit(GameEvent::DifficultyIncreased { tier });
    log::info!("Difficulty increased to tier {}", tier);
}

/// Fire the ultimate if fully charged. Returns whether it fired.
pub fn use_ultimate(world: &mut World) -> bool {
    if !world.player.ultimate_ready() {
        return false;
    }
    world.player.ultimate_charge = 0.0;

    let pos = world.player.pos;
    world.burst(Burst::Ultimate, pos);
    world.cue(AudioCue::Ultimate);
    world.shake(BOSS_SHAKE);

    let cleared = world.enemies.len();
    world.enemies.clear();
    damage_mini_boss(world, ULTIMATE_BOSS_DAMAGE);

    let mut gained = 0;
    for index in 0..world.energy_items.len() {
        gained += collect_energy(world, index).unwrap_or(0);
    }

    add_charge(world, ULTIMATE_REBATE);
    log::info!("Ultimate: cleared {} enemies, +{} score", cleared, gained);
    true
}

/// Apply damage to the mini-boss, removing it at zero health
pub fn damage_mini_boss(world: &mut World, amount: u32) {
    let Some(boss) = world.mini_boss.as_mut() else {
        return;
    };
    boss.health = boss.health.saturating_sub(amount);
    if boss.health > 0 {
        return;
    }
    let pos = boss.pos;
    world.mini_boss = None;
    world.progression.bosses_defeated += 1;
    world.burst(Burst::MiniBossSpawn, pos);
    world.emit(GameEvent::MiniBossDefeated);
    log::info!("Mini-boss defeated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::sim::spawn;
    use proptest::prelude::*;

    fn world() -> World {
        World::new(EngineConfig::default(), 7)
    }

    #[test]
    fn test_three_quick_collections_score_ten() {
        let mut world = world();
        for (i, value) in [1, 2, 3].into_iter().enumerate() {
            world.energy_items[i].value = value;
        }
        let mut combos = Vec::new();
        let mut multipliers = Vec::new();
        for i in 0..3 {
            world.time_ms = 1000 + i as u64 * 400;
            collect_energy(&mut world, i);
            combos.push(world.progression.combo);
            multipliers.push(world.progression.combo_multiplier());
        }
        assert_eq!(combos, vec![1, 2, 3]);
        assert_eq!(multipliers, vec![1.0, 1.5, 2.0]);
        assert_eq!(world.progression.score, 10);
        assert_eq!(world.progression.experience, 12);
        assert_eq!(world.player.ultimate_charge, 12.0);
    }

    #[test]
    fn test_combo_restarts_after_window() {
        let mut world = world();
        world.time_ms = 100;
        register_collection(&mut world);
        world.time_ms = 500;
        register_collection(&mut world);
        assert_eq!(world.progression.combo, 2);
        world.time_ms = 500 + COMBO_WINDOW_MS;
        register_collection(&mut world);
        assert_eq!(world.progression.combo, 1);
        assert_eq!(world.progression.best_combo, 2);
    }

    #[test]
    fn test_decay_combo() {
        let mut world = world();
        world.time_ms = 0;
        register_collection(&mut world);
        world.time_ms = COMBO_WINDOW_MS;
        decay_combo(&mut world);
        assert_eq!(world.progression.combo, 1);
        world.time_ms = COMBO_WINDOW_MS + 1;
        decay_combo(&mut world);
        assert_eq!(world.progression.combo, 0);
        assert_eq!(world.progression.combo_multiplier(), 1.0);
    }

    #[test]
    fn test_collect_twice_is_noop() {
        let mut world = world();
        assert!(collect_energy(&mut world, 0).is_some());
        let score = world.progression.score;
        assert_eq!(collect_energy(&mut world, 0), None);
        assert_eq!(collect_energy(&mut world, 999), None);
        assert_eq!(world.progression.score, score);
    }

    #[test]
    fn test_last_item_schedules_single_regeneration() {
        let mut world = world();
        let batch = world.energy_batch;
        for i in 0..world.energy_items.len() {
            collect_energy(&mut world, i);
        }
        assert!(world.energy_regen_pending);
        assert_eq!(world.scheduler.len(), 1);
        assert!(
            world
                .scheduler
                .contains(ScheduledAction::RegenerateEnergy { batch })
        );
    }

    #[test]
    fn test_level_up_carries_excess() {
        let mut world = world();
        world.player.upgrades.speed = 2.0;
        add_experience(&mut world, 130);
        assert_eq!(world.progression.level, 2);
        assert_eq!(world.progression.experience, 30);
        assert_eq!(world.progression.experience_to_next, 120);
        assert_eq!(world.player.base_speed, 3.5);
        assert!(world.events.contains(&GameEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn test_large_gain_levels_repeatedly() {
        let mut world = world();
        // 100 + 120 + 144 = 364
        add_experience(&mut world, 370);
        assert_eq!(world.progression.level, 4);
        assert_eq!(world.progression.experience, 6);
        assert_eq!(world.progression.experience_to_next, 172);
    }

    #[test]
    fn test_charge_caps_and_tracks_peak() {
        let mut world = world();
        add_charge(&mut world, 150.0);
        assert_eq!(world.player.ultimate_charge, ULTIMATE_MAX);
        add_charge(&mut world, -30.0);
        assert_eq!(world.player.ultimate_charge, 70.0);
        assert_eq!(world.progression.peak_charge, ULTIMATE_MAX);
    }

    #[test]
    fn test_escalation_never_slows_enemies() {
        let mut world = world();
        let before: Vec<f32> = world.enemies.iter().map(|e| e.speed).collect();
        let batch = world.energy_batch;
        escalate(&mut world, 2);
        assert_eq!(world.progression.difficulty, 2);
        assert_eq!(world.enemies.len(), before.len());
        for (enemy, old) in world.enemies.iter().zip(&before) {
            assert!(enemy.speed >= old + ESCALATION_SPEED_BONUS - 1e-5);
        }
        assert_ne!(world.energy_batch, batch);
        assert!(
            world
                .events
                .contains(&GameEvent::DifficultyIncreased { tier: 2 })
        );
    }

    #[test]
    fn test_ultimate_requires_full_charge() {
        let mut world = world();
        world.player.ultimate_charge = 99.0;
        assert!(!use_ultimate(&mut world));
        assert_eq!(world.enemies.len(), 5);
    }

    #[test]
    fn test_ultimate_clears_and_collects() {
        let mut world = world();
        world.player.ultimate_charge = ULTIMATE_MAX;
        world.energy_items[0].collected = true;
        assert!(use_ultimate(&mut world));
        assert!(world.enemies.is_empty());
        assert!(world.energy_items.iter().all(|i| i.collected));
        assert_eq!(world.progression.items_collected, 14);
        assert!(world.progression.score > 0);
        // Charge regained from the items plus the rebate, never above the cap
        assert!(world.player.ultimate_charge >= ULTIMATE_REBATE);
        assert!(world.player.ultimate_charge <= ULTIMATE_MAX);
        assert!(world.events.contains(&GameEvent::Cue(AudioCue::Ultimate)));
    }

    #[test]
    fn test_ultimate_can_defeat_boss() {
        let mut world = world();
        let bounds = world.bounds();
        let mut boss = spawn::spawn_mini_boss(&mut world.rng, &bounds);
        boss.health = ULTIMATE_BOSS_DAMAGE;
        world.mini_boss = Some(boss);
        world.player.ultimate_charge = ULTIMATE_MAX;
        use_ultimate(&mut world);
        assert!(world.mini_boss.is_none());
        assert_eq!(world.progression.bosses_defeated, 1);
        assert!(world.events.contains(&GameEvent::MiniBossDefeated));
    }

    #[test]
    fn test_boss_survives_partial_damage() {
        let mut world = world();
        let bounds = world.bounds();
        world.mini_boss = Some(spawn::spawn_mini_boss(&mut world.rng, &bounds));
        damage_mini_boss(&mut world, ULTIMATE_BOSS_DAMAGE);
        assert_eq!(world.mini_boss.as_ref().map(|b| b.health), Some(5));
        assert_eq!(world.progression.bosses_defeated, 0);
    }

    #[test]
    fn test_difficulty_tier() {
        assert_eq!(difficulty_tier(0), 1);
        assert_eq!(difficulty_tier(29_999), 1);
        assert_eq!(difficulty_tier(30_000), 2);
        assert_eq!(difficulty_tier(95_000), 4);
    }

    proptest! {
        #[test]
        fn prop_collection_score_is_floor_of_value_times_multiplier(
            gaps in proptest::collection::vec(0u64..4000, 1..15),
        ) {
            let mut world = World::new(EngineConfig::default(), 99);
            let mut now = 0;
            for (i, gap) in gaps.iter().enumerate() {
                now += gap;
                world.time_ms = now;
                let before = world.progression.score;
                let value = world.energy_items[i].value;
                let gained = collect_energy(&mut world, i).unwrap_or(0);
                let multiplier = world.progression.combo_multiplier();
                prop_assert!((1.0..=MAX_COMBO_MULTIPLIER).contains(&multiplier));
                prop_assert_eq!(gained, (value as f32 * multiplier).floor() as u64);
                prop_assert_eq!(world.progression.score, before + gained);
            }
        }
    }
}
