//! Frame step
//!
//! Advances the world by one frame. The stage order below is load-bearing:
//! scheduled actions and the ultimate trigger go first, collisions see
//! post-movement positions, and achievements see the frame's final counters.

use glam::Vec2;
use rand::Rng;

use super::effects::{self, Burst};
use super::events::{AudioCue, GameEvent};
use super::input::FrameInput;
use super::schedule::ScheduledAction;
use super::spawn::{self, SpawnKind};
use super::state::{EffectKind, EnemyBehavior, GamePhase, World};
use super::{achievements, collision, progression};
use crate::consts::*;
use crate::{ease, step_toward};

/// Advance the world by `dt_ms` milliseconds of play
pub fn tick(world: &mut World, input: &FrameInput, dt_ms: u32) {
    if world.phase == GamePhase::GameOver {
        return;
    }
    world.time_ms += dt_ms as u64;

    run_scheduled(world);
    // Must precede the passive decay: a charge reported ready has to fire
    if input.ultimate {
        progression::use_ultimate(world);
    }
    apply_zoom(world, input.zoom_steps);
    move_player(world, input.movement);
    pull_magnet_items(world);
    update_camera(world);
    advance_pulses(world);
    move_enemies(world);
    move_mini_boss(world);

    effects::update_tweens(&mut world.tweens, dt_ms);
    effects::update_particles(&mut world.particles);

    world.player.effects.tick(dt_ms);
    world.player.ultimate_charge =
        (world.player.ultimate_charge - ULTIMATE_DECAY_PER_FRAME).max(0.0);
    progression::decay_combo(world);

    let tier = progression::difficulty_tier(world.time_ms);
    if tier > world.progression.difficulty {
        progression::escalate(world, tier);
    }
    maybe_spawn_mini_boss(world);

    collision::resolve(world);
    achievements::evaluate(world);
}

fn run_scheduled(world: &mut World) {
    for action in world.scheduler.take_due(world.time_ms) {
        match action {
            ScheduledAction::RegenerateEnergy { batch } => {
                if batch == world.energy_batch {
                    world.regenerate(SpawnKind::EnergyItem);
                }
            }
            ScheduledAction::RegeneratePowerUps { set } => {
                if set == world.power_up_set {
                    world.regenerate(SpawnKind::PowerUp);
                }
            }
            ScheduledAction::RechargeStation { set, index } => {
                if set != world.station_set {
                    continue;
                }
                if let Some(station) = world.power_stations.get_mut(index) {
                    station.energy = station.max_energy;
                    station.active = true;
                }
            }
            ScheduledAction::RestoreSpeed => {
                // A later slow field keeps the player slowed
                if !world.scheduler.contains(ScheduledAction::RestoreSpeed) {
                    world.player.slowed = false;
                }
            }
        }
    }
}

fn apply_zoom(world: &mut World, steps: i32) {
    if steps == 0 {
        return;
    }
    let factor: f32 = if steps > 0 { 1.1 } else { 0.9 };
    let zoom = world.camera.target_zoom * factor.powi(steps.abs());
    world.camera.target_zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
}

fn move_player(world: &mut World, movement: Vec2) {
    let bounds = world.bounds();
    let player = &mut world.player;
    let next = player.pos + movement * player.current_speed();
    player.pos = bounds.clamp(next, WORLD_MARGIN);
    player.record_trail();
}

fn pull_magnet_items(world: &mut World) {
    if !world.player.effects.is_active(EffectKind::Magnet) {
        return;
    }
    let target = world.player.pos;
    let range = world.player.upgrades.magnet_range();
    for item in world.energy_items.iter_mut().filter(|i| !i.collected) {
        if item.pos.distance(target) < range {
            item.pos = step_toward(item.pos, target, MAGNET_STEP);
        }
    }
}

fn update_camera(world: &mut World) {
    let desired = world.player.pos - world.viewport() / 2.0;
    let camera = &mut world.camera;
    camera.pos.x = ease(camera.pos.x, desired.x, CAMERA_EASE);
    camera.pos.y = ease(camera.pos.y, desired.y, CAMERA_EASE);
    camera.zoom = ease(camera.zoom, camera.target_zoom, CAMERA_EASE);

    if camera.shake > 0.0 {
        let jitter = Vec2::new(
            world.rng.random::<f32>() - 0.5,
            world.rng.random::<f32>() - 0.5,
        ) * camera.shake;
        camera.pos += jitter;
        camera.shake *= SHAKE_DECAY;
        if camera.shake < 0.01 {
            camera.shake = 0.0;
        }
    }
}

fn advance_pulses(world: &mut World) {
    for item in &mut world.energy_items {
        item.pulse += 0.1;
    }
    for obstacle in &mut world.obstacles {
        obstacle.pulse += 0.05;
    }
    for station in &mut world.power_stations {
        station.pulse += 0.03;
    }
    for enemy in &mut world.enemies {
        enemy.pulse += 0.1;
    }
    for power_up in world.power_ups.iter_mut().filter(|p| !p.collected) {
        power_up.pulse += 0.15;
    }
    for hazard in &mut world.hazards {
        hazard.pulse += 0.08;
    }
    if let Some(boss) = world.mini_boss.as_mut() {
        boss.pulse += 0.05;
    }
}

fn move_enemies(world: &mut World) {
    let target = world.player.pos;
    let bounds = world.bounds();
    for enemy in &mut world.enemies {
        match enemy.behavior {
            EnemyBehavior::Chaser => {
                enemy.pos = step_toward(enemy.pos, target, enemy.speed);
            }
            EnemyBehavior::Patrol => {
                if enemy.pos.distance(enemy.waypoint) < PATROL_ARRIVE_RADIUS {
                    enemy.waypoint = bounds.random_point(&mut world.rng);
                } else {
                    enemy.pos = step_toward(enemy.pos, enemy.waypoint, enemy.speed * 0.5);
                }
            }
        }
    }
}

fn move_mini_boss(world: &mut World) {
    let target = world.player.pos;
    if let Some(boss) = world.mini_boss.as_mut() {
        boss.pos = step_toward(boss.pos, target, boss.speed);
    }
}

fn maybe_spawn_mini_boss(world: &mut World) {
    if world.mini_boss.is_some()
        || world.progression.score <= MINI_BOSS_SCORE_THRESHOLD
        || !world.rng.random_bool(MINI_BOSS_SPAWN_CHANCE)
    {
        return;
    }
    let bounds = world.bounds();
    let boss = spawn::spawn_mini_boss(&mut world.rng, &bounds);
    let pos = boss.pos;
    world.mini_boss = Some(boss);
    world.burst(Burst::MiniBossSpawn, pos);
    world.cue(AudioCue::MiniBossSpawn);
    world.emit(GameEvent::MiniBossSpawned);
    log::info!("Mini-boss spawned at ({:.0}, {:.0})", pos.x, pos.y);
}
