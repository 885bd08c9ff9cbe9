//! Collision detection and interaction rules
//!
//! Every entity is a circle (obstacles use half their larger extent). The
//! resolver walks the collections in a fixed order: energy items, obstacles,
//! power stations, enemies, power-ups, mini-boss, hazards. Within a
//! collection, entities are visited in index order.

use glam::Vec2;
use rand::Rng;

use super::effects::Burst;
use super::events::{AudioCue, GameEvent};
use super::progression;
use super::schedule::ScheduledAction;
use super::state::{EffectKind, GamePhase, HazardKind, PowerUpKind, World};
use crate::consts::*;
use crate::direction_to;

/// Strict overlap test: touching circles do not collide
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(b) < a_radius + b_radius
}

/// Per-source consequences of an unabsorbed hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitProfile {
    pub invulnerable_ms: u32,
    pub shake: f32,
    /// Push along the source-to-player axis; applied whether or not a shield absorbs the hit
    pub knockback: f32,
}

pub const ENEMY_HIT: HitProfile = HitProfile {
    invulnerable_ms: ENEMY_INVULNERABLE_MS,
    shake: ENEMY_SHAKE,
    knockback: ENEMY_KNOCKBACK,
};

pub const BOSS_HIT: HitProfile = HitProfile {
    invulnerable_ms: BOSS_INVULNERABLE_MS,
    shake: BOSS_SHAKE,
    knockback: BOSS_KNOCKBACK,
};

pub const DAMAGE_ZONE_HIT: HitProfile = HitProfile {
    invulnerable_ms: HAZARD_INVULNERABLE_MS,
    shake: HAZARD_SHAKE,
    knockback: 0.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// The shield took the hit and is gone
    Absorbed,
    /// Health lost, invulnerability started
    Damaged,
}

/// Run every interaction for the current player position
pub fn resolve(world: &mut World) {
    collect_energy_items(world);
    touch_obstacles(world);
    touch_power_stations(world);
    hit_enemies(world);
    collect_power_ups(world);
    hit_mini_boss(world);
    touch_hazards(world);
}

fn playing(world: &World) -> bool {
    world.phase == GamePhase::Playing
}

fn collect_energy_items(world: &mut World) {
    let (pos, radius) = (world.player.pos, world.player.radius);
    for i in 0..world.energy_items.len() {
        let item = &world.energy_items[i];
        if !item.collected && circles_overlap(pos, radius, item.pos, item.radius) {
            progression::collect_energy(world, i);
        }
    }
}

fn touch_obstacles(world: &mut World) {
    let (pos, radius) = (world.player.pos, world.player.radius);
    let mut obstructed = false;
    for i in 0..world.obstacles.len() {
        let obstacle = &world.obstacles[i];
        if circles_overlap(pos, radius, obstacle.pos, obstacle.half_extent()) {
            obstructed = true;
            if world.rng.random_bool(OBSTACLE_WARNING_CHANCE) {
                world.cue(AudioCue::ObstacleWarning);
            }
        }
    }
    world.player.obstructed = obstructed;
}

fn touch_power_stations(world: &mut World) {
    let (pos, radius) = (world.player.pos, world.player.radius);
    let now = world.time_ms;
    for i in 0..world.power_stations.len() {
        let station = &mut world.power_stations[i];
        if !station.active
            || !station.off_cooldown(now)
            || !circles_overlap(pos, radius, station.pos, station.radius)
        {
            continue;
        }
        station.energy = station.energy.saturating_sub(STATION_DRAIN);
        station.last_interaction = Some(now);
        let depleted = station.energy == 0;
        if depleted {
            station.active = false;
        }
        let station_pos = station.pos;

        world.progression.score += STATION_SCORE;
        world.burst(Burst::StationBoost, station_pos);
        world.cue(AudioCue::PowerStation);

        if depleted {
            let set = world.station_set;
            world.scheduler.schedule(
                now,
                STATION_RECHARGE_MS,
                ScheduledAction::RechargeStation { set, index: i },
            );
            log::trace!("Station {} depleted", i);
        }
    }
}

fn hit_enemies(world: &mut World) {
    for i in 0..world.enemies.len() {
        if !playing(world) || world.player.is_invulnerable() {
            return;
        }
        let enemy = &world.enemies[i];
        if circles_overlap(world.player.pos, world.player.radius, enemy.pos, enemy.radius) {
            let source = enemy.pos;
            take_hit(world, source, ENEMY_HIT);
        }
    }
}

fn collect_power_ups(world: &mut World) {
    let (pos, radius) = (world.player.pos, world.player.radius);
    for i in 0..world.power_ups.len() {
        let power_up = &mut world.power_ups[i];
        if power_up.collected || !circles_overlap(pos, radius, power_up.pos, power_up.radius) {
            continue;
        }
        power_up.collected = true;
        let (kind, at, duration) = (power_up.kind, power_up.pos, power_up.duration_ms);

        let duration = match kind {
            PowerUpKind::Shield => world.player.upgrades.shield_duration(duration),
            _ => duration,
        };
        world.player.effects.set(kind.effect(), duration);

        let (pickup, gained) = match kind {
            PowerUpKind::Shield => (Burst::PowerUpShield, Burst::ShieldGained),
            PowerUpKind::Magnet => (Burst::PowerUpMagnet, Burst::MagnetGained),
            PowerUpKind::Speed => (Burst::PowerUpSpeed, Burst::SpeedGained),
        };
        world.burst(pickup, at);
        world.burst(gained, pos);
        world.cue(AudioCue::PowerUp);

        let action = ScheduledAction::RegeneratePowerUps {
            set: world.power_up_set,
        };
        if !world.scheduler.contains(action) {
            world
                .scheduler
                .schedule(world.time_ms, POWER_UP_REGEN_DELAY_MS, action);
        }
    }
}

fn hit_mini_boss(world: &mut World) {
    if !playing(world) || world.player.is_invulnerable() {
        return;
    }
    let Some(boss) = world.mini_boss.as_ref() else {
        return;
    };
    if circles_overlap(world.player.pos, world.player.radius, boss.pos, boss.radius) {
        let source = boss.pos;
        take_hit(world, source, BOSS_HIT);
    }
}

fn touch_hazards(world: &mut World) {
    let (pos, radius) = (world.player.pos, world.player.radius);
    let now = world.time_ms;
    for i in 0..world.hazards.len() {
        if !playing(world) {
            return;
        }
        let hazard = &mut world.hazards[i];
        if !hazard.active
            || !hazard.off_cooldown(now)
            || !circles_overlap(pos, radius, hazard.pos, hazard.radius)
        {
            continue;
        }
        hazard.last_hit = Some(now);
        let (kind, at) = (hazard.kind, hazard.pos);

        match kind {
            HazardKind::EnergyDrain => {
                progression::add_charge(world, -ENERGY_DRAIN_AMOUNT);
                world.burst(Burst::EnergyDrain, pos);
            }
            HazardKind::SlowField => {
                world.player.slowed = true;
                world
                    .scheduler
                    .schedule(now, SLOW_FIELD_MS as u64, ScheduledAction::RestoreSpeed);
                world.burst(Burst::SlowField, pos);
            }
            HazardKind::DamageZone => {
                if !world.player.is_invulnerable() {
                    take_hit(world, at, DAMAGE_ZONE_HIT);
                }
            }
        }
    }
}

/// Apply a hit from something at `source`. A shield soaks it; otherwise the
/// player loses a health point and turns invulnerable.
pub fn take_hit(world: &mut World, source: Vec2, profile: HitProfile) -> HitOutcome {
    let pos = world.player.pos;
    let outcome = if world.player.effects.is_active(EffectKind::Shield) {
        world.player.effects.set(EffectKind::Shield, 0);
        world.burst(Burst::ShieldBreak, pos);
        HitOutcome::Absorbed
    } else {
        world
            .player
            .effects
            .set(EffectKind::Invulnerable, profile.invulnerable_ms);
        world.shake(profile.shake);
        world.burst(Burst::Damage, pos);
        world.cue(AudioCue::Damage);
        world.player.health = world.player.health.saturating_sub(1);
        HitOutcome::Damaged
    };

    // Knockback lands on absorbed hits too
    if profile.knockback > 0.0 {
        if let Some((dir, _)) = direction_to(source, pos) {
            let bounds = world.bounds();
            world.player.pos = bounds.clamp(pos + dir * profile.knockback, WORLD_MARGIN);
        }
    }

    if world.player.health == 0 && world.phase == GamePhase::Playing {
        world.phase = GamePhase::GameOver;
        let score = world.progression.score;
        world.emit(GameEvent::RunEnded { score });
        log::info!("Run ended with score {}", score);
    }
    outcome
}
