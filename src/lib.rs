//! Energy Quest - top-down arcade engine for the learning platform
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (entities, collisions, progression, achievements)
//! - `engine`: Host-facing facade (start/stop, input queue, cue dispatch)
//! - `config`: Engine configuration (viewport, spawn counts, particle budget)
//! - `settings`: Player preferences persisted by the host
//! - `audio`: Audio cue hook and Web Audio synthesizer
//! - `highscores`: Local leaderboard and run summaries for the score service

pub mod audio;
pub mod config;
pub mod engine;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use config::{ConfigError, EngineConfig, SpawnCounts};
pub use engine::Engine;
pub use highscores::{HighScores, RunSummary};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed frame tick in milliseconds (60 Hz assumption)
    pub const FRAME_MS: u32 = 16;

    /// Smallest viewport the engine accepts; anything below is clamped up
    pub const MIN_VIEWPORT_WIDTH: f32 = 320.0;
    pub const MIN_VIEWPORT_HEIGHT: f32 = 240.0;
    /// Keep-out margin between the player and the world edge
    pub const WORLD_MARGIN: f32 = 50.0;

    /// Player defaults
    pub const PLAYER_SPAWN: (f32, f32) = (100.0, 100.0);
    pub const PLAYER_RADIUS: f32 = 20.0;
    pub const PLAYER_BASE_SPEED: f32 = 3.0;
    pub const PLAYER_BASE_HEALTH: u32 = 3;
    /// Speed while overlapping an obstacle
    pub const OBSTRUCTED_SPEED: f32 = 1.5;
    /// Slow fields halve speed, never below this
    pub const SLOWED_MIN_SPEED: f32 = 1.0;
    pub const SLOW_FIELD_MS: u32 = 3000;
    pub const TRAIL_LENGTH: usize = 20;

    /// Magnet pull
    pub const MAGNET_RANGE: f32 = 100.0;
    pub const MAGNET_STEP: f32 = 0.3;

    /// Camera smoothing
    pub const CAMERA_EASE: f32 = 0.05;
    pub const SHAKE_DECAY: f32 = 0.9;
    pub const MIN_ZOOM: f32 = 0.5;
    pub const MAX_ZOOM: f32 = 2.0;

    /// Ultimate ability
    pub const ULTIMATE_MAX: f32 = 100.0;
    pub const ULTIMATE_DECAY_PER_FRAME: f32 = 0.1;
    pub const ULTIMATE_REBATE: f32 = 5.0;
    pub const ULTIMATE_BOSS_DAMAGE: u32 = 5;

    /// Combo window and cap
    pub const COMBO_WINDOW_MS: u64 = 2000;
    pub const MAX_COMBO_MULTIPLIER: f32 = 5.0;

    /// Leveling curve
    pub const STARTING_XP_TO_NEXT: u32 = 100;
    pub const XP_CURVE: f32 = 1.2;

    /// Difficulty escalation
    pub const DIFFICULTY_PERIOD_MS: u64 = 30_000;
    pub const ESCALATION_SPEED_BONUS: f32 = 0.2;

    /// Delayed regeneration
    pub const ENERGY_REGEN_DELAY_MS: u64 = 1000;
    pub const POWER_UP_REGEN_DELAY_MS: u64 = 2000;

    /// Power stations
    pub const STATION_MAX_ENERGY: u32 = 100;
    pub const STATION_DRAIN: u32 = 20;
    pub const STATION_SCORE: u64 = 5;
    pub const STATION_COOLDOWN_MS: u64 = 2000;
    pub const STATION_RECHARGE_MS: u64 = 10_000;

    /// Power-ups
    pub const POWER_UP_DURATION_MS: u32 = 10_000;

    /// Hazards
    pub const HAZARD_COOLDOWN_MS: u64 = 1000;
    pub const ENERGY_DRAIN_AMOUNT: f32 = 10.0;

    /// Enemy patrol retarget distance
    pub const PATROL_ARRIVE_RADIUS: f32 = 50.0;

    /// Mini-boss
    pub const MINI_BOSS_RADIUS: f32 = 40.0;
    pub const MINI_BOSS_SPEED: f32 = 0.8;
    pub const MINI_BOSS_HEALTH: u32 = 10;
    pub const MINI_BOSS_SCORE_THRESHOLD: u64 = 50;
    pub const MINI_BOSS_SPAWN_CHANCE: f64 = 0.001;

    /// Invulnerability windows (ms) after a hit
    pub const ENEMY_INVULNERABLE_MS: u32 = 2000;
    pub const BOSS_INVULNERABLE_MS: u32 = 3000;
    pub const HAZARD_INVULNERABLE_MS: u32 = 1000;

    /// Knockback impulses
    pub const ENEMY_KNOCKBACK: f32 = 30.0;
    pub const BOSS_KNOCKBACK: f32 = 50.0;

    /// Camera shake magnitudes
    pub const COLLECT_SHAKE: f32 = 5.0;
    pub const ENEMY_SHAKE: f32 = 10.0;
    pub const BOSS_SHAKE: f32 = 15.0;
    pub const HAZARD_SHAKE: f32 = 8.0;

    /// Chance per overlapping frame of the obstacle warning cue
    pub const OBSTACLE_WARNING_CHANCE: f64 = 0.01;

    /// Default particle budget
    pub const MAX_PARTICLES: usize = 512;
}

/// Unit vector and distance from `from` toward `to`, or `None` when they coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Option<(Vec2, f32)> {
    let delta = to - from;
    let distance = delta.length();
    if distance > 0.0 {
        Some((delta / distance, distance))
    } else {
        None
    }
}

/// Move `pos` toward `target` by `step` units (never overshoots the zero-distance case)
#[inline]
pub fn step_toward(pos: Vec2, target: Vec2, step: f32) -> Vec2 {
    match direction_to(pos, target) {
        Some((dir, _)) => pos + dir * step,
        None => pos,
    }
}

/// Exponential smoothing toward a target
#[inline]
pub fn ease(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_to() {
        let (dir, dist) = direction_to(Vec2::ZERO, Vec2::new(3.0, 4.0)).unwrap();
        assert!((dist - 5.0).abs() < 1e-5);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(direction_to(Vec2::ONE, Vec2::ONE).is_none());
    }

    #[test]
    fn test_step_toward_zero_distance() {
        let p = Vec2::new(2.0, 2.0);
        assert_eq!(step_toward(p, p, 1.0), p);
        let moved = step_toward(Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0);
        assert!((moved.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ease() {
        assert!((ease(0.0, 100.0, 0.05) - 5.0).abs() < 1e-5);
    }
}
