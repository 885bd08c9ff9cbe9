//! World state and core simulation types
//!
//! All state the frame loop mutates lives here. Other stages read and write
//! it in place; nothing is copied between stages.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::achievements::{self, AchievementStatus};
use super::effects::{self, Burst, Tween, TweenTarget};
use super::events::{AudioCue, GameEvent};
use super::schedule::Scheduler;
use super::spawn::{self, Bounds, SpawnKind};
use crate::config::EngineConfig;
use crate::consts::*;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Health ran out; frames are no-ops until reset
    GameOver,
}

/// Timed player effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Shield,
    Magnet,
    SpeedBoost,
    Invulnerable,
}

impl EffectKind {
    pub const ALL: [EffectKind; 4] = [
        EffectKind::Shield,
        EffectKind::Magnet,
        EffectKind::SpeedBoost,
        EffectKind::Invulnerable,
    ];

    fn index(self) -> usize {
        match self {
            EffectKind::Shield => 0,
            EffectKind::Magnet => 1,
            EffectKind::SpeedBoost => 2,
            EffectKind::Invulnerable => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Shield => "shield",
            EffectKind::Magnet => "magnet",
            EffectKind::SpeedBoost => "speedBoost",
            EffectKind::Invulnerable => "invulnerable",
        }
    }
}

/// Remaining duration (ms) per effect kind. An effect is active iff its counter is non-zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effects {
    remaining: [u32; 4],
}

impl Effects {
    pub fn get(&self, kind: EffectKind) -> u32 {
        self.remaining[kind.index()]
    }

    pub fn set(&mut self, kind: EffectKind, ms: u32) {
        self.remaining[kind.index()] = ms;
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.get(kind) > 0
    }

    /// Count every effect down by `dt_ms`, saturating at zero
    pub fn tick(&mut self, dt_ms: u32) {
        for ms in &mut self.remaining {
            *ms = ms.saturating_sub(dt_ms);
        }
    }

    /// Active effects with their remaining time, in `EffectKind::ALL` order
    pub fn active(&self) -> impl Iterator<Item = (EffectKind, u32)> + '_ {
        EffectKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
            .filter(|(_, ms)| *ms > 0)
    }

    pub fn clear(&mut self) {
        self.remaining = [0; 4];
    }
}

/// Multipliers that persist across levels and resets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Upgrades {
    pub max_health: f32,
    pub speed: f32,
    pub magnet_range: f32,
    pub shield_duration: f32,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            max_health: 1.0,
            speed: 1.0,
            magnet_range: 1.0,
            shield_duration: 1.0,
        }
    }
}

impl Upgrades {
    /// Base movement speed with the speed upgrade applied
    pub fn base_speed(&self) -> f32 {
        PLAYER_BASE_SPEED + (self.speed - 1.0) * 0.5
    }

    pub fn max_health(&self) -> u32 {
        ((PLAYER_BASE_HEALTH as f32 * self.max_health).round() as u32).max(1)
    }

    pub fn magnet_range(&self) -> f32 {
        MAGNET_RANGE * self.magnet_range
    }

    pub fn shield_duration(&self, base_ms: u32) -> u32 {
        (base_ms as f32 * self.shield_duration).round() as u32
    }
}

/// The player aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    /// Unmodified speed; reapplied on level-up
    pub base_speed: f32,
    pub health: u32,
    pub max_health: u32,
    pub effects: Effects,
    /// Recent positions, oldest first (rendering only)
    pub trail: VecDeque<Vec2>,
    pub ultimate_charge: f32,
    pub upgrades: Upgrades,
    /// Overlapping an obstacle as of the last resolve
    pub obstructed: bool,
    /// Inside a slow field window
    pub slowed: bool,
}

impl Player {
    pub fn new(upgrades: Upgrades) -> Self {
        let max_health = upgrades.max_health();
        Self {
            pos: Vec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1),
            radius: PLAYER_RADIUS,
            base_speed: upgrades.base_speed(),
            health: max_health,
            max_health,
            effects: Effects::default(),
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
            ultimate_charge: 0.0,
            upgrades,
            obstructed: false,
            slowed: false,
        }
    }

    /// Record current position to the trail, dropping the oldest on overflow
    pub fn record_trail(&mut self) {
        self.trail.push_back(self.pos);
        while self.trail.len() > TRAIL_LENGTH {
            self.trail.pop_front();
        }
    }

    /// Effective speed this frame, derived from terrain, slow fields and boosts
    pub fn current_speed(&self) -> f32 {
        let mut speed = if self.obstructed {
            OBSTRUCTED_SPEED
        } else {
            self.base_speed
        };
        if self.slowed {
            speed = (speed * 0.5).max(SLOWED_MIN_SPEED);
        }
        if self.effects.is_active(EffectKind::SpeedBoost) {
            speed *= 2.0;
        }
        speed
    }

    pub fn is_invulnerable(&self) -> bool {
        self.effects.is_active(EffectKind::Invulnerable)
    }

    pub fn ultimate_ready(&self) -> bool {
        self.ultimate_charge >= ULTIMATE_MAX
    }
}

/// A collectible energy orb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyItem {
    pub pos: Vec2,
    pub radius: f32,
    /// 0xRRGGBB
    pub color: u32,
    /// 1..=3
    pub value: u32,
    pub pulse: f32,
    pub collected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Waste,
    BrokenCircuit,
}

/// Static terrain that slows the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub kind: ObstacleKind,
    pub rotation: f32,
    pub pulse: f32,
}

impl Obstacle {
    /// Collision radius: half of the larger extent
    pub fn half_extent(&self) -> f32 {
        self.width.max(self.height) / 2.0
    }
}

/// A drainable score source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerStation {
    pub pos: Vec2,
    pub radius: f32,
    pub energy: u32,
    pub max_energy: u32,
    pub active: bool,
    pub pulse: f32,
    /// Engine time of the last successful interaction
    pub last_interaction: Option<u64>,
}

impl PowerStation {
    pub fn off_cooldown(&self, now_ms: u64) -> bool {
        self.last_interaction
            .is_none_or(|last| now_ms.saturating_sub(last) > STATION_COOLDOWN_MS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyBehavior {
    /// Moves straight at the player
    Chaser,
    /// Wanders between random waypoints at half speed
    Patrol,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub health: u32,
    pub max_health: u32,
    pub behavior: EnemyBehavior,
    pub waypoint: Vec2,
    pub pulse: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    Magnet,
    Speed,
}

impl PowerUpKind {
    pub fn effect(&self) -> EffectKind {
        match self {
            PowerUpKind::Shield => EffectKind::Shield,
            PowerUpKind::Magnet => EffectKind::Magnet,
            PowerUpKind::Speed => EffectKind::SpeedBoost,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: PowerUpKind,
    pub duration_ms: u32,
    pub collected: bool,
    pub pulse: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    EnergyDrain,
    SlowField,
    DamageZone,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: HazardKind,
    pub active: bool,
    pub pulse: f32,
    pub last_hit: Option<u64>,
}

impl Hazard {
    pub fn off_cooldown(&self, now_ms: u64) -> bool {
        self.last_hit
            .is_none_or(|last| now_ms.saturating_sub(last) > HAZARD_COOLDOWN_MS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiniBoss {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub health: u32,
    pub max_health: u32,
    pub pulse: f32,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases by `decay` every frame
    pub life: f32,
    pub decay: f32,
    pub radius: f32,
    pub color: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Top-left corner of the view in world units
    pub pos: Vec2,
    pub zoom: f32,
    pub target_zoom: f32,
    pub shake: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            zoom: 1.0,
            target_zoom: 1.0,
            shake: 0.0,
        }
    }
}

/// Score, combo, leveling and difficulty counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    pub score: u64,
    pub combo: u32,
    pub last_collection_ms: Option<u64>,
    pub level: u32,
    pub experience: u32,
    pub experience_to_next: u32,
    pub difficulty: u32,
    // High-water marks, used by achievements
    pub best_combo: u32,
    pub peak_charge: f32,
    pub items_collected: u64,
    pub bosses_defeated: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            score: 0,
            combo: 0,
            last_collection_ms: None,
            level: 1,
            experience: 0,
            experience_to_next: STARTING_XP_TO_NEXT,
            difficulty: 1,
            best_combo: 0,
            peak_charge: 0.0,
            items_collected: 0,
            bosses_defeated: 0,
        }
    }
}

impl Progression {
    /// Score multiplier derived from the current combo: 1, 1, 1.5, 2, ... capped at 5
    pub fn combo_multiplier(&self) -> f32 {
        (1.0 + self.combo.saturating_sub(1) as f32 * 0.5).min(MAX_COMBO_MULTIPLIER)
    }

    /// Fraction of the way to the next level
    pub fn experience_ratio(&self) -> f32 {
        if self.experience_to_next == 0 {
            return 0.0;
        }
        (self.experience as f32 / self.experience_to_next as f32).clamp(0.0, 1.0)
    }
}

/// Complete world state
#[derive(Debug, Clone)]
pub struct World {
    pub config: EngineConfig,
    pub rng: Pcg32,
    /// Engine clock (ms of simulated play)
    pub time_ms: u64,
    pub phase: GamePhase,
    pub player: Player,
    pub camera: Camera,
    pub energy_items: Vec<EnergyItem>,
    pub obstacles: Vec<Obstacle>,
    pub power_stations: Vec<PowerStation>,
    pub enemies: Vec<Enemy>,
    pub power_ups: Vec<PowerUp>,
    pub hazards: Vec<Hazard>,
    pub mini_boss: Option<MiniBoss>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub tweens: Vec<Tween>,
    pub progression: Progression,
    pub achievements: Vec<AchievementStatus>,
    pub scheduler: Scheduler,
    /// Generation of each regenerable collection; bumped on every regeneration
    pub energy_batch: u32,
    pub power_up_set: u32,
    pub station_set: u32,
    /// A regeneration of the current energy batch is already queued
    pub energy_regen_pending: bool,
    /// Output for the host, drained once per frame
    pub events: Vec<GameEvent>,
}

impl World {
    /// Create a world populated with the configured spawn counts
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        let config = config.sanitized();
        let mut world = Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            time_ms: 0,
            phase: GamePhase::Playing,
            player: Player::new(Upgrades::default()),
            camera: Camera::default(),
            energy_items: Vec::new(),
            obstacles: Vec::new(),
            power_stations: Vec::new(),
            enemies: Vec::new(),
            power_ups: Vec::new(),
            hazards: Vec::new(),
            mini_boss: None,
            particles: Vec::new(),
            tweens: Vec::new(),
            progression: Progression::default(),
            achievements: achievements::initial_statuses(),
            scheduler: Scheduler::default(),
            energy_batch: 0,
            power_up_set: 0,
            station_set: 0,
            energy_regen_pending: false,
            events: Vec::new(),
        };
        world.populate();
        world.snap_camera();
        world
    }

    /// World rectangle: twice the viewport, centered on the origin
    pub fn bounds(&self) -> Bounds {
        Bounds::from_viewport(self.config.viewport_width, self.config.viewport_height)
    }

    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.config.viewport_width, self.config.viewport_height)
    }

    /// Restore the player and repopulate every collection. Upgrades and
    /// unlocked achievements are kept.
    pub fn reset(&mut self) {
        let upgrades = self.player.upgrades;
        self.player = Player::new(upgrades);
        self.camera = Camera::default();
        self.time_ms = 0;
        self.phase = GamePhase::Playing;
        self.progression = Progression::default();
        self.particles.clear();
        self.tweens.clear();
        self.mini_boss = None;
        self.scheduler.clear();
        self.events.clear();
        self.populate();
        self.snap_camera();
        log::info!("World reset");
    }

    /// Update viewport dimensions without touching entities
    pub fn resize(&mut self, width: f32, height: f32) {
        let mut config = self.config.clone();
        config.viewport_width = width;
        config.viewport_height = height;
        self.config = config.sanitized();
    }

    fn populate(&mut self) {
        for kind in SpawnKind::ALL {
            self.regenerate(kind);
        }
    }

    /// Replace a whole collection with a fresh population of the configured size
    pub fn regenerate(&mut self, kind: SpawnKind) {
        let bounds = self.bounds();
        let count = self.config.spawn.count(kind);
        let rng = &mut self.rng;
        match kind {
            SpawnKind::EnergyItem => {
                self.energy_items = spawn::generate_energy_items(rng, count, &bounds);
                self.energy_batch = self.energy_batch.wrapping_add(1);
                self.energy_regen_pending = false;
            }
            SpawnKind::Obstacle => {
                self.obstacles = spawn::generate_obstacles(rng, count, &bounds);
            }
            SpawnKind::PowerStation => {
                self.power_stations = spawn::generate_power_stations(rng, count, &bounds);
                self.station_set = self.station_set.wrapping_add(1);
            }
            SpawnKind::Enemy => {
                self.enemies = spawn::generate_enemies(rng, count, &bounds);
            }
            SpawnKind::PowerUp => {
                self.power_ups = spawn::generate_power_ups(rng, count, &bounds);
                self.power_up_set = self.power_up_set.wrapping_add(1);
            }
            SpawnKind::Hazard => {
                self.hazards = spawn::generate_hazards(rng, count, &bounds);
            }
        }
    }

    fn snap_camera(&mut self) {
        self.camera.pos = self.player.pos - self.viewport() / 2.0;
    }

    // === Side-effect helpers used by every stage ===

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn cue(&mut self, cue: AudioCue) {
        self.events.push(GameEvent::Cue(cue));
    }

    pub fn burst(&mut self, burst: Burst, pos: Vec2) {
        self.burst_tinted(burst, pos, 0);
    }

    pub fn burst_tinted(&mut self, burst: Burst, pos: Vec2, tint: u32) {
        let max = self.config.max_particles;
        effects::emit_burst(&mut self.particles, &mut self.rng, burst, pos, tint, max);
    }

    /// Set camera shake (no-op when shake is disabled by the host)
    pub fn shake(&mut self, magnitude: f32) {
        if self.config.screen_shake {
            self.camera.shake = magnitude;
        }
    }

    pub fn tween(&mut self, target: TweenTarget, duration_ms: u32, amplitude: f32) {
        self.tweens.push(Tween::new(target, duration_ms, amplitude));
    }

    /// Player body scale for rendering
    pub fn player_scale(&self) -> f32 {
        1.0 + effects::tween_offset(&self.tweens, TweenTarget::PlayerScale)
    }

    /// Camera zoom for rendering
    pub fn render_zoom(&self) -> f32 {
        self.camera.zoom + effects::tween_offset(&self.tweens, TweenTarget::CameraZoom)
    }
}
