//! Population generation
//!
//! Every generator returns a fresh collection; callers replace the old one
//! wholesale. Attributes are drawn uniformly from fixed ranges.

use glam::Vec2;
use rand::Rng;

use super::state::{
    EnemyBehavior, Enemy, EnergyItem, Hazard, HazardKind, MiniBoss, Obstacle, ObstacleKind,
    PowerStation, PowerUp, PowerUpKind,
};
use crate::consts::*;

/// Energy orb palette
pub const ENERGY_COLORS: [u32; 6] = [0xFFD700, 0x00FF7F, 0xFF6B6B, 0x4ECDC4, 0x45B7D1, 0x96CEB4];

/// Populations the spawner knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnKind {
    EnergyItem,
    Obstacle,
    PowerStation,
    Enemy,
    PowerUp,
    Hazard,
}

impl SpawnKind {
    pub const ALL: [SpawnKind; 6] = [
        SpawnKind::EnergyItem,
        SpawnKind::Obstacle,
        SpawnKind::PowerStation,
        SpawnKind::Enemy,
        SpawnKind::PowerUp,
        SpawnKind::Hazard,
    ];
}

/// Axis-aligned world rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Twice the viewport, centered on the origin
    pub fn from_viewport(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(-width, -height),
            max: Vec2::new(width, height),
        }
    }

    pub fn random_point<R: Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            uniform(rng, self.min.x, self.max.x),
            uniform(rng, self.min.y, self.max.y),
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Clamp a point inside the bounds shrunk by `margin` on every side
    pub fn clamp(&self, p: Vec2, margin: f32) -> Vec2 {
        let lo = self.min + Vec2::splat(margin);
        let hi = self.max - Vec2::splat(margin);
        // A margin wider than the rectangle collapses to the center
        let lo = lo.min((self.min + self.max) / 2.0);
        let hi = hi.max((self.min + self.max) / 2.0);
        p.clamp(lo, hi)
    }
}

/// Uniform draw in [lo, hi)
#[inline]
fn uniform<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}

fn phase<R: Rng>(rng: &mut R) -> f32 {
    uniform(rng, 0.0, std::f32::consts::TAU)
}

pub fn generate_energy_items<R: Rng>(rng: &mut R, count: usize, bounds: &Bounds) -> Vec<EnergyItem> {
    (0..count)
        .map(|_| EnergyItem {
            pos: bounds.random_point(rng),
            radius: uniform(rng, 8.0, 16.0),
            color: ENERGY_COLORS[rng.random_range(0..ENERGY_COLORS.len())],
            pulse: phase(rng),
            collected: false,
            value: rng.random_range(1..=3),
        })
        .collect()
}

pub fn generate_obstacles<R: Rng>(rng: &mut R, count: usize, bounds: &Bounds) -> Vec<Obstacle> {
    (0..count)
        .map(|_| Obstacle {
            pos: bounds.random_point(rng),
            width: uniform(rng, 30.0, 70.0),
            height: uniform(rng, 30.0, 70.0),
            kind: if rng.random_bool(0.5) {
                ObstacleKind::Waste
            } else {
                ObstacleKind::BrokenCircuit
            },
            rotation: phase(rng),
            pulse: phase(rng),
        })
        .collect()
}

pub fn generate_power_stations<R: Rng>(
    rng: &mut R,
    count: usize,
    bounds: &Bounds,
) -> Vec<PowerStation> {
    (0..count)
        .map(|_| PowerStation {
            pos: bounds.random_point(rng),
            radius: uniform(rng, 40.0, 60.0),
            energy: STATION_MAX_ENERGY,
            max_energy: STATION_MAX_ENERGY,
            active: true,
            pulse: phase(rng),
            last_interaction: None,
        })
        .collect()
}

pub fn generate_enemies<R: Rng>(rng: &mut R, count: usize, bounds: &Bounds) -> Vec<Enemy> {
    (0..count)
        .map(|_| Enemy {
            pos: bounds.random_point(rng),
            radius: uniform(rng, 15.0, 25.0),
            speed: uniform(rng, 1.0, 2.5),
            health: 3,
            max_health: 3,
            behavior: if rng.random_bool(0.5) {
                EnemyBehavior::Chaser
            } else {
                EnemyBehavior::Patrol
            },
            waypoint: bounds.random_point(rng),
            pulse: phase(rng),
        })
        .collect()
}

pub fn generate_power_ups<R: Rng>(rng: &mut R, count: usize, bounds: &Bounds) -> Vec<PowerUp> {
    const KINDS: [PowerUpKind; 3] = [PowerUpKind::Shield, PowerUpKind::Magnet, PowerUpKind::Speed];
    (0..count)
        .map(|_| PowerUp {
            pos: bounds.random_point(rng),
            radius: uniform(rng, 12.0, 20.0),
            kind: KINDS[rng.random_range(0..KINDS.len())],
            duration_ms: POWER_UP_DURATION_MS,
            collected: false,
            pulse: phase(rng),
        })
        .collect()
}

pub fn generate_hazards<R: Rng>(rng: &mut R, count: usize, bounds: &Bounds) -> Vec<Hazard> {
    const KINDS: [HazardKind; 3] = [
        HazardKind::EnergyDrain,
        HazardKind::SlowField,
        HazardKind::DamageZone,
    ];
    (0..count)
        .map(|_| Hazard {
            pos: bounds.random_point(rng),
            radius: uniform(rng, 30.0, 50.0),
            kind: KINDS[rng.random_range(0..KINDS.len())],
            active: true,
            pulse: phase(rng),
            last_hit: None,
        })
        .collect()
}

pub fn spawn_mini_boss<R: Rng>(rng: &mut R, bounds: &Bounds) -> MiniBoss {
    MiniBoss {
        pos: bounds.random_point(rng),
        radius: MINI_BOSS_RADIUS,
        speed: MINI_BOSS_SPEED,
        health: MINI_BOSS_HEALTH,
        max_health: MINI_BOSS_HEALTH,
        pulse: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn bounds() -> Bounds {
        Bounds::from_viewport(800.0, 600.0)
    }

    #[test]
    fn test_bounds_centered_on_origin() {
        let b = bounds();
        assert_eq!(b.min, Vec2::new(-800.0, -600.0));
        assert_eq!(b.max, Vec2::new(800.0, 600.0));
    }

    #[test]
    fn test_clamp_with_margin() {
        let b = bounds();
        let p = b.clamp(Vec2::new(5000.0, -5000.0), WORLD_MARGIN);
        assert_eq!(p, Vec2::new(750.0, -550.0));
        let inside = Vec2::new(10.0, 10.0);
        assert_eq!(b.clamp(inside, WORLD_MARGIN), inside);
    }

    #[test]
    fn test_energy_attribute_ranges() {
        let mut rng = Pcg32::seed_from_u64(11);
        let b = bounds();
        let items = generate_energy_items(&mut rng, 200, &b);
        assert_eq!(items.len(), 200);
        for item in &items {
            assert!(b.contains(item.pos));
            assert!((8.0..16.0).contains(&item.radius));
            assert!((1..=3).contains(&item.value));
            assert!(ENERGY_COLORS.contains(&item.color));
            assert!(!item.collected);
        }
        // All three values should show up in a batch this size
        for v in 1..=3 {
            assert!(items.iter().any(|i| i.value == v));
        }
    }

    #[test]
    fn test_enemy_attribute_ranges() {
        let mut rng = Pcg32::seed_from_u64(12);
        let b = bounds();
        let enemies = generate_enemies(&mut rng, 100, &b);
        for e in &enemies {
            assert!((1.0..2.5).contains(&e.speed));
            assert!((15.0..25.0).contains(&e.radius));
            assert!(b.contains(e.waypoint));
        }
        assert!(enemies.iter().any(|e| e.behavior == EnemyBehavior::Chaser));
        assert!(enemies.iter().any(|e| e.behavior == EnemyBehavior::Patrol));
    }

    #[test]
    fn test_stations_and_power_ups() {
        let mut rng = Pcg32::seed_from_u64(13);
        let b = bounds();
        let stations = generate_power_stations(&mut rng, 3, &b);
        assert!(stations.iter().all(|s| s.active && s.energy == 100));
        let power_ups = generate_power_ups(&mut rng, 30, &b);
        assert!(power_ups.iter().all(|p| p.duration_ms == 10_000 && !p.collected));
    }

    #[test]
    fn test_mini_boss_stats() {
        let mut rng = Pcg32::seed_from_u64(14);
        let boss = spawn_mini_boss(&mut rng, &bounds());
        assert_eq!(boss.radius, 40.0);
        assert_eq!(boss.speed, 0.8);
        assert_eq!(boss.health, 10);
    }
}
