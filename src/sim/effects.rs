//! Visual-only effects: particle bursts and tweens
//!
//! Nothing in here feeds back into gameplay. Particles and tweens are advanced
//! by the simulation step and read by the presentation layer.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Particle;

/// Named particle burst presets (count, spread, decay, size range, color)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Burst {
    Collect,
    PowerUpShield,
    PowerUpMagnet,
    PowerUpSpeed,
    ShieldGained,
    MagnetGained,
    SpeedGained,
    ShieldBreak,
    Damage,
    MiniBossSpawn,
    LevelUp,
    Achievement,
    Ultimate,
    Difficulty,
    EnergyDrain,
    SlowField,
    StationBoost,
}

struct BurstSpec {
    count: usize,
    spread: f32,
    decay: f32,
    min_size: f32,
    color: u32,
}

impl Burst {
    fn spec(&self) -> BurstSpec {
        let (count, spread, decay, min_size, color) = match self {
            Burst::Collect => (8, 4.0, 0.02, 3.0, 0),
            Burst::PowerUpShield => (12, 6.0, 0.015, 4.0, 0x00BFFF),
            Burst::PowerUpMagnet => (12, 6.0, 0.015, 4.0, 0xFFD700),
            Burst::PowerUpSpeed => (12, 6.0, 0.015, 4.0, 0xFF6B6B),
            Burst::ShieldGained => (20, 8.0, 0.01, 5.0, 0x00BFFF),
            Burst::MagnetGained => (15, 6.0, 0.012, 3.0, 0xFFD700),
            Burst::SpeedGained => (10, 10.0, 0.02, 2.0, 0xFF6B6B),
            Burst::ShieldBreak => (25, 12.0, 0.03, 4.0, 0x00BFFF),
            Burst::Damage => (30, 15.0, 0.04, 3.0, 0xFF4444),
            Burst::MiniBossSpawn => (50, 20.0, 0.01, 6.0, 0x8B0000),
            Burst::LevelUp => (30, 10.0, 0.01, 5.0, 0xFFD700),
            Burst::Achievement => (25, 8.0, 0.015, 4.0, 0x00FF7F),
            Burst::Ultimate => (100, 25.0, 0.02, 8.0, 0xFF00FF),
            Burst::Difficulty => (40, 15.0, 0.01, 6.0, 0xFF4500),
            Burst::EnergyDrain => (15, 8.0, 0.02, 3.0, 0xFF4500),
            Burst::SlowField => (20, 6.0, 0.015, 4.0, 0x4169E1),
            Burst::StationBoost => (12, 6.0, 0.015, 4.0, 0x00BFFF),
        };
        BurstSpec {
            count,
            spread,
            decay,
            min_size,
            color,
        }
    }

    /// Number of particles this burst emits
    pub fn count(&self) -> usize {
        self.spec().count
    }
}

/// Emit a burst at `pos`. `tint` overrides the preset color when non-zero
/// (collection particles take the item's color).
pub fn emit_burst<R: Rng>(
    particles: &mut Vec<Particle>,
    rng: &mut R,
    burst: Burst,
    pos: Vec2,
    tint: u32,
    max_particles: usize,
) {
    let spec = burst.spec();
    let color = if tint != 0 { tint } else { spec.color };
    for _ in 0..spec.count {
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * spec.spread,
            (rng.random::<f32>() - 0.5) * spec.spread,
        );
        particles.push(Particle {
            pos,
            vel,
            life: 1.0,
            decay: spec.decay,
            radius: spec.min_size + rng.random::<f32>() * spec.min_size,
            color,
        });
    }
    if particles.len() > max_particles {
        let excess = particles.len() - max_particles;
        particles.drain(..excess);
    }
}

/// Integrate particles one frame and drop the dead ones
pub fn update_particles(particles: &mut Vec<Particle>) {
    for p in particles.iter_mut() {
        p.pos += p.vel;
        p.life -= p.decay;
        p.vel *= 0.98;
    }
    particles.retain(|p| p.life > 0.0);
}

/// What a tween animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TweenTarget {
    /// Player body scale (collection "pop")
    PlayerScale,
    /// Additive camera zoom (level-up punch)
    CameraZoom,
}

/// Short-lived declarative animation, advanced by the simulation step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tween {
    pub target: TweenTarget,
    pub elapsed_ms: u32,
    pub duration_ms: u32,
    pub amplitude: f32,
}

impl Tween {
    pub fn new(target: TweenTarget, duration_ms: u32, amplitude: f32) -> Self {
        Self {
            target,
            elapsed_ms: 0,
            duration_ms: duration_ms.max(1),
            amplitude,
        }
    }

    /// Half-sine bounce: 0 at both ends, `amplitude` at the midpoint
    pub fn value(&self) -> f32 {
        let t = (self.elapsed_ms as f32 / self.duration_ms as f32).clamp(0.0, 1.0);
        self.amplitude * (t * std::f32::consts::PI).sin()
    }

    pub fn finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

/// Advance tweens and drop finished ones
pub fn update_tweens(tweens: &mut Vec<Tween>, dt_ms: u32) {
    for tween in tweens.iter_mut() {
        tween.elapsed_ms = tween.elapsed_ms.saturating_add(dt_ms);
    }
    tweens.retain(|t| !t.finished());
}

/// Sum of active tween offsets for a target
pub fn tween_offset(tweens: &[Tween], target: TweenTarget) -> f32 {
    tweens
        .iter()
        .filter(|t| t.target == target)
        .map(Tween::value)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_burst_respects_cap() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut particles = Vec::new();
        emit_burst(&mut particles, &mut rng, Burst::Ultimate, Vec2::ZERO, 0, 64);
        assert_eq!(particles.len(), 64);
    }

    #[test]
    fn test_tint_overrides_color() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut particles = Vec::new();
        emit_burst(&mut particles, &mut rng, Burst::Collect, Vec2::ZERO, 0xFFD700, 512);
        assert_eq!(particles.len(), Burst::Collect.count());
        assert!(particles.iter().all(|p| p.color == 0xFFD700));
    }

    #[test]
    fn test_particles_die() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut particles = Vec::new();
        emit_burst(&mut particles, &mut rng, Burst::Damage, Vec2::ZERO, 0, 512);
        // decay 0.04 -> gone after 25 frames
        for _ in 0..26 {
            update_particles(&mut particles);
        }
        assert!(particles.is_empty());
    }

    #[test]
    fn test_tween_lifecycle() {
        let mut tweens = vec![Tween::new(TweenTarget::PlayerScale, 200, 0.3)];
        update_tweens(&mut tweens, 100);
        let mid = tween_offset(&tweens, TweenTarget::PlayerScale);
        assert!((mid - 0.3).abs() < 1e-4);
        assert_eq!(tween_offset(&tweens, TweenTarget::CameraZoom), 0.0);
        update_tweens(&mut tweens, 100);
        assert!(tweens.is_empty());
    }
}
