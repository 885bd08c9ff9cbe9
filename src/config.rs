//! Engine configuration
//!
//! Viewport size, population sizes and presentation budgets. Hosts build one
//! in code or load it from JSON; every entry point runs it through
//! [`EngineConfig::sanitized`] so bad values are clamped, never rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_PARTICLES, MIN_VIEWPORT_HEIGHT, MIN_VIEWPORT_WIDTH};
use crate::sim::spawn::SpawnKind;

/// Upper bound on any single population
const MAX_SPAWN_COUNT: usize = 256;
/// Upper bound on the particle budget
const MAX_PARTICLE_BUDGET: usize = 4096;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How many of each entity a regeneration produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnCounts {
    pub energy_items: usize,
    pub obstacles: usize,
    pub power_stations: usize,
    pub enemies: usize,
    pub power_ups: usize,
    pub hazards: usize,
}

impl Default for SpawnCounts {
    fn default() -> Self {
        Self {
            energy_items: 15,
            obstacles: 8,
            power_stations: 3,
            enemies: 5,
            power_ups: 3,
            hazards: 4,
        }
    }
}

impl SpawnCounts {
    pub fn count(&self, kind: SpawnKind) -> usize {
        match kind {
            SpawnKind::EnergyItem => self.energy_items,
            SpawnKind::Obstacle => self.obstacles,
            SpawnKind::PowerStation => self.power_stations,
            SpawnKind::Enemy => self.enemies,
            SpawnKind::PowerUp => self.power_ups,
            SpawnKind::Hazard => self.hazards,
        }
    }

    fn clamped(self) -> Self {
        let c = |n: usize| n.min(MAX_SPAWN_COUNT);
        Self {
            energy_items: c(self.energy_items),
            obstacles: c(self.obstacles),
            power_stations: c(self.power_stations),
            enemies: c(self.enemies),
            power_ups: c(self.power_ups),
            hazards: c(self.hazards),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub spawn: SpawnCounts,
    /// Oldest particles are dropped past this
    pub max_particles: usize,
    /// Camera shake on hits and pickups
    pub screen_shake: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 720.0,
            spawn: SpawnCounts::default(),
            max_particles: MAX_PARTICLES,
            screen_shake: true,
        }
    }
}

impl EngineConfig {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            viewport_width,
            viewport_height,
            ..Self::default()
        }
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Clamp every field into its usable range
    pub fn sanitized(mut self) -> Self {
        self.viewport_width = clamp_dimension(self.viewport_width, MIN_VIEWPORT_WIDTH);
        self.viewport_height = clamp_dimension(self.viewport_height, MIN_VIEWPORT_HEIGHT);
        self.max_particles = self.max_particles.min(MAX_PARTICLE_BUDGET);
        self.spawn = self.spawn.clamped();
        self
    }
}

fn clamp_dimension(value: f32, min: f32) -> f32 {
    if value.is_finite() { value.max(min) } else { min }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.spawn.count(SpawnKind::EnergyItem), 15);
        assert_eq!(config.spawn.count(SpawnKind::Hazard), 4);
        assert_eq!(config.max_particles, 512);
        assert!(config.screen_shake);
    }

    #[test]
    fn test_sanitize_clamps_viewport() {
        let config = EngineConfig::new(f32::INFINITY, 10.0).sanitized();
        assert_eq!(config.viewport_width, MIN_VIEWPORT_WIDTH);
        assert_eq!(config.viewport_height, MIN_VIEWPORT_HEIGHT);

        let config = EngineConfig::new(1920.0, 1080.0).sanitized();
        assert_eq!(config.viewport_width, 1920.0);
    }

    #[test]
    fn test_sanitize_clamps_budgets() {
        let mut config = EngineConfig::default();
        config.max_particles = 1_000_000;
        config.spawn.enemies = 10_000;
        let config = config.sanitized();
        assert_eq!(config.max_particles, MAX_PARTICLE_BUDGET);
        assert_eq!(config.spawn.enemies, MAX_SPAWN_COUNT);
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            EngineConfig::from_json(r#"{"viewport_width": 800, "spawn": {"enemies": 2}}"#)
                .unwrap();
        assert_eq!(config.viewport_width, 800.0);
        assert_eq!(config.viewport_height, 720.0);
        assert_eq!(config.spawn.enemies, 2);
        assert_eq!(config.spawn.energy_items, 15);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = EngineConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("invalid config document"));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EngineConfig::new(1024.0, 768.0);
        let back = EngineConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(config, back);
    }
}
