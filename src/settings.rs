//! Player preferences
//!
//! Written to LocalStorage by the platform's settings page, separate from
//! scores; the game only reads them. Presentation budgets flow into the
//! engine through [`Settings::apply_to`].

use serde::{Deserialize, Serialize};

use crate::audio::Mixer;
use crate::config::EngineConfig;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Particle budget for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 300,
            QualityPreset::High => 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Camera shake on hits and pickups
    pub screen_shake: bool,
    /// Particle bursts
    pub particles: bool,

    // === HUD ===
    /// How long an achievement toast stays up
    pub achievement_toast_ms: u32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            screen_shake: true,
            particles: true,
            achievement_toast_ms: 3000,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Copy presentation budgets into an engine config
    pub fn apply_to(&self, config: &mut EngineConfig) {
        config.max_particles = self.max_particles();
        config.screen_shake = self.effective_screen_shake();
    }

    /// Copy volume preferences into a mixer
    pub fn apply_to_mixer(&self, mixer: &mut Mixer) {
        mixer.set_master_volume(self.master_volume);
        mixer.set_sfx_volume(self.sfx_volume);
        mixer.set_muted(self.muted);
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "energy_quest_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No settings store on native; using defaults ({})", Self::STORAGE_KEY);
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_budgets() {
        assert_eq!(QualityPreset::parse("LOW"), Some(QualityPreset::Low));
        assert_eq!(QualityPreset::parse("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(Settings::from_preset(QualityPreset::High).max_particles(), 600);
    }

    #[test]
    fn test_apply_to_config() {
        let mut settings = Settings::from_preset(QualityPreset::Low);
        settings.reduced_motion = true;
        let mut config = EngineConfig::default();
        settings.apply_to(&mut config);
        assert_eq!(config.max_particles, 100);
        assert!(!config.screen_shake);

        settings.particles = false;
        settings.apply_to(&mut config);
        assert_eq!(config.max_particles, 0);
    }

    #[test]
    fn test_apply_to_mixer() {
        let settings = Settings {
            muted: true,
            ..Settings::default()
        };
        let mut mixer = Mixer::default();
        settings.apply_to_mixer(&mut mixer);
        assert_eq!(mixer.effective_volume(), 0.0);
    }

    #[test]
    fn test_old_documents_fill_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"quality":"High"}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.achievement_toast_ms, 3000);
        assert!(settings.particles);
    }
}
