//! Audio cue playback
//!
//! The simulation only emits symbolic [`AudioCue`]s. A [`CueSink`] turns them
//! into sound. In the browser that is [`AudioManager`], which synthesizes each
//! cue with a single Web Audio oscillator. No sample files are needed.

use thiserror::Error;

use crate::sim::AudioCue;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio context unavailable")]
    Unavailable,
    #[error("failed to synthesize {cue}: {reason}")]
    Synthesis { cue: &'static str, reason: String },
}

/// Receives the cues drained from each frame
pub trait CueSink {
    fn play(&mut self, cue: AudioCue) -> Result<(), AudioError>;
}

/// Discards every cue (headless runs, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl CueSink for SilentSink {
    fn play(&mut self, _cue: AudioCue) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Counts cues per kind instead of playing them
#[derive(Debug, Default, Clone)]
pub struct CueLog {
    pub played: Vec<AudioCue>,
}

impl CueLog {
    pub fn count(&self, cue: AudioCue) -> usize {
        self.played.iter().filter(|&&c| c == cue).count()
    }
}

impl CueSink for CueLog {
    fn play(&mut self, cue: AudioCue) -> Result<(), AudioError> {
        log::trace!("cue {}", cue.name());
        self.played.push(cue);
        Ok(())
    }
}

/// How the oscillator reaches a frequency point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glide {
    /// Jump at the point's time
    Step,
    /// Exponential ramp ending at the point's time
    Ramp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreqPoint {
    /// Seconds after the cue starts
    pub at: f64,
    pub hz: f32,
    pub glide: Glide,
}

const fn step(at: f64, hz: f32) -> FreqPoint {
    FreqPoint {
        at,
        hz,
        glide: Glide::Step,
    }
}

const fn ramp(at: f64, hz: f32) -> FreqPoint {
    FreqPoint {
        at,
        hz,
        glide: Glide::Ramp,
    }
}

/// One oscillator: a frequency contour plus a decaying gain envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub contour: &'static [FreqPoint],
    /// Gain at t=0 before volume scaling
    pub gain: f32,
    /// Seconds until the envelope reaches the floor and the oscillator stops
    pub length: f64,
}

/// Envelope floor (exponential ramps cannot reach zero)
pub const GAIN_FLOOR: f32 = 0.01;

const COLLECT: &[FreqPoint] = &[step(0.0, 800.0), ramp(0.1, 1200.0)];
const POWER_STATION: &[FreqPoint] = &[step(0.0, 400.0), ramp(0.3, 800.0)];
const OBSTACLE_WARNING: &[FreqPoint] = &[step(0.0, 200.0), step(0.1, 150.0), step(0.2, 200.0)];
const POWER_UP: &[FreqPoint] = &[step(0.0, 600.0), ramp(0.2, 1200.0), ramp(0.4, 1800.0)];
const DAMAGE: &[FreqPoint] = &[step(0.0, 300.0), ramp(0.3, 100.0)];
const MINI_BOSS_SPAWN: &[FreqPoint] = &[
    step(0.0, 150.0),
    step(0.2, 200.0),
    step(0.4, 150.0),
    step(0.6, 100.0),
];
const LEVEL_UP: &[FreqPoint] = &[step(0.0, 400.0), ramp(0.3, 800.0), ramp(0.6, 1200.0)];
const ACHIEVEMENT: &[FreqPoint] = &[
    step(0.0, 600.0),
    step(0.1, 800.0),
    step(0.2, 1000.0),
    step(0.3, 1200.0),
];
const ULTIMATE: &[FreqPoint] = &[
    step(0.0, 200.0),
    ramp(0.2, 400.0),
    ramp(0.4, 800.0),
    ramp(0.6, 1600.0),
];

pub fn voice(cue: AudioCue) -> Voice {
    let (contour, gain, length) = match cue {
        AudioCue::Collect => (COLLECT, 0.1, 0.2),
        AudioCue::PowerStation => (POWER_STATION, 0.15, 0.4),
        AudioCue::ObstacleWarning => (OBSTACLE_WARNING, 0.05, 0.3),
        AudioCue::PowerUp => (POWER_UP, 0.1, 0.5),
        AudioCue::Damage => (DAMAGE, 0.08, 0.3),
        AudioCue::MiniBossSpawn => (MINI_BOSS_SPAWN, 0.12, 0.8),
        AudioCue::LevelUp => (LEVEL_UP, 0.15, 0.8),
        AudioCue::Achievement => (ACHIEVEMENT, 0.2, 0.5),
        AudioCue::Ultimate => (ULTIMATE, 0.25, 1.0),
    };
    Voice {
        contour,
        gain,
        length,
    }
}

/// Volume controls shared by every sink that makes noise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mixer {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for Mixer {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Mixer {
    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioError, CueSink, GAIN_FLOOR, Glide, Mixer, voice};
    use crate::sim::AudioCue;

    /// Web Audio synthesizer. One context for the whole session.
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        pub mixer: Mixer,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                mixer: Mixer::default(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                if ctx.state() == web_sys::AudioContextState::Suspended {
                    let _ = ctx.resume();
                }
            }
        }

        fn create_osc(
            ctx: &AudioContext,
            cue: AudioCue,
        ) -> Result<(OscillatorNode, GainNode), AudioError> {
            let fail = |e: wasm_bindgen::JsValue| AudioError::Synthesis {
                cue: cue.name(),
                reason: format!("{:?}", e),
            };
            let osc = ctx.create_oscillator().map_err(fail)?;
            let gain = ctx.create_gain().map_err(fail)?;
            osc.set_type(OscillatorType::Sine);
            osc.connect_with_audio_node(&gain).map_err(fail)?;
            gain.connect_with_audio_node(&ctx.destination())
                .map_err(fail)?;
            Ok((osc, gain))
        }
    }

    impl CueSink for AudioManager {
        fn play(&mut self, cue: AudioCue) -> Result<(), AudioError> {
            let vol = self.mixer.effective_volume();
            if vol <= 0.0 {
                return Ok(());
            }
            // Degraded to silence at construction
            let Some(ctx) = &self.ctx else {
                return Ok(());
            };
            self.resume();

            let v = voice(cue);
            let (osc, gain) = Self::create_osc(ctx, cue)?;
            let t = ctx.current_time();

            for point in v.contour {
                let freq = osc.frequency();
                match point.glide {
                    Glide::Step => freq.set_value_at_time(point.hz, t + point.at).ok(),
                    Glide::Ramp => freq
                        .exponential_ramp_to_value_at_time(point.hz, t + point.at)
                        .ok(),
                };
            }
            gain.gain().set_value_at_time(v.gain * vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(GAIN_FLOOR, t + v.length)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + v.length).ok();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CUES: [AudioCue; 9] = [
        AudioCue::Collect,
        AudioCue::PowerUp,
        AudioCue::Damage,
        AudioCue::MiniBossSpawn,
        AudioCue::LevelUp,
        AudioCue::Achievement,
        AudioCue::Ultimate,
        AudioCue::ObstacleWarning,
        AudioCue::PowerStation,
    ];

    #[test]
    fn test_voices_are_well_formed() {
        for cue in ALL_CUES {
            let v = voice(cue);
            assert_eq!(v.contour[0].at, 0.0, "{}", cue.name());
            assert_eq!(v.contour[0].glide, Glide::Step, "{}", cue.name());
            assert!(v.contour.windows(2).all(|w| w[0].at < w[1].at));
            assert!(v.contour.iter().all(|p| p.at <= v.length && p.hz > 0.0));
            assert!(v.gain > GAIN_FLOOR);
        }
    }

    #[test]
    fn test_ultimate_sweeps_up() {
        let v = voice(AudioCue::Ultimate);
        assert_eq!(v.contour.first().map(|p| p.hz), Some(200.0));
        assert_eq!(v.contour.last().map(|p| p.hz), Some(1600.0));
        assert_eq!(v.length, 1.0);
    }

    #[test]
    fn test_damage_ramp_ends_with_envelope() {
        let v = voice(AudioCue::Damage);
        let last = v.contour.last().map(|p| (p.at, p.hz, p.glide));
        assert_eq!(last, Some((v.length, 100.0, Glide::Ramp)));
    }

    #[test]
    fn test_mixer() {
        let mut mixer = Mixer::default();
        assert!((mixer.effective_volume() - 0.8).abs() < 1e-6);
        mixer.set_sfx_volume(0.5);
        mixer.set_master_volume(2.0);
        assert!((mixer.effective_volume() - 0.5).abs() < 1e-6);
        mixer.set_muted(true);
        assert_eq!(mixer.effective_volume(), 0.0);
    }

    #[test]
    fn test_cue_log_counts() {
        let mut log = CueLog::default();
        log.play(AudioCue::Collect).unwrap();
        log.play(AudioCue::Collect).unwrap();
        log.play(AudioCue::Damage).unwrap();
        assert_eq!(log.count(AudioCue::Collect), 2);
        assert_eq!(log.count(AudioCue::Ultimate), 0);
    }

    #[test]
    fn test_error_messages() {
        let err = AudioError::Synthesis {
            cue: "collect",
            reason: "boom".into(),
        };
        assert_eq!(err.to_string(), "failed to synthesize collect: boom");
        assert_eq!(AudioError::Unavailable.to_string(), "audio context unavailable");
    }
}
