//! Host-facing engine
//!
//! Owns the world, the held-input state and the audio sink. The host pushes
//! raw input whenever it arrives and calls [`Engine::frame`] once per
//! animation frame; queued input is consumed at the start of that frame.

use crate::audio::{CueSink, SilentSink};
use crate::config::EngineConfig;
use crate::consts::FRAME_MS;
use crate::highscores::RunSummary;
use crate::sim::{self, GameEvent, Hud, InputEvent, InputState, World};

pub struct Engine {
    world: World,
    input: InputState,
    pending: Vec<InputEvent>,
    running: bool,
    sink: Box<dyn CueSink>,
}

impl Engine {
    /// Create a stopped engine with a silent sink
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        let world = World::new(config, seed);
        log::info!(
            "Engine created: viewport {}x{}, seed {}",
            world.config.viewport_width,
            world.config.viewport_height,
            seed
        );
        Self {
            world,
            input: InputState::default(),
            pending: Vec::new(),
            running: false,
            sink: Box::new(SilentSink),
        }
    }

    pub fn with_cue_sink(mut self, sink: Box<dyn CueSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Freeze the world. The engine clock, and with it every pending
    /// scheduled action, stops until `start`.
    pub fn stop(&mut self) {
        self.running = false;
        self.input.release_all();
        self.pending.clear();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.pending.push(event);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.world.resize(width, height);
        log::debug!(
            "Viewport resized to {}x{}",
            self.world.config.viewport_width,
            self.world.config.viewport_height
        );
    }

    pub fn reset(&mut self) {
        self.world.reset();
        self.input.release_all();
        self.pending.clear();
    }

    /// Advance one frame if running and return everything that happened.
    /// Audio cues are also dispatched to the sink.
    pub fn frame(&mut self) -> Vec<GameEvent> {
        if !self.running {
            return Vec::new();
        }
        let frame_input = sim::input::translate(&mut self.input, self.pending.drain(..));
        sim::tick(&mut self.world, &frame_input, FRAME_MS);

        let events = std::mem::take(&mut self.world.events);
        for event in &events {
            if let GameEvent::Cue(cue) = event {
                if let Err(e) = self.sink.play(*cue) {
                    log::warn!("Audio cue {} dropped: {}", cue.name(), e);
                }
            }
        }
        events
    }

    pub fn hud(&self) -> Hud {
        Hud::from_world(&self.world)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_world(&self.world)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;

    use super::*;
    use crate::audio::AudioError;
    use crate::consts::*;
    use crate::sim::{AudioCue, Direction, EffectKind, GamePhase};

    struct FailingSink {
        attempts: Rc<RefCell<usize>>,
    }

    impl CueSink for FailingSink {
        fn play(&mut self, _cue: AudioCue) -> Result<(), AudioError> {
            *self.attempts.borrow_mut() += 1;
            Err(AudioError::Unavailable)
        }
    }

    fn engine() -> Engine {
        let mut engine = Engine::new(EngineConfig::default(), 10);
        engine.start();
        engine
    }

    #[test]
    fn test_stopped_engine_does_nothing() {
        let mut engine = Engine::new(EngineConfig::default(), 10);
        assert!(!engine.is_running());
        assert!(engine.frame().is_empty());
        assert_eq!(engine.world().time_ms, 0);
    }

    #[test]
    fn test_stop_freezes_clock() {
        let mut engine = engine();
        engine.frame();
        engine.frame();
        engine.stop();
        engine.frame();
        assert_eq!(engine.world().time_ms, 2 * FRAME_MS as u64);
        engine.start();
        engine.frame();
        assert_eq!(engine.world().time_ms, 3 * FRAME_MS as u64);
    }

    #[test]
    fn test_input_consumed_at_frame_start() {
        let mut engine = engine();
        for enemy in &mut engine.world_mut().enemies {
            enemy.pos = Vec2::new(-1200.0, -650.0);
        }
        engine.world_mut().player.effects.set(EffectKind::Invulnerable, 60_000);
        engine.push_input(InputEvent::KeyDown(Direction::Right));
        let start = engine.world().player.pos;
        engine.frame();
        let after = engine.world().player.pos;
        assert!(after.x > start.x);

        engine.push_input(InputEvent::KeyUp(Direction::Right));
        engine.frame();
        let released = engine.world().player.pos;
        engine.frame();
        assert_eq!(engine.world().player.pos, released);
    }

    #[test]
    fn test_sink_errors_are_swallowed() {
        let attempts = Rc::new(RefCell::new(0));
        let mut engine = Engine::new(EngineConfig::default(), 10).with_cue_sink(Box::new(
            FailingSink {
                attempts: Rc::clone(&attempts),
            },
        ));
        engine.start();
        let pos = engine.world().player.pos;
        engine.world_mut().energy_items[0].pos = pos;

        let events = engine.frame();

        assert!(events.contains(&GameEvent::Cue(AudioCue::Collect)));
        assert!(*attempts.borrow() >= 1);
        assert!(engine.world().events.is_empty());
    }

    #[test]
    fn test_ultimate_fires_when_hud_reports_ready() {
        let mut engine = engine();
        let world = engine.world_mut();
        let pos = world.player.pos;
        for enemy in &mut world.enemies {
            enemy.pos = Vec2::new(-1200.0, -650.0);
        }
        for hazard in &mut world.hazards {
            hazard.pos = Vec2::new(1200.0, 650.0);
        }
        for item in &mut world.energy_items {
            item.pos = Vec2::new(-1200.0, 650.0);
        }
        world.energy_items[0].pos = pos;
        world.energy_items[0].value = 1;
        world.player.ultimate_charge = ULTIMATE_MAX - 1.0;

        engine.frame();
        assert!(engine.hud().ultimate_ready);

        engine.push_input(InputEvent::Ultimate);
        let events = engine.frame();

        assert!(events.contains(&GameEvent::Cue(AudioCue::Ultimate)));
        assert!(engine.world().enemies.is_empty());
        assert!(!engine.hud().ultimate_ready);
    }

    #[test]
    fn test_reset_via_engine() {
        let mut engine = engine();
        engine.world_mut().phase = GamePhase::GameOver;
        engine.world_mut().progression.score = 99;
        engine.push_input(InputEvent::KeyDown(Direction::Up));
        engine.reset();
        assert_eq!(engine.world().phase, GamePhase::Playing);
        assert_eq!(engine.hud().score, 0);
        assert_eq!(engine.summary().score, 0);
    }

    #[test]
    fn test_resize_keeps_world() {
        let mut engine = engine();
        let enemies = engine.world().enemies.len();
        engine.resize(100.0, 100.0);
        assert_eq!(engine.world().config.viewport_width, MIN_VIEWPORT_WIDTH);
        assert_eq!(engine.world().enemies.len(), enemies);
    }
}
