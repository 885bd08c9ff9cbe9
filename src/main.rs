//! Energy Quest entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent, WheelEvent};

    use energy_quest::audio::AudioManager;
    use energy_quest::sim::{
        EffectKind, GameEvent, GamePhase, HazardKind, Hud, InputEvent, World,
    };
    use energy_quest::highscores::format_duration;
    use energy_quest::{Engine, EngineConfig, HighScores, Settings};

    /// Host state shared between the listeners and the frame loop
    struct Game {
        engine: Engine,
        ctx: Option<CanvasRenderingContext2d>,
        settings: Settings,
        high_scores: HighScores,
    }

    impl Game {
        fn new(engine: Engine, ctx: Option<CanvasRenderingContext2d>, settings: Settings) -> Self {
            Self {
                engine,
                ctx,
                settings,
                high_scores: HighScores::load(),
            }
        }

        /// Advance one frame and react to its events
        fn update(&mut self) {
            let events = self.engine.frame();
            for event in events {
                match event {
                    GameEvent::AchievementUnlocked {
                        name, description, ..
                    } => {
                        log::info!("Achievement unlocked: {}", name);
                        show_toast(name, description, self.settings.achievement_toast_ms);
                    }
                    GameEvent::LevelUp { level } => log::info!("Level up: {}", level),
                    GameEvent::DifficultyIncreased { tier } => {
                        log::info!("Difficulty tier {}", tier)
                    }
                    GameEvent::MiniBossSpawned => log::info!("Mini-boss spawned"),
                    GameEvent::MiniBossDefeated => log::info!("Mini-boss defeated"),
                    GameEvent::RunEnded { score } => self.end_run(score),
                    GameEvent::Cue(_) => {}
                }
            }
        }

        fn end_run(&mut self, score: u64) {
            let summary = self.engine.summary();
            match summary.to_json() {
                Ok(json) => log::info!("Run ended: {}", json),
                Err(e) => log::warn!("Run ended with score {} (summary unavailable: {})", score, e),
            }
            if let Some(rank) = self.high_scores.record(&summary, js_sys::Date::now()) {
                log::info!("New high score, rank {}", rank);
                self.high_scores.save();
            }
        }

        fn render(&self) {
            if let Some(ctx) = &self.ctx {
                draw_world(ctx, self.engine.world());
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.engine.hud();

            set_text(&document, "#hud-score .hud-value", &hud.score.to_string());
            set_text(
                &document,
                "#hud-health .hud-value",
                &format!("{}/{}", hud.health, hud.max_health),
            );
            set_text(&document, "#hud-level .hud-value", &hud.level.to_string());
            set_text(
                &document,
                "#hud-difficulty .hud-value",
                &hud.difficulty.to_string(),
            );
            set_text(
                &document,
                "#hud-ultimate .hud-value",
                &ultimate_label(&hud),
            );
            set_text(&document, "#hud-effects .hud-value", &effects_label(&hud));

            if let Some(bar) = document.get_element_by_id("xp-fill") {
                let style = format!("width: {:.0}%", hud.experience_ratio * 100.0);
                let _ = bar.set_attribute("style", &style);
            }

            // Combo only shows while it boosts score
            if let Some(el) = document.get_element_by_id("hud-combo") {
                match hud.combo_label() {
                    Some(label) => {
                        el.set_text_content(Some(&label));
                        let _ = el.set_attribute("class", "hud-item");
                    }
                    None => {
                        let _ = el.set_attribute("class", "hud-item hidden");
                    }
                }
            }

            if let Some(el) = document.get_element_by_id("game-over") {
                if hud.phase == GamePhase::GameOver {
                    let _ = el.set_attribute("class", "");
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&hud.score.to_string()));
                    }
                    if let Some(time_el) = document.get_element_by_id("final-time") {
                        let secs = self.engine.world().time_ms / 1000;
                        time_el.set_text_content(Some(&format_duration(secs)));
                    }
                    if let Some(best_el) = document.get_element_by_id("best-score") {
                        let best = self.high_scores.top_score().unwrap_or(hud.score);
                        best_el.set_text_content(Some(&best.to_string()));
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn ultimate_label(hud: &Hud) -> String {
        if hud.ultimate_ready {
            "READY".to_string()
        } else {
            format!("{}%", hud.ultimate_percent)
        }
    }

    fn effects_label(hud: &Hud) -> String {
        hud.effects
            .iter()
            .map(|e| format!("{} {:.1}s", e.kind.name(), e.remaining_ms as f32 / 1000.0))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn show_toast(name: &str, description: &str, duration_ms: u32) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(toast) = window
            .document()
            .and_then(|d| d.get_element_by_id("achievement-toast"))
        else {
            return;
        };
        toast.set_text_content(Some(&format!("{}: {}", name, description)));
        let _ = toast.set_attribute("class", "");

        let hide = Closure::once(move || {
            let _ = toast.set_attribute("class", "hidden");
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            hide.as_ref().unchecked_ref(),
            duration_ms as i32,
        );
        hide.forget();
    }

    fn css_color(color: u32) -> String {
        format!("#{:06x}", color & 0x00ff_ffff)
    }

    fn fill_circle(ctx: &CanvasRenderingContext2d, x: f32, y: f32, r: f32, color: &str) {
        ctx.set_fill_style_str(color);
        ctx.begin_path();
        let _ = ctx.arc(x as f64, y as f64, r.max(0.0) as f64, 0.0, TAU);
        ctx.fill();
    }

    /// Draw the world in camera space. Reads only.
    fn draw_world(ctx: &CanvasRenderingContext2d, world: &World) {
        let viewport = world.viewport();
        ctx.set_fill_style_str("#0a0e1a");
        ctx.fill_rect(0.0, 0.0, viewport.x as f64, viewport.y as f64);

        ctx.save();
        let zoom = world.render_zoom() as f64;
        let center = viewport / 2.0;
        let _ = ctx.translate(center.x as f64, center.y as f64);
        let _ = ctx.scale(zoom, zoom);
        let _ = ctx.translate(
            -(world.camera.pos.x + center.x) as f64,
            -(world.camera.pos.y + center.y) as f64,
        );

        for hazard in world.hazards.iter().filter(|h| h.active) {
            let color = match hazard.kind {
                HazardKind::EnergyDrain => "#8a2be2",
                HazardKind::SlowField => "#1e90ff",
                HazardKind::DamageZone => "#ff4500",
            };
            ctx.set_global_alpha(0.35);
            fill_circle(ctx, hazard.pos.x, hazard.pos.y, hazard.radius, color);
        }
        ctx.set_global_alpha(1.0);

        for obstacle in &world.obstacles {
            ctx.save();
            let _ = ctx.translate(obstacle.pos.x as f64, obstacle.pos.y as f64);
            let _ = ctx.rotate(obstacle.rotation as f64);
            ctx.set_fill_style_str("#5a5a5a");
            ctx.fill_rect(
                -(obstacle.width / 2.0) as f64,
                -(obstacle.height / 2.0) as f64,
                obstacle.width as f64,
                obstacle.height as f64,
            );
            ctx.restore();
        }

        for station in &world.power_stations {
            let color = if station.active { "#00ff88" } else { "#335544" };
            fill_circle(ctx, station.pos.x, station.pos.y, station.radius, color);
        }

        for item in world.energy_items.iter().filter(|i| !i.collected) {
            let r = item.radius * (1.0 + item.pulse.sin() * 0.1);
            fill_circle(ctx, item.pos.x, item.pos.y, r, &css_color(item.color));
        }

        for power_up in world.power_ups.iter().filter(|p| !p.collected) {
            fill_circle(ctx, power_up.pos.x, power_up.pos.y, power_up.radius, "#ffd700");
        }

        for enemy in &world.enemies {
            fill_circle(ctx, enemy.pos.x, enemy.pos.y, enemy.radius, "#ff3355");
        }

        if let Some(boss) = &world.mini_boss {
            fill_circle(ctx, boss.pos.x, boss.pos.y, boss.radius, "#aa0033");
            let ratio = boss.health as f32 / boss.max_health.max(1) as f32;
            ctx.set_fill_style_str("#ff0000");
            ctx.fill_rect(
                (boss.pos.x - boss.radius) as f64,
                (boss.pos.y - boss.radius - 12.0) as f64,
                (boss.radius * 2.0 * ratio) as f64,
                4.0,
            );
        }

        let player = &world.player;
        for (i, point) in player.trail.iter().enumerate() {
            ctx.set_global_alpha(i as f64 / player.trail.len().max(1) as f64 * 0.4);
            fill_circle(ctx, point.x, point.y, player.radius * 0.5, "#00d4ff");
        }
        ctx.set_global_alpha(1.0);

        let scale = world.player_scale();
        fill_circle(ctx, player.pos.x, player.pos.y, player.radius * scale, "#00d4ff");
        if player.effects.is_active(EffectKind::Shield) {
            ctx.set_stroke_style_str("#7fffd4");
            ctx.set_line_width(3.0);
            ctx.begin_path();
            let _ = ctx.arc(
                player.pos.x as f64,
                player.pos.y as f64,
                (player.radius * scale + 8.0) as f64,
                0.0,
                TAU,
            );
            ctx.stroke();
        }

        for particle in &world.particles {
            ctx.set_global_alpha(particle.life.clamp(0.0, 1.0) as f64);
            fill_circle(
                ctx,
                particle.pos.x,
                particle.pos.y,
                particle.radius,
                &css_color(particle.color),
            );
        }
        ctx.set_global_alpha(1.0);
        ctx.restore();
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger unavailable: {}", e).into());
        }

        log::info!("Energy Quest starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: Option<HtmlCanvasElement> = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok());
        let (client_w, client_h) = canvas
            .as_ref()
            .map(|c| (c.client_width() as f32, c.client_height() as f32))
            .unwrap_or((0.0, 0.0));
        // A missing canvas leaves the engine running headless
        let ctx = canvas.as_ref().and_then(|c| {
            c.set_width(client_w as u32);
            c.set_height(client_h as u32);
            c.get_context("2d")
                .ok()
                .flatten()
                .and_then(|o| o.dyn_into::<CanvasRenderingContext2d>().ok())
        });
        if ctx.is_none() {
            log::warn!("No 2D canvas available - rendering disabled");
        }

        let settings = Settings::load();
        let mut config = EngineConfig::new(client_w, client_h);
        settings.apply_to(&mut config);

        let mut audio = AudioManager::new();
        settings.apply_to_mixer(&mut audio.mixer);

        let seed = js_sys::Date::now() as u64;
        let mut engine = Engine::new(config, seed).with_cue_sink(Box::new(audio));
        engine.start();

        let game = Rc::new(RefCell::new(Game::new(engine, ctx, settings)));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_resize(canvas, game.clone());
        setup_restart_button(game.clone());
        setup_auto_pause(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Energy Quest running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(input) = InputEvent::from_key_down(&event.key()) {
                    event.prevent_default();
                    game.borrow_mut().engine.push_input(input);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(input) = InputEvent::from_key_up(&event.key()) {
                    game.borrow_mut().engine.push_input(input);
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                event.prevent_default();
                let zoom_in = event.delta_y() < 0.0;
                game.borrow_mut()
                    .engine
                    .push_input(InputEvent::Zoom { zoom_in });
            });
            let _ =
                window.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: Option<HtmlCanvasElement>, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(canvas) = canvas else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::UiEvent| {
            let (w, h) = (canvas.client_width(), canvas.client_height());
            canvas.set_width(w.max(0) as u32);
            canvas.set_height(h.max(0) as u32);
            game.borrow_mut().engine.resize(w as f32, h as f32);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.update();
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.engine.reset();
                g.engine.start();
                log::info!("Run restarted");
            });
            let _ =
                btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Stop the engine while the tab is hidden so scheduled actions wait too
    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                g.engine.stop();
                log::info!("Auto-paused (tab hidden)");
            } else if !g.engine.is_running() {
                g.engine.start();
                log::info!("Resumed (tab visible)");
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Headless run with scripted input: circles the arena and fires the
/// ultimate whenever it is charged. An optional first argument picks the
/// quality preset (`low`, `medium`, `high`).
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use energy_quest::highscores::format_duration;
    use energy_quest::sim::{Direction, GameEvent, GamePhase, InputEvent};
    use energy_quest::{Engine, EngineConfig, HighScores, QualityPreset, Settings};

    env_logger::init();
    log::info!("Energy Quest (native) starting headless demo...");

    const FRAMES: u32 = 3600;
    const LEG_FRAMES: u32 = 90;
    const LEGS: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    let settings = match std::env::args().nth(1) {
        Some(arg) => match QualityPreset::parse(&arg) {
            Some(preset) => Settings::from_preset(preset),
            None => {
                log::warn!("Unknown quality preset '{}', using stored settings", arg);
                Settings::load()
            }
        },
        None => Settings::load(),
    };
    log::info!("Quality preset: {}", settings.quality.as_str());
    let mut config = EngineConfig::default();
    settings.apply_to(&mut config);

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut engine = Engine::new(config, seed);
    engine.start();

    let mut cues = 0usize;
    let mut high_scores = HighScores::load();
    for frame in 0..FRAMES {
        if frame % LEG_FRAMES == 0 {
            let leg = (frame / LEG_FRAMES) as usize;
            if leg > 0 {
                engine.push_input(InputEvent::KeyUp(LEGS[(leg - 1) % LEGS.len()]));
            }
            engine.push_input(InputEvent::KeyDown(LEGS[leg % LEGS.len()]));
        }
        if engine.hud().ultimate_ready {
            engine.push_input(InputEvent::Ultimate);
        }

        for event in engine.frame() {
            match event {
                GameEvent::Cue(_) => cues += 1,
                GameEvent::AchievementUnlocked { name, .. } => {
                    log::info!("Achievement unlocked: {}", name)
                }
                GameEvent::RunEnded { score } => {
                    log::info!("Run ended at frame {} with score {}", frame, score);
                    high_scores.record(&engine.summary(), frame as f64);
                }
                other => log::debug!("{:?}", other),
            }
        }
        if engine.world().phase == GamePhase::GameOver {
            break;
        }
    }

    let hud = engine.hud();
    log::info!(
        "Final HUD: score {}, health {}/{}, level {}, difficulty {}, survived {}, {} cues",
        hud.score,
        hud.health,
        hud.max_health,
        hud.level,
        hud.difficulty,
        format_duration(engine.world().time_ms / 1000),
        cues
    );
    if let Some(best) = high_scores.top_score() {
        log::info!("Best score this session: {}", best);
    }
    match engine.summary().to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize run summary: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
