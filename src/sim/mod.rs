//! Simulation module
//!
//! All gameplay logic lives here. The simulation is frame-driven and
//! deterministic for a given seed:
//! - Engine clock only, never the wall clock
//! - Seeded RNG only
//! - Collections are resolved in a fixed order, in index order
//! - No rendering, audio or platform dependencies

pub mod achievements;
pub mod collision;
pub mod effects;
pub mod events;
pub mod hud;
pub mod input;
pub mod progression;
pub mod schedule;
pub mod spawn;
pub mod state;
pub mod tick;

pub use achievements::{AchievementRule, AchievementStatus, RULES};
pub use effects::{Burst, Tween, TweenTarget};
pub use events::{AudioCue, GameEvent};
pub use hud::{ActiveEffect, Hud};
pub use input::{Direction, FrameInput, InputEvent, InputState};
pub use schedule::{ScheduledAction, Scheduler};
pub use spawn::{Bounds, SpawnKind};
pub use state::{
    Camera, EffectKind, Effects, Enemy, EnemyBehavior, EnergyItem, GamePhase, Hazard, HazardKind,
    MiniBoss, Obstacle, ObstacleKind, Particle, Player, PowerStation, PowerUp, PowerUpKind,
    Progression, Upgrades, World,
};
pub use tick::tick;
