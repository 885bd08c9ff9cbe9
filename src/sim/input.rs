//! Input translation
//!
//! Raw key events become a held-direction set plus one-shot triggers. No
//! gameplay logic lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The four movement intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A raw input event from the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(Direction),
    KeyUp(Direction),
    /// Activate the ultimate ability
    Ultimate,
    /// One wheel notch; `zoom_in` true scales target zoom by 1.1, else 0.9
    Zoom { zoom_in: bool },
}

impl InputEvent {
    /// Map a DOM `KeyboardEvent.key` value from a keydown
    pub fn from_key_down(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            " " | "space" | "spacebar" => Some(InputEvent::Ultimate),
            other => direction_for_key(other).map(InputEvent::KeyDown),
        }
    }

    /// Map a DOM `KeyboardEvent.key` value from a keyup
    pub fn from_key_up(key: &str) -> Option<Self> {
        direction_for_key(&key.to_lowercase()).map(InputEvent::KeyUp)
    }
}

/// WASD and arrow aliases collapse onto the same intent
fn direction_for_key(key: &str) -> Option<Direction> {
    match key {
        "w" | "arrowup" => Some(Direction::Up),
        "s" | "arrowdown" => Some(Direction::Down),
        "a" | "arrowleft" => Some(Direction::Left),
        "d" | "arrowright" => Some(Direction::Right),
        _ => None,
    }
}

/// Held directions, persisted across frames
#[derive(Debug, Clone, Default)]
pub struct InputState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl InputState {
    fn set(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    /// Movement intent: each axis in {-1, 0, 1}, diagonals scaled by √2⁄2.
    /// Screen coordinates, so up is -y.
    pub fn movement(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
        let dx = axis(self.left, self.right);
        let dy = axis(self.up, self.down);
        let v = Vec2::new(dx, dy);
        if dx != 0.0 && dy != 0.0 {
            v * std::f32::consts::FRAC_1_SQRT_2
        } else {
            v
        }
    }

    pub fn release_all(&mut self) {
        *self = Self::default();
    }
}

/// Everything the simulation reads from input for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub movement: Vec2,
    pub ultimate: bool,
    /// Net wheel notches (positive zooms in)
    pub zoom_steps: i32,
}

/// Fold queued events into the held state and produce this frame's input
pub fn translate<I>(state: &mut InputState, events: I) -> FrameInput
where
    I: IntoIterator<Item = InputEvent>,
{
    let mut frame = FrameInput::default();
    for event in events {
        match event {
            InputEvent::KeyDown(dir) => state.set(dir, true),
            InputEvent::KeyUp(dir) => state.set(dir, false),
            InputEvent::Ultimate => frame.ultimate = true,
            InputEvent::Zoom { zoom_in } => frame.zoom_steps += if zoom_in { 1 } else { -1 },
        }
    }
    frame.movement = state.movement();
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_aliases() {
        assert_eq!(
            InputEvent::from_key_down("W"),
            Some(InputEvent::KeyDown(Direction::Up))
        );
        assert_eq!(
            InputEvent::from_key_down("ArrowUp"),
            Some(InputEvent::KeyDown(Direction::Up))
        );
        assert_eq!(
            InputEvent::from_key_up("ArrowLeft"),
            Some(InputEvent::KeyUp(Direction::Left))
        );
        assert_eq!(InputEvent::from_key_down(" "), Some(InputEvent::Ultimate));
        assert_eq!(InputEvent::from_key_up(" "), None);
        assert_eq!(InputEvent::from_key_down("q"), None);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut state = InputState::default();
        let frame = translate(
            &mut state,
            [
                InputEvent::KeyDown(Direction::Left),
                InputEvent::KeyDown(Direction::Right),
            ],
        );
        assert_eq!(frame.movement, Vec2::ZERO);
    }

    #[test]
    fn test_diagonal_normalized() {
        let mut state = InputState::default();
        let frame = translate(
            &mut state,
            [
                InputEvent::KeyDown(Direction::Up),
                InputEvent::KeyDown(Direction::Right),
            ],
        );
        assert!((frame.movement.length() - 1.0).abs() < 1e-5);
        assert!(frame.movement.x > 0.0 && frame.movement.y < 0.0);
    }

    #[test]
    fn test_held_state_persists_and_triggers_do_not() {
        let mut state = InputState::default();
        let first = translate(
            &mut state,
            [InputEvent::KeyDown(Direction::Down), InputEvent::Ultimate],
        );
        assert!(first.ultimate);
        let second = translate(&mut state, []);
        assert!(!second.ultimate);
        assert_eq!(second.movement, Vec2::new(0.0, 1.0));
        let third = translate(&mut state, [InputEvent::KeyUp(Direction::Down)]);
        assert_eq!(third.movement, Vec2::ZERO);
    }

    #[test]
    fn test_zoom_steps_accumulate() {
        let mut state = InputState::default();
        let frame = translate(
            &mut state,
            [
                InputEvent::Zoom { zoom_in: true },
                InputEvent::Zoom { zoom_in: true },
                InputEvent::Zoom { zoom_in: false },
            ],
        );
        assert_eq!(frame.zoom_steps, 1);
    }
}
