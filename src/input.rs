use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Canonical movement directions for snake input.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the unit step `(dx, dy)`; y grows downwards.
    #[must_use]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// High-level input events consumed by the game loop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameInput {
    Direction(Direction),
    Pause,
    Restart,
    Quit,
}

/// Returns whether turning from `current` to `next` is legal.
///
/// A vertical turn needs `dy == 0` on the current heading and a horizontal
/// turn needs `dx == 0`, so only perpendicular turns pass. This rules out
/// instant 180° reversals into the neck.
#[must_use]
pub fn turn_is_allowed(current: Direction, next: Direction) -> bool {
    let (dx, dy) = current.delta();
    if next.is_horizontal() {
        dx == 0
    } else {
        dy == 0
    }
}

/// Maps a key press to a game input.
#[must_use]
pub fn map_key(key: KeyEvent) -> Option<GameInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(GameInput::Quit);
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('w' | 'W' | 'k') => Some(GameInput::Direction(Direction::Up)),
        KeyCode::Down | KeyCode::Char('s' | 'S' | 'j') => {
            Some(GameInput::Direction(Direction::Down))
        }
        KeyCode::Left | KeyCode::Char('a' | 'A' | 'h') => {
            Some(GameInput::Direction(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('d' | 'D' | 'l') => {
            Some(GameInput::Direction(Direction::Right))
        }
        KeyCode::Char('p' | 'P' | ' ') => Some(GameInput::Pause),
        KeyCode::Char('r' | 'R') | KeyCode::Enter => Some(GameInput::Restart),
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(GameInput::Quit),
        _ => None,
    }
}

/// Non-blocking keyboard reader.
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Drains pending terminal events, returning the mapped inputs in order.
    pub fn poll_inputs(&mut self) -> io::Result<Vec<GameInput>> {
        let mut inputs = Vec::new();

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(input) = map_key(key) {
                    inputs.push(input);
                }
            }
        }

        Ok(inputs)
    }
}
