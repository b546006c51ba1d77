//! Snake on a wrap-around grid with obstacles, timed power-ups and
//! persistent high scores.
//!
//! The simulation (`game`, `session` and the modules they use) has no
//! terminal dependency; `renderer`, `ui` and `terminal_runtime` form the
//! ratatui frontend driven by the binary.

pub mod config;
pub mod effects;
pub mod error;
pub mod food;
pub mod game;
pub mod input;
pub mod powerup;
pub mod renderer;
pub mod score;
pub mod session;
pub mod snake;
pub mod spawn;
pub mod terminal_runtime;
pub mod ui;
