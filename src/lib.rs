//! Grid snake with a length-driven speed curve and particle bursts on every
//! meal.
//!
//! The simulation (`board`, `scheduler`, `particles`, `input`) has no I/O;
//! `render` paints it onto any `canvas::Canvas`, and `term` provides a
//! crossterm-backed canvas for playing in a terminal.

pub mod board;
pub mod canvas;
pub mod config;
pub mod game;
pub mod input;
pub mod particles;
pub mod render;
pub mod scheduler;
pub mod snake;
pub mod term;

pub use board::{Board, Collision, GameState, TickOutcome};
pub use config::{ConfigError, GameConfig, ParticleConfig};
pub use game::Game;
pub use snake::{Direction, Position};
