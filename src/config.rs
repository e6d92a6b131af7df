use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snake::{Direction, Position};

/// Reasons a configuration is rejected before a game starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("cell size must be positive, got {0}")]
    CellSize(f64),
    #[error("canvas size {canvas} holds no {cell}-unit cell")]
    CanvasTooSmall { canvas: f64, cell: f64 },
    #[error("base interval must be positive, got {0}")]
    BaseInterval(f64),
    #[error("speed decay factor must be in (0, 1], got {0}")]
    DecayFactor(f64),
    #[error("length step must be at least 1")]
    LengthStep,
    #[error("initial snake has no segments")]
    EmptySnake,
    #[error("{what} at ({x}, {y}) lies outside the {tiles}x{tiles} board")]
    OutOfBounds {
        what: &'static str,
        x: i32,
        y: i32,
        tiles: i32,
    },
    #[error("initial food sits on the initial snake")]
    FoodOnSnake,
    #[error("initial snake overlaps itself")]
    SnakeOverlap,
    #[error("particle {what} range {min}..={max} is inverted or negative")]
    ParticleRange {
        what: &'static str,
        min: f64,
        max: f64,
    },
    #[error("particle decay must be positive, got {0}")]
    ParticleDecay(f64),
    #[error("particle speed must be finite and non-negative, got {0}")]
    ParticleSpeed(f64),
    #[error("particle gravity must be finite, got {0}")]
    ParticleGravity(f64),
}

/// Tunables for the food burst effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub min_count: usize,
    pub max_count: usize,
    /// Velocity components are drawn from `-max_speed..=max_speed`.
    pub max_speed: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Alpha lost per update.
    pub decay: f64,
    /// Added to vertical velocity per update.
    pub gravity: f64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            min_count: 8,
            max_count: 12,
            max_speed: 6.0,
            min_radius: 2.0,
            max_radius: 5.0,
            decay: 0.1,
            gravity: 0.3,
        }
    }
}

/// Configuration for a game, loadable from JSON. Missing keys fall back to
/// the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Size of one grid cell in render units
    pub cell_size: f64,
    /// Side of the square canvas in render units
    pub canvas_size: f64,
    /// Tick interval for a fresh snake, in milliseconds
    pub base_interval: f64,
    /// Interval multiplier applied every `length_step` segments
    pub decay_factor: f64,
    pub length_step: usize,
    pub food_reward: u32,
    /// Random draws before food placement falls back to a board scan
    pub food_retry_limit: usize,
    pub initial_snake: Vec<Position>,
    pub initial_food: Position,
    pub initial_direction: Direction,
    /// Target time between animation frames, in milliseconds
    pub frame_interval: u64,
    pub particles: ParticleConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cell_size: 40.0,
            canvas_size: 800.0,
            base_interval: 1500.0,
            decay_factor: 0.9,
            length_step: 5,
            food_reward: 10,
            food_retry_limit: 256,
            initial_snake: vec![Position::new(10, 10)],
            initial_food: Position::new(15, 15),
            initial_direction: Direction::Idle,
            frame_interval: 33,
            particles: ParticleConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Board dimension in cells.
    pub fn tile_count(&self) -> i32 {
        (self.canvas_size / self.cell_size).floor() as i32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size > 0.0) {
            return Err(ConfigError::CellSize(self.cell_size));
        }
        if self.tile_count() < 1 {
            return Err(ConfigError::CanvasTooSmall {
                canvas: self.canvas_size,
                cell: self.cell_size,
            });
        }
        if !(self.base_interval > 0.0) {
            return Err(ConfigError::BaseInterval(self.base_interval));
        }
        if !(self.decay_factor > 0.0 && self.decay_factor <= 1.0) {
            return Err(ConfigError::DecayFactor(self.decay_factor));
        }
        if self.length_step == 0 {
            return Err(ConfigError::LengthStep);
        }
        if self.initial_snake.is_empty() {
            return Err(ConfigError::EmptySnake);
        }

        let tiles = self.tile_count();
        let in_bounds = |p: &Position| p.x >= 0 && p.x < tiles && p.y >= 0 && p.y < tiles;
        for seg in &self.initial_snake {
            if !in_bounds(seg) {
                return Err(ConfigError::OutOfBounds {
                    what: "snake segment",
                    x: seg.x,
                    y: seg.y,
                    tiles,
                });
            }
        }
        for (i, seg) in self.initial_snake.iter().enumerate() {
            if self.initial_snake[i + 1..].contains(seg) {
                return Err(ConfigError::SnakeOverlap);
            }
        }
        if !in_bounds(&self.initial_food) {
            return Err(ConfigError::OutOfBounds {
                what: "food",
                x: self.initial_food.x,
                y: self.initial_food.y,
                tiles,
            });
        }
        if self.initial_snake.contains(&self.initial_food) {
            return Err(ConfigError::FoodOnSnake);
        }

        let p = &self.particles;
        if p.min_count > p.max_count {
            return Err(ConfigError::ParticleRange {
                what: "count",
                min: p.min_count as f64,
                max: p.max_count as f64,
            });
        }
        if !(p.max_speed.is_finite() && p.max_speed >= 0.0) {
            return Err(ConfigError::ParticleSpeed(p.max_speed));
        }
        if !(p.min_radius >= 0.0 && p.min_radius <= p.max_radius && p.max_radius.is_finite()) {
            return Err(ConfigError::ParticleRange {
                what: "radius",
                min: p.min_radius,
                max: p.max_radius,
            });
        }
        if !(p.decay > 0.0) {
            return Err(ConfigError::ParticleDecay(p.decay));
        }
        if !p.gravity.is_finite() {
            return Err(ConfigError::ParticleGravity(p.gravity));
        }

        Ok(())
    }
}
