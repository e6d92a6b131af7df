use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, error, info};

use crate::board::{Board, TickOutcome};
use crate::canvas::{Canvas, ScoreSink};
use crate::config::{ConfigError, GameConfig};
use crate::input::{self, Command, InputMapper};
use crate::particles::ParticleEngine;
use crate::render::{Overlay, Renderer};
use crate::scheduler::{Scheduler, SpeedCurve};
use crate::snake::{Direction, Position};
use crate::term::TermCanvas;

/// Owns every piece of game state and advances it one animation frame at a
/// time. Timestamps are milliseconds on any monotonic clock.
pub struct Game {
    config: GameConfig,
    board: Board,
    scheduler: Scheduler,
    particles: ParticleEngine,
    input: InputMapper,
    renderer: Renderer,
    paused: bool,
    shown_score: Option<u32>,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let board = Board::new(&config);
        let particles = ParticleEngine::new(config.particles.clone(), config.cell_size);
        Self::assemble(config, board, particles)
    }

    /// Deterministic food placement and particle bursts.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        let board = Board::with_seed(&config, seed);
        let particles =
            ParticleEngine::with_seed(config.particles.clone(), config.cell_size, seed);
        Self::assemble(config, board, particles)
    }

    fn assemble(config: GameConfig, board: Board, particles: ParticleEngine) -> Self {
        Game {
            scheduler: Scheduler::new(SpeedCurve::from_config(&config)),
            input: InputMapper::new(config.initial_direction),
            renderer: Renderer::new(config.cell_size),
            board,
            particles,
            config,
            paused: false,
            shown_score: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn particles(&self) -> &ParticleEngine {
        &self.particles
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn direction(&self) -> Direction {
        self.input.direction()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn overlay(&self) -> Option<Overlay> {
        if self.board.is_over() {
            Some(Overlay::GameOver)
        } else if self.paused {
            Some(Overlay::Paused)
        } else {
            None
        }
    }

    /// One animation frame: at most one tick, then the particle step.
    /// Returns the tick outcome if a tick fired.
    pub fn frame(&mut self, now: f64) -> Option<TickOutcome> {
        if self.paused {
            return None;
        }

        let mut fired = None;
        if !self.board.is_over() && self.scheduler.on_frame(now, self.board.snake().len()) {
            let outcome = self.board.advance_tick(self.input.direction());
            match outcome {
                TickOutcome::Ate { food } => {
                    debug!(x = food.x, y = food.y, score = self.board.score(), "food eaten");
                    self.particles.spawn_burst(food);
                }
                TickOutcome::Crashed(cause) => {
                    self.scheduler.stop();
                    info!(
                        ?cause,
                        score = self.board.score(),
                        length = self.board.snake().len(),
                        "game over"
                    );
                }
                _ => {}
            }
            fired = Some(outcome);
        }

        self.particles.update();
        fired
    }

    /// Applies a turn. An accepted turn makes the next frame tick at once.
    pub fn turn(&mut self, direction: Direction, now: f64) -> bool {
        if self.paused || self.board.is_over() {
            return false;
        }
        let accepted = self.input.steer(direction);
        if accepted {
            self.scheduler.retime(now, self.board.snake().len());
        }
        accepted
    }

    pub fn toggle_pause(&mut self, now: f64) {
        if self.board.is_over() {
            return;
        }
        self.paused = !self.paused;
        if self.paused {
            self.scheduler.suspend();
        } else {
            self.scheduler.resume(now);
        }
        info!(paused = self.paused, "pause toggled");
    }

    /// Full reinitialisation: board, heading, particles and the tick clock.
    /// Fails without touching anything when `snake` is empty.
    pub fn reset(
        &mut self,
        snake: &[Position],
        food: Position,
        direction: Direction,
    ) -> Result<(), ConfigError> {
        self.board.reset(snake, food)?;
        self.scheduler.stop();
        self.input.reset(direction);
        self.particles.clear();
        self.paused = false;
        self.scheduler.start();
        Ok(())
    }

    pub fn restart(&mut self) {
        let snake = self.config.initial_snake.clone();
        match self.reset(&snake, self.config.initial_food, self.config.initial_direction) {
            Ok(()) => info!("game restarted"),
            Err(err) => error!(%err, "restart failed"),
        }
    }

    /// Returns false when the player asked to quit.
    pub fn handle(&mut self, command: Command, now: f64) -> bool {
        match command {
            Command::Turn(direction) => {
                self.turn(direction, now);
            }
            Command::Restart => self.restart(),
            Command::Pause => self.toggle_pause(now),
            Command::Quit => return false,
            Command::None => {}
        }
        true
    }

    /// Pushes the score to `sink` if it changed since the last successful
    /// push.
    pub fn sync_score<S: ScoreSink>(&mut self, sink: &mut S) -> Result<()> {
        let score = self.board.score();
        if self.shown_score != Some(score) {
            sink.show_score(score)?;
            self.shown_score = Some(score);
        }
        Ok(())
    }

    pub fn render<C: Canvas>(&self, canvas: &mut C) {
        self.renderer
            .render(canvas, &self.board, self.particles.particles(), self.overlay());
    }

    /// Plays in the terminal until the player quits.
    pub fn run(&mut self) -> Result<()> {
        let mut term = TermCanvas::new(self.config.canvas_size, self.config.cell_size)?;

        let result = term.setup().and_then(|_| self.play(&mut term));
        let restored = term.restore();
        result.and(restored)
    }

    fn play(&mut self, term: &mut TermCanvas) -> Result<()> {
        let clock = Instant::now();
        let frame_interval = Duration::from_millis(self.config.frame_interval);
        info!(tiles = self.board.tile_count(), "game started");

        loop {
            let frame_start = Instant::now();
            self.frame(millis(clock.elapsed()));
            self.sync_score(term)?;
            self.render(term);
            term.present()?;

            let wait = frame_interval.saturating_sub(frame_start.elapsed());
            for key in term.read_key_events(wait)? {
                if !self.handle(input::map_key(key), millis(clock.elapsed())) {
                    info!(score = self.board.score(), "quit");
                    return Ok(());
                }
            }
        }
    }
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
