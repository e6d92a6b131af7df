//! Decaying particle bursts shown when food gets eaten.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::ParticleConfig;
use crate::snake::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub alpha: f64,
    pub radius: f64,
    pub decay: f64,
    age: u32,
}

impl Particle {
    /// Moves the particle one step and fades it. Returns false once it is
    /// fully transparent.
    fn step(&mut self, gravity: f64) -> bool {
        self.x += self.vx;
        self.y += self.vy;
        self.vy += gravity;
        self.age += 1;
        // Derived from age so 1/decay updates land exactly on zero
        self.alpha = 1.0 - self.decay * f64::from(self.age);
        self.alpha > 0.0
    }
}

pub struct ParticleEngine {
    particles: Vec<Particle>,
    config: ParticleConfig,
    cell_size: f64,
    rng: StdRng,
}

impl ParticleEngine {
    pub fn new(config: ParticleConfig, cell_size: f64) -> Self {
        Self::with_rng(config, cell_size, StdRng::from_entropy())
    }

    pub fn with_seed(config: ParticleConfig, cell_size: f64, seed: u64) -> Self {
        Self::with_rng(config, cell_size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ParticleConfig, cell_size: f64, rng: StdRng) -> Self {
        ParticleEngine {
            particles: Vec::new(),
            config,
            cell_size,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Throws a burst of particles out of the centre of `cell`.
    pub fn spawn_burst(&mut self, cell: Position) {
        let cx = (f64::from(cell.x) + 0.5) * self.cell_size;
        let cy = (f64::from(cell.y) + 0.5) * self.cell_size;
        let count = self
            .rng
            .gen_range(self.config.min_count..=self.config.max_count);
        let speed = self.config.max_speed;

        for _ in 0..count {
            let vx = self.rng.gen_range(-speed..=speed);
            let vy = self.rng.gen_range(-speed..=speed);
            let radius = self
                .rng
                .gen_range(self.config.min_radius..=self.config.max_radius);
            self.particles.push(Particle {
                x: cx,
                y: cy,
                vx,
                vy,
                alpha: 1.0,
                radius,
                decay: self.config.decay,
                age: 0,
            });
        }
    }

    pub fn update(&mut self) {
        let gravity = self.config.gravity;
        self.particles.retain_mut(|p| p.step(gravity));
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
