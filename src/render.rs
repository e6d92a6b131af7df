use crate::board::Board;
use crate::canvas::{Canvas, Rgb};
use crate::particles::Particle;
use crate::snake::Position;

const BACKGROUND: Rgb = Rgb::BLACK;
const FOOD_COLOR: Rgb = Rgb(229, 57, 53);
const SNAKE_COLOR: Rgb = Rgb(76, 175, 80);
const SPINE_COLOR: Rgb = Rgb(27, 94, 32);
const PARTICLE_COLOR: Rgb = Rgb(255, 213, 79);
const TEXT_COLOR: Rgb = Rgb::WHITE;

/// Segments fade by this much each step back from the head.
const SEGMENT_FADE: f64 = 0.1;
const MIN_SEGMENT_ALPHA: f64 = 0.3;

/// Message drawn over a frozen board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    GameOver,
    Paused,
}

pub struct Renderer {
    cell_size: f64,
}

impl Renderer {
    pub fn new(cell_size: f64) -> Self {
        Renderer { cell_size }
    }

    pub fn render<C: Canvas>(
        &self,
        canvas: &mut C,
        board: &Board,
        particles: &[Particle],
        overlay: Option<Overlay>,
    ) {
        canvas.set_global_alpha(1.0);
        canvas.fill_rect(0.0, 0.0, canvas.width(), canvas.height(), BACKGROUND);

        let radius = self.cell_size / 2.0 - 1.0;
        let (fx, fy) = self.center(board.food());
        canvas.fill_circle(fx, fy, radius, FOOD_COLOR);

        self.draw_snake(canvas, board.snake().body(), radius);
        draw_particles(canvas, particles);

        if let Some(overlay) = overlay {
            self.draw_overlay(canvas, overlay, board.score());
        }
    }

    fn center(&self, pos: Position) -> (f64, f64) {
        (
            (f64::from(pos.x) + 0.5) * self.cell_size,
            (f64::from(pos.y) + 0.5) * self.cell_size,
        )
    }

    fn draw_snake<C: Canvas>(&self, canvas: &mut C, body: &[Position], radius: f64) {
        for (i, seg) in body.iter().enumerate() {
            let alpha = (1.0 - i as f64 * SEGMENT_FADE).max(MIN_SEGMENT_ALPHA);
            let (x, y) = self.center(*seg);
            canvas.set_global_alpha(alpha);
            canvas.fill_circle(x, y, radius, SNAKE_COLOR);
        }
        canvas.set_global_alpha(1.0);

        // Spine through the segment centres, bent at every joint
        for joint in body.windows(3) {
            let prev = self.center(joint[0]);
            let cur = self.center(joint[1]);
            let next = self.center(joint[2]);
            canvas.stroke_quadratic(midpoint(prev, cur), cur, midpoint(cur, next), SPINE_COLOR);
        }
    }

    fn draw_overlay<C: Canvas>(&self, canvas: &mut C, overlay: Overlay, score: u32) {
        let (cx, cy) = (canvas.width() / 2.0, canvas.height() / 2.0);
        canvas.set_global_alpha(0.6);
        let band = self.cell_size * 3.0;
        canvas.fill_rect(0.0, cy - band / 2.0, canvas.width(), band, BACKGROUND);
        canvas.set_global_alpha(1.0);

        match overlay {
            Overlay::GameOver => {
                canvas.fill_text("GAME OVER", cx, cy - self.cell_size * 0.5, TEXT_COLOR);
                let hint = format!("Score {} - press R to restart", score);
                canvas.fill_text(&hint, cx, cy + self.cell_size * 0.5, TEXT_COLOR);
            }
            Overlay::Paused => {
                canvas.fill_text("PAUSED", cx, cy - self.cell_size * 0.5, TEXT_COLOR);
                canvas.fill_text("press P to resume", cx, cy + self.cell_size * 0.5, TEXT_COLOR);
            }
        }
    }
}

fn draw_particles<C: Canvas>(canvas: &mut C, particles: &[Particle]) {
    for p in particles {
        canvas.set_global_alpha(p.alpha);
        canvas.fill_circle(p.x, p.y, p.radius, PARTICLE_COLOR);
    }
    canvas.set_global_alpha(1.0);
}

fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}
