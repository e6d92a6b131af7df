//! The drawing surface the renderer paints on, in continuous render units.

use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Mixes `self` over `under` at the given opacity.
    pub fn blend(self, under: Rgb, alpha: f64) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |top: u8, bottom: u8| -> u8 {
            (f64::from(top) * a + f64::from(bottom) * (1.0 - a)).round() as u8
        };
        Rgb(mix(self.0, under.0), mix(self.1, under.1), mix(self.2, under.2))
    }
}

pub trait Canvas {
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    /// Opacity applied to every following fill, stroke and text.
    fn set_global_alpha(&mut self, alpha: f64);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb);

    /// Fills a full circular arc.
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb);

    fn stroke_quadratic(&mut self, from: (f64, f64), ctrl: (f64, f64), to: (f64, f64), color: Rgb);

    /// Draws `text` centred on (x, y).
    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Rgb);
}

/// Wherever the current score is shown.
pub trait ScoreSink {
    fn show_score(&mut self, score: u32) -> Result<()>;
}

/// Samples a quadratic Bezier curve at `steps + 1` evenly spaced parameters.
pub fn quadratic_points(
    from: (f64, f64),
    ctrl: (f64, f64),
    to: (f64, f64),
    steps: usize,
) -> Vec<(f64, f64)> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let u = 1.0 - t;
            (
                u * u * from.0 + 2.0 * u * t * ctrl.0 + t * t * to.0,
                u * u * from.1 + 2.0 * u * t * ctrl.1 + t * t * to.1,
            )
        })
        .collect()
}
