//! Turns a stream of frame timestamps into discrete movement ticks.

use crate::config::GameConfig;

/// Maps snake length to tick interval: the game speeds up by `decay_factor`
/// every `length_step` segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedCurve {
    pub base_interval: f64,
    pub decay_factor: f64,
    pub length_step: usize,
}

impl SpeedCurve {
    pub fn from_config(config: &GameConfig) -> Self {
        SpeedCurve {
            base_interval: config.base_interval,
            decay_factor: config.decay_factor,
            length_step: config.length_step,
        }
    }

    pub fn interval(&self, snake_len: usize) -> f64 {
        let steps = (snake_len / self.length_step) as i32;
        self.base_interval * self.decay_factor.powi(steps)
    }
}

impl Default for SpeedCurve {
    fn default() -> Self {
        SpeedCurve::from_config(&GameConfig::default())
    }
}

/// Tick gate driven by frame timestamps in milliseconds.
#[derive(Debug, Clone)]
pub struct Scheduler {
    curve: SpeedCurve,
    last_tick: Option<f64>,
    running: bool,
}

impl Scheduler {
    pub fn new(curve: SpeedCurve) -> Self {
        Scheduler {
            curve,
            last_tick: None,
            running: true,
        }
    }

    pub fn curve(&self) -> &SpeedCurve {
        &self.curve
    }

    pub fn current_interval(&self, snake_len: usize) -> f64 {
        self.curve.interval(snake_len)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn last_tick(&self) -> Option<f64> {
        self.last_tick
    }

    /// Resumes ticking. The first frame after a fresh start ticks at once.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Resumes ticking with a full interval to wait out before the next tick.
    pub fn resume(&mut self, now: f64) {
        self.running = true;
        self.last_tick = Some(now);
    }

    /// Cancels ticking and forgets the last tick time.
    pub fn stop(&mut self) {
        self.running = false;
        self.last_tick = None;
    }

    /// Stops ticking but keeps the clock, for a pause.
    pub fn suspend(&mut self) {
        self.running = false;
    }

    /// Returns true when a tick is due at `now`. At most one tick per frame;
    /// a late frame does not fire extra ticks to catch up.
    pub fn on_frame(&mut self, now: f64, snake_len: usize) -> bool {
        if !self.running {
            return false;
        }

        let due = match self.last_tick {
            None => true,
            Some(last) => now - last >= self.current_interval(snake_len),
        };
        if due {
            self.last_tick = Some(now);
        }
        due
    }

    /// Makes the next frame tick immediately, so a turn takes effect without
    /// waiting out the current interval.
    pub fn retime(&mut self, now: f64, snake_len: usize) {
        self.last_tick = Some(now - self.current_interval(snake_len));
    }
}
