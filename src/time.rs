//! Simulation clocks.

use std::time::Instant;

/// Monotonic simulation time source, sampled once per frame
pub trait Clock {
    /// Current simulation time (seconds)
    fn now(&self) -> f32;

    /// Duration of the current frame (seconds)
    fn delta_time(&self) -> f32;
}

/// Fixed-step clock for headless runs and tests
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    time_s: f32,
    step_s: f32,
}

impl FixedStepClock {
    pub fn new(step_s: f32) -> Self {
        Self { time_s: 0.0, step_s }
    }

    /// Clock stepping at `fps` frames per second
    pub fn from_fps(fps: u32) -> Self {
        Self::new(1.0 / fps.max(1) as f32)
    }

    /// Advance one frame
    pub fn tick(&mut self) {
        self.time_s += self.step_s;
    }
}

impl Clock for FixedStepClock {
    fn now(&self) -> f32 {
        self.time_s
    }

    fn delta_time(&self) -> f32 {
        self.step_s
    }
}

/// Wall-clock time since construction
#[derive(Debug, Clone)]
pub struct WallClock {
    start: Instant,
    last_s: f32,
    delta_s: f32,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last_s: 0.0,
            delta_s: 0.0,
        }
    }

    /// Latch the current time as this frame's time
    pub fn tick(&mut self) {
        let now = self.start.elapsed().as_secs_f32();
        self.delta_s = now - self.last_s;
        self.last_s = now;
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> f32 {
        self.last_s
    }

    fn delta_time(&self) -> f32 {
        self.delta_s
    }
}
