/// Fixed timestep accumulator.
/// One fixed step is one animation frame; every per-frame rate in a game is per step.
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
}

impl FixedTimestep {
    /// Most steps a single tick may run before the backlog is dropped.
    pub const MAX_STEPS: u32 = 10;

    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator = (self.accumulator + frame_dt).min(self.dt * Self::MAX_STEPS as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Simulation clock driven by the UI's speed slider and pause button.
///
/// `elapsed` counts scaled frames, not seconds: each unpaused step adds
/// `time_scale`. Rates elsewhere are expressed per frame and multiplied by
/// `time_scale()` on each step that `advance` lets through.
#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    time_scale: f32,
    paused: bool,
    elapsed: f64,
}

impl SimClock {
    pub const MIN_SCALE: f32 = 0.0;
    pub const MAX_SCALE: f32 = 10.0;

    pub fn new(time_scale: f32) -> Self {
        Self {
            time_scale: time_scale.clamp(Self::MIN_SCALE, Self::MAX_SCALE),
            paused: false,
            elapsed: 0.0,
        }
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set the time scale, clamped to the slider range. Non-finite input is ignored.
    pub fn set_time_scale(&mut self, scale: f32) {
        if scale.is_finite() {
            self.time_scale = scale.clamp(Self::MIN_SCALE, Self::MAX_SCALE);
        }
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Accumulated scaled frames.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Advance one frame. Returns false when paused so callers can skip animation.
    pub fn advance(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.elapsed += self.time_scale as f64;
        true
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}
