/// Fixed timestep accumulator.
/// Ensures game logic runs at a consistent rate regardless of frame time.
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt;
        // Cap to prevent spiral of death (max 10 steps per frame)
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }
}

/// One-shot delay measured in game seconds.
///
/// Advanced by the fixed timestep; `tick` reports `true` exactly once,
/// on the step that crosses the deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    remaining: f32,
    fired: bool,
}

impl Countdown {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
            fired: false,
        }
    }

    /// Advance by `dt`. Returns true on the step the countdown expires.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.fired {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.fired = true;
            return true;
        }
        false
    }
}
