//! Animation time that survives stalls.

/// Frame deltas at or above this many seconds are treated as a stall.
pub const DEFAULT_MAX_DELTA: f32 = 3.0;

/// Monotonic animation clock.
///
/// Deltas longer than `max_delta` (a debugger pause, a slow first frame) are
/// dropped instead of jumping the animation forward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    time: f32,
    max_delta: f32,
}

impl FrameClock {
    pub fn new(start: f32) -> Self {
        Self {
            time: start,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Advance by `delta` seconds. Returns whether the clock moved.
    pub fn advance(&mut self, delta: f32) -> bool {
        if !delta.is_finite() || delta < 0.0 || delta >= self.max_delta {
            log::debug!("Ignoring frame delta {delta}s");
            return false;
        }
        self.time += delta;
        true
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}
