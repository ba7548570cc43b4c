//! Host-supplied frame time.
//!
//! The scheduler never reads a wall clock. Hosts report how much time the
//! current frame covers, on a scaled clock (affected by slow motion or pause)
//! and an unscaled one, and delay items accumulate whichever they were built
//! with.

use std::cell::Cell;
use std::time::Duration;

/// Which host clock a delay accumulates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClockKind {
    /// Game time; scaled by the host's time scale.
    #[default]
    Scaled,
    /// Real frame time, ignoring the time scale.
    Unscaled,
}

/// Source of per-frame elapsed time.
pub trait TimeSource {
    /// Time covered by the current frame on `clock`.
    fn frame_delta(&self, clock: ClockKind) -> Duration;
}

/// Time source the host sets by hand before each tick.
#[derive(Debug, Default)]
pub struct ManualClock {
    scaled: Cell<Duration>,
    unscaled: Cell<Duration>,
}

impl ManualClock {
    /// Creates a clock reporting `delta` on both clocks.
    pub fn new(delta: Duration) -> Self {
        Self {
            scaled: Cell::new(delta),
            unscaled: Cell::new(delta),
        }
    }

    /// Sets the frame delta on both clocks.
    pub fn set_delta(&self, delta: Duration) {
        self.scaled.set(delta);
        self.unscaled.set(delta);
    }

    /// Sets the real frame delta and derives the scaled one from `time_scale`.
    ///
    /// Negative or non-finite scales are treated as a pause. A product too
    /// large for `Duration` saturates at `Duration::MAX`.
    pub fn set_scaled(&self, unscaled: Duration, time_scale: f32) {
        let scale = if time_scale.is_finite() && time_scale > 0.0 {
            f64::from(time_scale)
        } else {
            0.0
        };
        let scaled =
            Duration::try_from_secs_f64(unscaled.as_secs_f64() * scale).unwrap_or(Duration::MAX);
        self.unscaled.set(unscaled);
        self.scaled.set(scaled);
    }
}

impl TimeSource for ManualClock {
    fn frame_delta(&self, clock: ClockKind) -> Duration {
        match clock {
            ClockKind::Scaled => self.scaled.get(),
            ClockKind::Unscaled => self.unscaled.get(),
        }
    }
}
