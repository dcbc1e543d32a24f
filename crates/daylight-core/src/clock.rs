//! Simulated time of day.
//!
//! The clock holds a single hour value in `[0, 24)` and advances it from
//! real-time deltas at a fixed rate: one real second is ten simulated
//! minutes, so a full simulated day takes 144 real seconds.
//!
//! The hour is always wrapped back into `[0, 24)` after every update. It is
//! never stored as an unbounded elapsed counter.

use std::fmt;

use tracing::warn;

/// Simulated minutes that pass per real second.
pub const SIM_MINUTES_PER_REAL_SECOND: f64 = 10.0;

/// Length of a simulated day in hours.
pub const HOURS_PER_DAY: f64 = 24.0;

const MINUTES_PER_HOUR: f64 = 60.0;

/// Wrap an hour value into `[0, 24)`.
fn wrap_hours(hours: f64) -> f64 {
    let wrapped = hours.rem_euclid(HOURS_PER_DAY);
    // rem_euclid can round up to the modulus for tiny negative inputs.
    if wrapped >= HOURS_PER_DAY { 0.0 } else { wrapped }
}

/// Simulated time of day in fractional hours.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulatedClock {
    /// Current hour in `[0, 24)`.
    hours: f64,
}

impl SimulatedClock {
    /// Create a clock at midnight (hour 0).
    pub const fn new() -> Self {
        Self { hours: 0.0 }
    }

    /// Create a clock at the given hour, wrapped into `[0, 24)`.
    ///
    /// Non-finite hours start the clock at midnight.
    pub fn starting_at(hour: f64) -> Self {
        if !hour.is_finite() {
            warn!(hour, "non-finite start hour, starting at midnight");
            return Self::new();
        }
        Self {
            hours: wrap_hours(hour),
        }
    }

    /// Advance the clock by `delta_seconds` of real time and return the new
    /// hour.
    ///
    /// Negative deltas move the clock backwards and still wrap into
    /// `[0, 24)`. Non-finite deltas are ignored.
    pub fn advance(&mut self, delta_seconds: f64) -> f64 {
        if !delta_seconds.is_finite() {
            warn!(delta_seconds, "ignoring non-finite clock delta");
            return self.hours;
        }
        let delta_hours = delta_seconds * SIM_MINUTES_PER_REAL_SECOND / MINUTES_PER_HOUR;
        self.hours = wrap_hours(self.hours + delta_hours);
        self.hours
    }

    /// Return the current hour in `[0, 24)`.
    pub const fn hours(&self) -> f64 {
        self.hours
    }

    /// Return the whole hour of the day (0-23).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn hour_of_day(&self) -> u32 {
        // hours is in [0, 24), so the floor fits in 0..=23.
        (self.hours.floor() as u32).min(23)
    }

    /// Return the whole minute within the current hour (0-59).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn minute_of_hour(&self) -> u32 {
        let minutes = (self.hours.fract() * MINUTES_PER_HOUR).floor();
        (minutes as u32).min(59)
    }
}

impl fmt::Display for SimulatedClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour_of_day(), self.minute_of_hour())
    }
}
