//! Closed-form sun position from the time of day.
//!
//! The sun sweeps 15 degrees of azimuth per hour, starting from 0 at the
//! sunrise reference hour. Between sunrise and sunset (inclusive) the
//! altitude follows a sine arc peaking at solar noon; outside that window it
//! sits at a flat night floor.
//!
//! | Hour | Azimuth | Altitude |
//! |------|---------|----------|
//! | 0    | 270     | -20      |
//! | 6    | 0       | 0        |
//! | 12   | 90      | 70       |
//! | 18   | 180     | 0        |
//!
//! The night floor is a fixed value chosen for rendering, not a physically
//! derived one.

use std::fmt;

/// Degrees of azimuth the sun travels per simulated hour.
pub const DEGREES_PER_HOUR: f64 = 15.0;

/// Hour at which the sun crosses the horizon in the morning (azimuth 0).
pub const SUNRISE_HOUR: f64 = 6.0;

/// Hour at which the sun crosses the horizon in the evening.
pub const SUNSET_HOUR: f64 = 18.0;

/// Altitude in degrees at solar noon.
pub const PEAK_ALTITUDE: f64 = 70.0;

/// Altitude in degrees used for every hour outside daylight.
pub const NIGHT_ALTITUDE: f64 = -20.0;

const FULL_CIRCLE: f64 = 360.0;

/// Return `true` if `hour` falls within daylight, sunrise and sunset included.
pub fn is_daytime(hour: f64) -> bool {
    (SUNRISE_HOUR..=SUNSET_HOUR).contains(&hour)
}

/// Horizontal and vertical angle of the sun, in degrees.
///
/// A pure function of the hour: the same hour always yields the same
/// position. The default value (both angles 0) is the position before any
/// calculation has run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SunPosition {
    /// Horizontal angle in `[0, 360)`, 0 at the sunrise hour.
    pub azimuth: f64,
    /// Vertical angle; negative is below the horizon.
    pub altitude: f64,
}

impl SunPosition {
    /// Compute the sun position for an hour of the day.
    ///
    /// `hour` is expected in `[0, 24)`. Other finite values are accepted and
    /// evaluated with the same formula: the azimuth still lands in
    /// `[0, 360)` and hours outside `[6, 18]` get the night altitude, so
    /// hour 24 yields the same position as hour 0.
    pub fn at_hour(hour: f64) -> Self {
        let angle = (hour - SUNRISE_HOUR) * DEGREES_PER_HOUR;

        let mut azimuth = angle.rem_euclid(FULL_CIRCLE);
        // rem_euclid can round up to the modulus for tiny negative inputs.
        if azimuth >= FULL_CIRCLE {
            azimuth = 0.0;
        }

        let altitude = if is_daytime(hour) {
            PEAK_ALTITUDE * angle.to_radians().sin()
        } else {
            NIGHT_ALTITUDE
        };

        Self { azimuth, altitude }
    }

    /// Recompute this position in place for a new hour.
    pub fn calculate(&mut self, hour: f64) {
        *self = Self::at_hour(hour);
    }
}

impl fmt::Display for SunPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sun(alt: {:.2}, azm: {:.2})", self.altitude, self.azimuth)
    }
}
