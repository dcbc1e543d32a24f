//! The weather controller that drives the day/night cycle.
//!
//! The simulator owns the live weather record. The controller never takes
//! ownership of it: it holds a mutable borrow of a [`WeatherState`] handle
//! and rewrites the sun, cloud, and fog fields through explicit setters on
//! every tick. Fields it does not manage are left untouched.
//!
//! # Tick rules
//!
//! 1. Advance the [`SimulatedClock`] by the real-time delta.
//! 2. Recompute the [`SunPosition`] from the new hour.
//! 3. Write azimuth and altitude into the weather record.
//! 4. Reset cloudiness to [`CLEAR_CLOUDINESS`] (cloud cover is not simulated).
//! 5. Set fog to [`DAY_FOG_DENSITY`] in daylight and [`NIGHT_FOG_DENSITY`]
//!    otherwise.

use std::fmt;

use daylight_types::WeatherParameters;
use tracing::trace;

use crate::clock::SimulatedClock;
use crate::sun::{self, SunPosition};

/// Fog density applied during daylight hours.
pub const DAY_FOG_DENSITY: f64 = 0.0;

/// Fog density applied for every hour outside daylight.
pub const NIGHT_FOG_DENSITY: f64 = 30.0;

/// Cloudiness written on every tick.
pub const CLEAR_CLOUDINESS: f64 = 0.0;

/// A handle onto an externally owned weather record.
///
/// The controller reads and writes the record only through these accessors,
/// so any type that mirrors the simulator's weather can be driven.
pub trait WeatherState {
    /// Horizontal sun angle in degrees.
    fn sun_azimuth_angle(&self) -> f64;
    /// Set the horizontal sun angle in degrees.
    fn set_sun_azimuth_angle(&mut self, degrees: f64);

    /// Vertical sun angle in degrees.
    fn sun_altitude_angle(&self) -> f64;
    /// Set the vertical sun angle in degrees.
    fn set_sun_altitude_angle(&mut self, degrees: f64);

    /// Cloud cover, 0 to 100.
    fn cloudiness(&self) -> f64;
    /// Set the cloud cover.
    fn set_cloudiness(&mut self, cloudiness: f64);

    /// Fog concentration, 0 to 100.
    fn fog_density(&self) -> f64;
    /// Set the fog concentration.
    fn set_fog_density(&mut self, density: f64);
}

impl WeatherState for WeatherParameters {
    fn sun_azimuth_angle(&self) -> f64 {
        self.sun_azimuth_angle
    }

    fn set_sun_azimuth_angle(&mut self, degrees: f64) {
        self.sun_azimuth_angle = degrees;
    }

    fn sun_altitude_angle(&self) -> f64 {
        self.sun_altitude_angle
    }

    fn set_sun_altitude_angle(&mut self, degrees: f64) {
        self.sun_altitude_angle = degrees;
    }

    fn cloudiness(&self) -> f64 {
        self.cloudiness
    }

    fn set_cloudiness(&mut self, cloudiness: f64) {
        self.cloudiness = cloudiness;
    }

    fn fog_density(&self) -> f64 {
        self.fog_density
    }

    fn set_fog_density(&mut self, density: f64) {
        self.fog_density = density;
    }
}

/// Drives a weather record through the day/night cycle.
///
/// Owns the [`SunPosition`] and [`SimulatedClock`]; borrows the weather
/// record for as long as the controller lives.
#[derive(Debug)]
pub struct WeatherController<'w, W: WeatherState> {
    /// The externally owned weather record.
    weather: &'w mut W,

    /// Sun position from the most recent tick.
    sun: SunPosition,

    /// Simulated time of day.
    clock: SimulatedClock,
}

impl<'w, W: WeatherState> WeatherController<'w, W> {
    /// Create a controller starting at midnight.
    ///
    /// The weather record is not touched until the first [`tick`](Self::tick).
    pub fn new(weather: &'w mut W) -> Self {
        Self::with_clock(weather, SimulatedClock::new())
    }

    /// Create a controller that starts from an existing clock.
    pub fn with_clock(weather: &'w mut W, clock: SimulatedClock) -> Self {
        Self {
            weather,
            sun: SunPosition::default(),
            clock,
        }
    }

    /// Advance the cycle by `delta_seconds` of real time and rewrite the
    /// weather record.
    pub fn tick(&mut self, delta_seconds: f64) {
        let hours = self.clock.advance(delta_seconds);

        self.sun.calculate(hours);
        self.weather.set_sun_azimuth_angle(self.sun.azimuth);
        self.weather.set_sun_altitude_angle(self.sun.altitude);

        self.weather.set_cloudiness(CLEAR_CLOUDINESS);
        let fog = if sun::is_daytime(hours) {
            DAY_FOG_DENSITY
        } else {
            NIGHT_FOG_DENSITY
        };
        self.weather.set_fog_density(fog);

        trace!(
            hours,
            azimuth = self.sun.azimuth,
            altitude = self.sun.altitude,
            fog_density = fog,
            "weather updated"
        );
    }

    /// Return the current simulated hour in `[0, 24)`.
    pub const fn simulation_hours(&self) -> f64 {
        self.clock.hours()
    }

    /// Return the sun position computed by the most recent tick.
    pub const fn sun(&self) -> SunPosition {
        self.sun
    }

    /// Return the simulated clock.
    pub const fn clock(&self) -> SimulatedClock {
        self.clock
    }

    /// Borrow the weather record, e.g. to push it back to the simulator.
    pub const fn weather(&self) -> &W {
        &*self.weather
    }
}

impl<W: WeatherState> fmt::Display for WeatherController<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Time: {}", self.sun, self.clock)
    }
}
