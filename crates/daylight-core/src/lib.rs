//! Sun position, simulated clock, weather controller, and cycle loop for
//! the Daylight weather cycle.
//!
//! This crate drives a day/night cycle inside an external driving
//! simulator: every simulator frame advances a simulated clock, derives the
//! sun's azimuth and altitude from the time of day, and writes the result
//! (plus fog and cloud cover) into the simulator's weather record.
//!
//! # Modules
//!
//! - [`sun`] -- Closed-form sun position from an hour of the day.
//! - [`clock`] -- Simulated time of day, advanced from real-time deltas.
//! - [`weather`] -- [`WeatherState`] handle trait and the
//!   [`WeatherController`] that mutates it each tick.
//! - [`simulator`] -- [`Simulator`] session trait and the in-process
//!   [`HeadlessWorld`].
//! - [`config`] -- Configuration loading from `daylight-config.yaml`.
//! - [`runner`] -- The cooperative polling loop with interrupt handling.
//!
//! [`WeatherState`]: weather::WeatherState
//! [`WeatherController`]: weather::WeatherController
//! [`Simulator`]: simulator::Simulator
//! [`HeadlessWorld`]: simulator::HeadlessWorld

pub mod clock;
pub mod config;
pub mod runner;
pub mod simulator;
pub mod sun;
pub mod weather;

pub use clock::SimulatedClock;
pub use simulator::{HeadlessWorld, Simulator, SimulatorError};
pub use sun::SunPosition;
pub use weather::{WeatherController, WeatherState};
