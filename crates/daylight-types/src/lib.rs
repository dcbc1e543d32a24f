//! Shared value types for the Daylight weather cycle.
//!
//! These types mirror the records the driving simulator exposes over its
//! session API. They are plain data: the simulator owns the live state and
//! the types here are the copies that travel across the wire.
//!
//! # Modules
//!
//! - [`weather`] -- [`WeatherParameters`], the atmospheric record the
//!   simulator renders from.
//! - [`spatial`] -- [`Location`], [`Rotation`], and [`Transform`] for the
//!   spectator viewpoint.
//! - [`timestamp`] -- [`Timestamp`] returned by each simulator frame.

pub mod spatial;
pub mod timestamp;
pub mod weather;

// Re-export all public types at crate root for convenience.
pub use spatial::{Location, Rotation, Transform};
pub use timestamp::Timestamp;
pub use weather::WeatherParameters;
