//! The simulator session contract and an in-process implementation.
//!
//! The day/night cycle talks to the simulator through the [`Simulator`]
//! trait. The engine binary implements it over TCP; [`HeadlessWorld`] is a
//! self-contained world with a fixed frame delta, used for offline runs and
//! tests.

use std::future::Future;
use std::time::Duration;

use daylight_types::{Location, Rotation, Timestamp, Transform, WeatherParameters};
use tracing::{debug, info};

/// Errors that can occur while talking to the simulator.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    /// The TCP connection could not be established.
    #[error("failed to connect to simulator at {address}: {source}")]
    Connect {
        /// The `host:port` that was dialed.
        address: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The simulator did not answer within the configured timeout.
    #[error("simulator did not respond to {operation} within {timeout_ms}ms")]
    Timeout {
        /// The request or phase that timed out.
        operation: String,
        /// The timeout that was exceeded.
        timeout_ms: u64,
    },

    /// Reading from or writing to the connection failed.
    #[error("simulator I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A message could not be encoded or decoded.
    #[error("simulator protocol error: {message}")]
    Protocol {
        /// Description of the malformed message.
        message: String,
    },

    /// The simulator answered with an error.
    #[error("simulator rejected {method}: {message}")]
    Remote {
        /// The request method that failed.
        method: String,
        /// The error message sent by the simulator.
        message: String,
    },

    /// The simulator closed the connection.
    #[error("simulator closed the connection")]
    Closed,
}

/// A live session with the driving simulator.
///
/// Every call targets the simulator's current world. Implementations do not
/// retry: a failed call is returned to the caller as-is.
pub trait Simulator {
    /// Fetch the world's current weather record.
    fn world_weather(
        &mut self,
    ) -> impl Future<Output = Result<WeatherParameters, SimulatorError>> + Send;

    /// Replace the world's weather record.
    fn set_world_weather(
        &mut self,
        weather: &WeatherParameters,
    ) -> impl Future<Output = Result<(), SimulatorError>> + Send;

    /// Fetch the spectator camera transform.
    fn spectator_transform(
        &mut self,
    ) -> impl Future<Output = Result<Transform, SimulatorError>> + Send;

    /// Move the spectator camera.
    fn set_spectator_transform(
        &mut self,
        transform: &Transform,
    ) -> impl Future<Output = Result<(), SimulatorError>> + Send;

    /// Block until the simulator produces its next frame.
    fn wait_for_tick(&mut self) -> impl Future<Output = Result<Timestamp, SimulatorError>> + Send;
}

/// Point the spectator camera at a fixed location and rotation.
///
/// Reads the current transform first so any fields the simulator adds are
/// preserved, then overwrites location and rotation.
///
/// # Errors
///
/// Returns [`SimulatorError`] if either call fails.
pub async fn place_spectator<S: Simulator>(
    simulator: &mut S,
    location: Location,
    rotation: Rotation,
) -> Result<Transform, SimulatorError> {
    let mut transform = simulator.spectator_transform().await?;
    transform.location = location;
    transform.rotation = rotation;
    simulator.set_spectator_transform(&transform).await?;
    info!(
        x = location.x,
        y = location.y,
        z = location.z,
        pitch = rotation.pitch,
        "Spectator placed"
    );
    Ok(transform)
}

/// An in-process world that advances by a fixed delta every frame.
///
/// By default frames are produced immediately. [`realtime`](Self::realtime)
/// paces them so each frame takes `delta_seconds` of wall-clock time.
#[derive(Debug, Clone)]
pub struct HeadlessWorld {
    /// The world's weather record.
    weather: WeatherParameters,

    /// The spectator camera transform.
    spectator: Transform,

    /// Simulated seconds per frame.
    delta_seconds: f64,

    /// Wall-clock pause before each frame, if paced.
    pacing: Option<Duration>,

    /// Frames produced so far.
    frame: u64,

    /// Simulated seconds since the world started.
    elapsed_seconds: f64,

    /// Number of times the weather has been replaced.
    weather_updates: u64,
}

impl HeadlessWorld {
    /// Create a world with default weather and a fixed frame delta.
    pub fn new(delta_seconds: f64) -> Self {
        Self {
            weather: WeatherParameters::default(),
            spectator: Transform::default(),
            delta_seconds,
            pacing: None,
            frame: 0,
            elapsed_seconds: 0.0,
            weather_updates: 0,
        }
    }

    /// Start the world with the given weather.
    #[must_use]
    pub fn with_weather(mut self, weather: WeatherParameters) -> Self {
        self.weather = weather;
        self
    }

    /// Pace frames in wall-clock time.
    ///
    /// Deltas that are negative or not finite cannot be paced and leave
    /// frames unpaced.
    #[must_use]
    pub fn realtime(mut self) -> Self {
        self.pacing = Duration::try_from_secs_f64(self.delta_seconds).ok();
        self
    }

    /// Return the current weather record.
    pub const fn weather(&self) -> &WeatherParameters {
        &self.weather
    }

    /// Return the spectator camera transform.
    pub const fn spectator(&self) -> Transform {
        self.spectator
    }

    /// Return the number of frames produced so far.
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Return how many times the weather has been replaced.
    pub const fn weather_updates(&self) -> u64 {
        self.weather_updates
    }
}

impl Simulator for HeadlessWorld {
    async fn world_weather(&mut self) -> Result<WeatherParameters, SimulatorError> {
        Ok(self.weather.clone())
    }

    async fn set_world_weather(&mut self, weather: &WeatherParameters) -> Result<(), SimulatorError> {
        self.weather.clone_from(weather);
        self.weather_updates = self.weather_updates.saturating_add(1);
        Ok(())
    }

    async fn spectator_transform(&mut self) -> Result<Transform, SimulatorError> {
        Ok(self.spectator)
    }

    async fn set_spectator_transform(&mut self, transform: &Transform) -> Result<(), SimulatorError> {
        self.spectator = *transform;
        Ok(())
    }

    async fn wait_for_tick(&mut self) -> Result<Timestamp, SimulatorError> {
        if let Some(pacing) = self.pacing {
            tokio::time::sleep(pacing).await;
        }
        self.frame = self.frame.saturating_add(1);
        self.elapsed_seconds += self.delta_seconds;
        debug!(frame = self.frame, elapsed = self.elapsed_seconds, "headless frame");
        Ok(Timestamp {
            frame: self.frame,
            elapsed_seconds: self.elapsed_seconds,
            delta_seconds: self.delta_seconds,
            platform_timestamp: self.elapsed_seconds,
        })
    }
}
